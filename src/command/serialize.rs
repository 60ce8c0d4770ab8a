use std::fmt;

use crate::message::{write_cmd, write_cmd_freeform};

use super::types::Command;

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        if self.has_freeform_trailing() {
            write_cmd_freeform(f, self.name(), &params)
        } else {
            write_cmd(f, self.name(), &params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_commands() {
        assert_eq!(Command::PASS("secret".into()).to_string(), "PASS secret");
        assert_eq!(Command::NICK("guest".into()).to_string(), "NICK guest");
        assert_eq!(
            Command::USER("guest".into(), "0".into(), "Real Name".into()).to_string(),
            "USER guest 0 * :Real Name"
        );
    }

    #[test]
    fn test_pong_has_no_colon_for_single_word() {
        assert_eq!(Command::PONG("x".into()).to_string(), "PONG x");
        assert_eq!(Command::PONG("two words".into()).to_string(), "PONG :two words");
    }

    #[test]
    fn test_messaging_always_trailing() {
        assert_eq!(Command::PRIVMSG("#c".into(), "hi".into()).to_string(), "PRIVMSG #c :hi");
        assert_eq!(Command::NOTICE("bob".into(), "".into()).to_string(), "NOTICE bob :");
    }

    #[test]
    fn test_optional_params() {
        assert_eq!(Command::PART("#c".into(), None).to_string(), "PART #c");
        assert_eq!(
            Command::PART("#c".into(), Some("later".into())).to_string(),
            "PART #c :later"
        );
        assert_eq!(Command::JOIN("#a,#b".into(), Some("key".into())).to_string(), "JOIN #a,#b key");
        assert_eq!(Command::QUIT(None).to_string(), "QUIT");
    }

    #[test]
    fn test_mode_and_raw() {
        let cmd = Command::MODE("#c".into(), vec!["+ov".into(), "a".into(), "b".into()]);
        assert_eq!(cmd.to_string(), "MODE #c +ov a b");
        let cmd = Command::Raw("WHOIS".into(), vec!["bob".into()]);
        assert_eq!(cmd.to_string(), "WHOIS bob");
    }
}
