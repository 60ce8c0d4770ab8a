//! Integration tests for message parsing and serialization
//!
//! These tests verify that lines decode into the expected parts and that
//! commands written by the session decode back to equivalent messages.

use slirc_client::{Command, Message, Prefix, TextCodec};

#[test]
fn test_message_round_trip_simple() {
    let original = "PING :irc.example.com";
    let message: Message = original.parse().expect("Failed to parse message");
    let serialized = message.to_string();

    let reparsed: Message = serialized.parse().expect("Failed to reparse message");
    assert_eq!(message, reparsed);
    assert_eq!(serialized, "PING irc.example.com");
}

#[test]
fn test_message_round_trip_with_prefix() {
    let original = ":nick!user@host PRIVMSG #channel :Hello, world!";
    let message: Message = original.parse().expect("Failed to parse message");
    assert_eq!(message.to_string(), original);
    assert_eq!(
        message.prefix(),
        Some(&Prefix::Nickname("nick".into(), "user".into(), "host".into()))
    );
}

#[test]
fn test_message_round_trip_numeric_response() {
    let original = ":server.example 001 nickname :Welcome to the IRC Network";
    let message: Message = original.parse().expect("Failed to parse message");
    assert_eq!(message.numeric(), Some(1));
    assert_eq!(message.command(), "001");

    let reparsed: Message = message.to_string().parse().expect("Failed to reparse message");
    assert_eq!(message, reparsed);
}

#[test]
fn test_names_reply_parts() {
    let message: Message = ":irc.test 353 me = #rust :@ferris +crab bob"
        .parse()
        .expect("Failed to parse message");
    assert_eq!(message.params(), ["me", "=", "#rust", "@ferris +crab bob"]);
}

#[test]
fn test_command_round_trip_with_spaces() {
    let commands = [
        Command::PRIVMSG("#rust".into(), "hello there, world".into()),
        Command::USER("guest".into(), "0".into(), "Real Name".into()),
        Command::KICK("#c".into(), "bob".into(), Some("too loud".into())),
        Command::PART("#c".into(), Some("see you".into())),
        Command::action("#c", "waves at everyone"),
    ];

    for command in commands {
        let line = command.to_string();
        let decoded = Message::decode(line.as_bytes(), &TextCodec::default())
            .expect("serialized command decodes");
        assert_eq!(decoded, command.to_message().unwrap(), "line: {}", line);
    }
}

#[test]
fn test_leading_colon_parameter_survives() {
    let command = Command::PRIVMSG("#c".into(), ":)".into());
    let line = command.to_string();
    assert_eq!(line, "PRIVMSG #c ::)");
    let decoded: Message = line.parse().unwrap();
    assert_eq!(decoded.arg(1), Some(":)"));
}

#[test]
fn test_malformed_lines_rejected() {
    assert!("".parse::<Message>().is_err());
    assert!(":only.a.prefix".parse::<Message>().is_err());
    assert!(":x 99999 me :too big".parse::<Message>().is_err());
}
