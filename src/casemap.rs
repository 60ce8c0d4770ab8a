//! IRC case folding.
//!
//! Target identity and nick comparison use the `rfc1459` case mapping:
//! ASCII letters fold to lowercase and `[]\~` fold to `{}|^`. Every
//! comparison of names in the engine goes through this module so the
//! registry never holds two targets that differ only in case.

#[inline]
fn fold_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold_char).eq(b.chars().map(fold_char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lower_maps_specials() {
        assert_eq!(irc_to_lower("Nick[Away]"), "nick{away}");
        assert_eq!(irc_to_lower("A\\B~"), "a|b^");
        assert_eq!(irc_to_lower("#Rust"), "#rust");
    }

    #[test]
    fn test_eq() {
        assert!(irc_eq("#Foo", "#foo"));
        assert!(irc_eq("nick[1]", "NICK{1}"));
        assert!(!irc_eq("nick", "nick_"));
        assert!(!irc_eq("a", "b"));
    }

    #[test]
    fn test_non_ascii_untouched() {
        assert_eq!(irc_to_lower("ÄBC"), "Äbc");
    }
}
