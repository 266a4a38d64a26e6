//! Property-based tests for the dotenv parser.
//!
//! - Parsing is total over arbitrary bytes and text.
//! - Plain values survive quoting unchanged.
//! - Escaped `=` and `#` decode to their literal characters.
//! - The last assignment of a key wins.

use proptest::prelude::*;
use withenv::{Inference, Value, parse_bytes, parse_bytes_with_mode, parse_str, parse_str_with_mode};

fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,12}".prop_map(String::from)
}

/// Values without quotes, escapes, `=`, `#` or surrounding whitespace.
fn plain_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_./:@-]([A-Za-z0-9_ ./:@-]{0,20}[A-Za-z0-9_./:@-])?".prop_map(String::from)
}

proptest! {
    #[test]
    fn parsing_arbitrary_bytes_never_panics(input in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_bytes(&input);
        let _ = parse_bytes_with_mode(&input, Inference::Enabled);
    }

    #[test]
    fn parsing_arbitrary_text_yields_valid_keys(input in "(?s).{0,256}") {
        for entry in parse_str_with_mode(&input, Inference::Enabled) {
            let mut chars = entry.key.chars();
            let first = chars.next().expect("keys are never empty");
            prop_assert!(first.is_ascii_alphabetic() || first == '_');
            prop_assert!(chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_'));
        }
    }

    #[test]
    fn quoting_a_plain_value_changes_nothing(key in key_strategy(), value in plain_value_strategy()) {
        let bare = parse_str(&format!("{key}={value}\n"));
        let double = parse_str(&format!("{key}=\"{value}\"\n"));
        let single = parse_str(&format!("{key}='{value}'\n"));

        prop_assert_eq!(&bare[0].value, &Value::String(value.clone()));
        prop_assert_eq!(&double[0].value, &bare[0].value);
        prop_assert_eq!(&single[0].value, &bare[0].value);
    }

    #[test]
    fn escaped_separators_decode(key in key_strategy(), left in "[a-z]{1,8}", right in "[a-z]{1,8}") {
        let parsed = parse_str(&format!("{key}={left}\\={right}\\#{left}\n"));

        prop_assert_eq!(
            &parsed[0].value,
            &Value::String(format!("{left}={right}#{left}"))
        );
    }

    #[test]
    fn last_assignment_wins(key in key_strategy(), first in plain_value_strategy(), second in plain_value_strategy()) {
        let parsed = parse_str(&format!("{key}={first}\n{key}={second}\n"));

        prop_assert_eq!(parsed.len(), 1);
        prop_assert_eq!(&parsed[0].value, &Value::String(second));
    }
}
