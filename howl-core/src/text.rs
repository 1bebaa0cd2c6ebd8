//! Small text helpers shared by section builders and the transcript.

/// Upper-case the first character, leave the rest untouched.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Longest `name` the chat-completions API accepts on a message.
pub const MAX_NAME_LEN: usize = 64;

/// Reduce a display name to the `[A-Za-z0-9_-]{1,64}` shape chat APIs accept
/// in the per-message `name` field.
///
/// Spaces become underscores, anything else outside the allowed set is
/// dropped. Returns `None` when nothing survives.
#[must_use]
pub fn name_without_spaces(name: &str) -> Option<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .take(MAX_NAME_LEN)
        .collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Return the first signed integer found in `text`, if any.
///
/// Digit runs too long for `i64` saturate to `i64::MAX` or `i64::MIN`.
#[must_use]
pub fn first_integer(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    let mut start = None;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            let begin = if i > 0 && bytes[i - 1] == b'-' { i - 1 } else { i };
            start = Some(begin);
            break;
        }
    }
    let begin = start?;
    let end = bytes[begin + 1..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |p| begin + 1 + p);
    let negative = bytes[begin] == b'-';
    let digits = &bytes[if negative { begin + 1 } else { begin }..end];
    let magnitude = digits.iter().try_fold(0i64, |acc, d| {
        acc.checked_mul(10)?.checked_sub(i64::from(d - b'0'))
    });
    // Accumulated as a negative number so i64::MIN stays representable.
    Some(match (magnitude, negative) {
        (Some(n), true) => n,
        (Some(n), false) => n.checked_neg().unwrap_or(i64::MAX),
        (None, true) => i64::MIN,
        (None, false) => i64::MAX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("luna"), "Luna");
        assert_eq!(capitalize("mcGregor"), "McGregor");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("élise"), "Élise");
    }

    #[test]
    fn names_are_reduced_to_api_charset() {
        assert_eq!(name_without_spaces("Grey Wolf").as_deref(), Some("Grey_Wolf"));
        assert_eq!(name_without_spaces("żółw!").as_deref(), Some("w"));
        assert_eq!(name_without_spaces("🐺"), None);
        let long = "a".repeat(100);
        assert_eq!(name_without_spaces(&long).map(|n| n.len()), Some(MAX_NAME_LEN));
    }

    #[test]
    fn first_integer_handles_signs_and_noise() {
        assert_eq!(first_integer("7"), Some(7));
        assert_eq!(first_integer("Tone: -4 overall"), Some(-4));
        assert_eq!(first_integer("maybe 10/10"), Some(10));
        assert_eq!(first_integer("no digits"), None);
    }

    #[test]
    fn first_integer_saturates_on_overflow() {
        assert_eq!(first_integer("99999999999999999999"), Some(i64::MAX));
        assert_eq!(first_integer("rating -99999999999999999999!"), Some(i64::MIN));
        assert_eq!(first_integer("9223372036854775807"), Some(i64::MAX));
        assert_eq!(first_integer("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(first_integer("9223372036854775808"), Some(i64::MAX));
    }
}
