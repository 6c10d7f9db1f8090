//! Lenient text scanning for request bodies and stored rows.
//!
//! These functions deliberately do not validate their input. A JSON body is
//! scanned for a quoted key and the text after it is sliced out, without any
//! notion of escaping, nesting or key order. Numbers are read the way the C
//! library conversions read them: leading whitespace is skipped and the
//! longest numeric prefix wins, so `"12abc"` reads as 12.

/// Find the value of the string field `field` in `body`.
///
/// The value is the text between the first `"` after the key `"field"` and
/// the next `"`, or the end of `body` if there is no closing quote. Returns
/// `None` if the key is absent or no quote follows it, so a trailing
/// non-string value such as `{"type":5}` counts as a missing field instead of
/// slicing from the start of `body`.
///
/// The first occurrence of the key wins, even if it appears inside another
/// field's value.
pub fn extract_string_field<'a>(body: &'a str, field: &str) -> Option<&'a str> {
    let after_key = find_key_end(body, field)?;
    let start = after_key + body[after_key..].find('"')? + 1;
    let end = body[start..]
        .find('"')
        .map_or(body.len(), |offset| start + offset);

    Some(&body[start..end])
}

/// Find the raw text of the numeric field `field` in `body`.
///
/// The text runs from just after the first `:` following the key `"field"`
/// up to the next `,` or `}`, or the end of `body`. It is not trimmed.
/// Returns `None` if the key is absent or no `:` follows it.
pub fn extract_number_field<'a>(body: &'a str, field: &str) -> Option<&'a str> {
    let after_key = find_key_end(body, field)?;
    let start = after_key + body[after_key..].find(':')? + 1;
    let end = body[start..]
        .find([',', '}'])
        .map_or(body.len(), |offset| start + offset);

    Some(&body[start..end])
}

fn find_key_end(body: &str, field: &str) -> Option<usize> {
    let key = format!("\"{field}\"");

    body.find(&key).map(|position| position + key.len())
}

/// Read the longest floating point prefix of `text` after any leading whitespace.
///
/// Returns `None` if no prefix is a number.
pub fn leading_float(text: &str) -> Option<f64> {
    let text = trim_c_whitespace(text);
    let candidate_len = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());

    (1..=candidate_len)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
}

/// Read the leading integer of `text` after any leading whitespace.
///
/// An optional sign is followed by at least one digit; anything after the
/// digits is ignored. Returns `None` if there are no digits or the value does
/// not fit in an `i32`, the range of IDs in existing data files.
pub fn leading_int(text: &str) -> Option<i64> {
    let text = trim_c_whitespace(text);
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits_len = text[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - sign_len);

    if digits_len == 0 {
        return None;
    }

    text[..sign_len + digits_len].parse::<i32>().ok().map(i64::from)
}

/// Strip the characters C's `isspace` accepts, which include vertical tab.
fn trim_c_whitespace(text: &str) -> &str {
    text.trim_start_matches([' ', '\t', '\n', '\x0b', '\x0c', '\r'])
}

#[cfg(test)]
mod tests {
    use super::{extract_number_field, extract_string_field, leading_float, leading_int};

    const LUNCH: &str =
        r#"{"type":"pengeluaran","category":"Food","amount":25000,"description":"Lunch"}"#;

    #[test]
    fn extracts_string_fields() {
        assert_eq!(extract_string_field(LUNCH, "type"), Some("pengeluaran"));
        assert_eq!(extract_string_field(LUNCH, "category"), Some("Food"));
        assert_eq!(extract_string_field(LUNCH, "description"), Some("Lunch"));
    }

    #[test]
    fn missing_key_gives_none() {
        assert_eq!(extract_string_field(LUNCH, "date"), None);
        assert_eq!(extract_number_field(LUNCH, "date"), None);
    }

    #[test]
    fn extracts_number_text_up_to_comma_or_brace() {
        assert_eq!(extract_number_field(LUNCH, "amount"), Some("25000"));
        assert_eq!(
            extract_number_field(r#"{"amount": 12.5}"#, "amount"),
            Some(" 12.5")
        );
        assert_eq!(extract_number_field(r#"{"amount":7"#, "amount"), Some("7"));
    }

    #[test]
    fn tolerates_whitespace_between_key_and_value() {
        let body = r#"{ "type" : "pemasukan" , "category":  "Gaji" }"#;

        assert_eq!(extract_string_field(body, "type"), Some("pemasukan"));
        assert_eq!(extract_string_field(body, "category"), Some("Gaji"));
    }

    #[test]
    fn unterminated_string_runs_to_end_of_body() {
        assert_eq!(
            extract_string_field(r#"{"description":"Lunch"#, "description"),
            Some("Lunch")
        );
    }

    #[test]
    fn escaped_quotes_end_the_value() {
        let body = r#"{"description":"say \"hi\""}"#;

        assert_eq!(extract_string_field(body, "description"), Some(r"say \"));
    }

    #[test]
    fn first_occurrence_of_key_wins_even_inside_a_value() {
        let body = r#"{"note":"type","type":"pemasukan"}"#;

        // `"type"` first appears as the value of `note`, so the scan starts there.
        assert_eq!(extract_string_field(body, "type"), Some("type"));
    }

    #[test]
    fn non_string_value_takes_next_quoted_text() {
        let body = r#"{"category":5,"description":"Lunch"}"#;

        assert_eq!(extract_string_field(body, "category"), Some("description"));
    }

    #[test]
    fn key_without_following_quote_gives_none() {
        assert_eq!(extract_string_field(r#"{"type":5}"#, "type"), None);
        assert_eq!(extract_string_field(r#"{"amount":1,"type""#, "type"), None);
    }

    #[test]
    fn leading_float_reads_numeric_prefix() {
        assert_eq!(leading_float("25000"), Some(25000.0));
        assert_eq!(leading_float(" 12.5"), Some(12.5));
        assert_eq!(leading_float("-3.25abc"), Some(-3.25));
        assert_eq!(leading_float("1e3"), Some(1000.0));
        assert_eq!(leading_float("1.23457e+06"), Some(1234570.0));
        assert_eq!(leading_float("2e"), Some(2.0));
        assert_eq!(leading_float("12-"), Some(12.0));
    }

    #[test]
    fn leading_float_rejects_text() {
        assert_eq!(leading_float(""), None);
        assert_eq!(leading_float(" Drinks"), None);
        assert_eq!(leading_float("\"25000\""), None);
        assert_eq!(leading_float("."), None);
    }

    #[test]
    fn leading_int_reads_digit_prefix() {
        assert_eq!(leading_int("42"), Some(42));
        assert_eq!(leading_int("  7"), Some(7));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("+3"), Some(3));
        assert_eq!(leading_int("5?confirm=1"), Some(5));
        assert_eq!(leading_int("12.9"), Some(12));
    }

    #[test]
    fn leading_int_rejects_text() {
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int("99999999999999999999"), None);
    }

    #[test]
    fn leading_int_is_limited_to_32_bits() {
        assert_eq!(leading_int("2147483647"), Some(2147483647));
        assert_eq!(leading_int("-2147483648"), Some(-2147483648));
        assert_eq!(leading_int("2147483648"), None);
        assert_eq!(leading_int("4294967296"), None);
    }
}
