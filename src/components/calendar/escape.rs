/// Escape free text for an iCalendar TEXT property value.
///
/// Substitutes, in order: backslash, newline, semicolon, comma. Every other
/// character is left alone. Not idempotent: escaping twice doubles the
/// backslashes, so call it exactly once per field.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(';', "\\;")
        .replace(',', "\\,")
}

/// Prepare a property parameter value such as `CN`.
///
/// Parameter values cannot be backslash-escaped, so they get quoted instead
/// when they contain a delimiter. DQUOTE is not allowed inside a quoted value.
pub fn param_value(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '"' && *c != '\n' && *c != '\r')
        .collect();

    if cleaned.contains([':', ';', ',']) {
        format!("\"{}\"", cleaned)
    } else {
        cleaned
    }
}
