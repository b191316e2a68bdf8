use crate::utils::constants::{KM_PER_MILE, MILES_PER_KM};

/// Title-case a name: the first letter of every alphabetic run is upper-cased,
/// every other letter lower-cased.
///
/// # Examples
/// ```
/// use trailiq_etl::utils::title_case;
///
/// assert_eq!(title_case("ANDAMAN & NICOBAR ISLANDS"), "Andaman & Nicobar Islands");
/// assert_eq!(title_case("jammu and kashmir"), "Jammu And Kashmir");
/// ```
pub fn title_case(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut previous_alphabetic = false;

    for c in raw.chars() {
        if c.is_alphabetic() {
            if previous_alphabetic {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            result.push(c);
            previous_alphabetic = false;
        }
    }

    result
}

/// Parse a free-text trail length into (km, miles).
///
/// The first number in the text is the distance. It is read as miles when the
/// unit right after it starts with "mi", otherwise as kilometres.
pub fn parse_length(text: &str) -> (Option<f64>, Option<f64>) {
    let Some((value, unit)) = first_number(text) else {
        return (None, None);
    };

    if unit.trim_start().to_lowercase().starts_with("mi") {
        (Some(value * KM_PER_MILE), Some(value))
    } else {
        (Some(value), Some(value * MILES_PER_KM))
    }
}

/// First decimal number in `text` and the text that follows it.
///
/// A number is a digit run with an optional fraction, or a fraction alone
/// (".5"). A full stop with no digit after it is punctuation.
fn first_number(text: &str) -> Option<(f64, &str)> {
    let bytes = text.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let start = (0..bytes.len())
        .find(|&i| digit_at(i) || (bytes[i] == b'.' && digit_at(i + 1)))?;

    let mut end = start;
    while digit_at(end) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') && digit_at(end + 1) {
        end += 1;
        while digit_at(end) {
            end += 1;
        }
    }

    let value = text[start..end].parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((value, &text[end..]))
}

/// Parse a numeric cell, tolerating thousands separators. Blank cells are `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trim a cell and map blanks to `None`
pub fn non_blank(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
