//! Number, range and name parsing shared by every decoder.

use crate::indicators::lexicon::{contains_any, is_blacklisted, NUMBER_MARKERS};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Unsigned decimal number, comma or dot as separator
    static ref RE_NUMBER: Regex = Regex::new(r"\d+(?:[.,]\d+)?").unwrap();

    /// A token that is nothing but a number
    static ref RE_STRICT_NUMBER: Regex = Regex::new(r"^[-+]?\d+(?:[.,]\d+)?$").unwrap();

    /// "min-max" with hyphen, en dash or em dash
    static ref RE_RANGE: Regex =
        Regex::new(r"(\d+(?:[.,]\d+)?)\s*[-–—]\s*(\d+(?:[.,]\d+)?)").unwrap();

    /// A token that is nothing but a range, optionally parenthesised
    static ref RE_STRICT_RANGE: Regex =
        Regex::new(r"^\(?\s*\d+(?:[.,]\d+)?\s*[-–—]\s*\d+(?:[.,]\d+)?\s*\)?$").unwrap();

    /// Comparator bound such as "< 5.2" or "≥ 1,0"
    static ref RE_COMPARATOR: Regex =
        Regex::new(r"(<=|>=|≤|≥|<|>)\s*(\d+(?:[.,]\d+)?)").unwrap();
}

/// Shortest accepted indicator name, in characters.
pub const MIN_NAME_CHARS: usize = 3;

/// Longest accepted indicator name, in characters.
pub const MAX_NAME_CHARS: usize = 80;

/// Longest accepted units string, in characters.
pub const MAX_UNITS_CHARS: usize = 20;

/// Digit share above which a table name is treated as noise.
pub const NAME_DIGIT_DENSITY_LIMIT: f32 = 0.25;

/// Characters that mark a units string even without letters.
const UNIT_SYMBOLS: &[char] = &['%', '/', 'µ', 'μ', '^', '‰', '°'];

/// Punctuation trimmed from both ends of a candidate name.
const NAME_TRIM: &[char] = &[':', ';', ',', '.', '-', '–', '—', '*', '•', '·', '_', '|', '"', '\''];

/// Why a candidate name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRejection {
    /// Fewer than [`MIN_NAME_CHARS`] characters
    TooShort,
    /// More than [`MAX_NAME_CHARS`] characters
    TooLong,
    /// First character is not a letter
    LeadingNonLetter,
    /// Contains an administrative keyword
    Blacklisted,
    /// Digit density above [`NAME_DIGIT_DENSITY_LIMIT`]
    DigitHeavy,
    /// Contains an order or sample number marker
    NumberMarker,
}

/// A one-sided reference bound parsed from a comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `<` or `<=`: the value is the reference maximum
    Max(f64),
    /// `>` or `>=`: the value is the reference minimum
    Min(f64),
}

/// Parse a decimal number that may use a comma separator.
///
/// # Examples
///
/// ```
/// use lab_oxide::indicators::parse::parse_number;
///
/// assert_eq!(parse_number("5,6"), Some(5.6));
/// assert_eq!(parse_number(" 42 "), Some(42.0));
/// assert_eq!(parse_number("abc"), None);
/// ```
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

/// All numbers in `text`, in order.
///
/// A minus sign counts as a sign only when it does not follow a digit, so
/// `"3.9-5.5"` yields `3.9, 5.5` while `"BE -2.1"` yields `-2.1`.
pub fn numbers(text: &str) -> Vec<f64> {
    RE_NUMBER
        .find_iter(text)
        .filter_map(|m| {
            let value = parse_number(m.as_str())?;
            let before = &text[..m.start()];
            let mut prev = before.chars().rev();
            let negative = prev.next() == Some('-')
                && prev.next().map_or(true, |c| c.is_whitespace() || c == '(');
            Some(if negative { -value } else { value })
        })
        .collect()
}

/// First number in `text`.
pub fn first_number(text: &str) -> Option<f64> {
    numbers(text).into_iter().next()
}

/// Whether `text` is a bare number.
pub fn is_strict_number(text: &str) -> bool {
    RE_STRICT_NUMBER.is_match(text.trim())
}

/// Whether `text` is a bare range such as `"3.9-5.5"` or `"(0 - 40)"`.
pub fn is_strict_range(text: &str) -> bool {
    RE_STRICT_RANGE.is_match(text.trim())
}

/// First `min-max` range in `text`.
///
/// # Examples
///
/// ```
/// use lab_oxide::indicators::parse::parse_range;
///
/// assert_eq!(parse_range("3.9-5.5"), Some((3.9, 5.5)));
/// assert_eq!(parse_range("(0 – 40)"), Some((0.0, 40.0)));
/// assert_eq!(parse_range("< 5.2"), None);
/// ```
pub fn parse_range(text: &str) -> Option<(f64, f64)> {
    let caps = RE_RANGE.captures(text)?;
    let min = parse_number(caps.get(1)?.as_str())?;
    let max = parse_number(caps.get(2)?.as_str())?;
    Some((min, max))
}

/// First comparator bound in `text`.
pub fn parse_comparator(text: &str) -> Option<Bound> {
    let caps = RE_COMPARATOR.captures(text)?;
    let value = parse_number(caps.get(2)?.as_str())?;
    match caps.get(1)?.as_str() {
        "<" | "<=" | "≤" => Some(Bound::Max(value)),
        _ => Some(Bound::Min(value)),
    }
}

/// Share of ASCII digits among the non-whitespace characters of `text`.
pub fn digit_density(text: &str) -> f32 {
    let (digits, total) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(d, t), c| {
            (d + usize::from(c.is_ascii_digit()), t + 1)
        });
    if total == 0 {
        0.0
    } else {
        digits as f32 / total as f32
    }
}

/// Trim whitespace and edge punctuation from a raw name.
pub fn clean_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || NAME_TRIM.contains(&c))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean and validate a table-derived indicator name.
///
/// Returns the cleaned name, or why it was rejected.
pub fn validate_name(raw: &str) -> Result<String, NameRejection> {
    let name = clean_name(raw);
    let len = name.chars().count();

    if len < MIN_NAME_CHARS {
        return Err(NameRejection::TooShort);
    }
    if len > MAX_NAME_CHARS {
        return Err(NameRejection::TooLong);
    }
    if !name.chars().next().is_some_and(char::is_alphabetic) {
        return Err(NameRejection::LeadingNonLetter);
    }

    let lower = name.to_lowercase();
    if is_blacklisted(&lower) {
        return Err(NameRejection::Blacklisted);
    }
    if digit_density(&lower) > NAME_DIGIT_DENSITY_LIMIT {
        return Err(NameRejection::DigitHeavy);
    }
    if contains_any(&lower, NUMBER_MARKERS) {
        return Err(NameRejection::NumberMarker);
    }

    Ok(name)
}

/// Accept `text` as units if it is short and looks like a unit.
///
/// # Examples
///
/// ```
/// use lab_oxide::indicators::parse::clean_units;
///
/// assert_eq!(clean_units("ммоль/л"), Some("ммоль/л".to_string()));
/// assert_eq!(clean_units("%"), Some("%".to_string()));
/// assert_eq!(clean_units("42"), None);
/// ```
pub fn clean_units(text: &str) -> Option<String> {
    let units = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if units.is_empty() || units.chars().count() > MAX_UNITS_CHARS {
        return None;
    }
    if is_strict_number(&units) || is_strict_range(&units) {
        return None;
    }
    let unit_like = units
        .chars()
        .any(|c| c.is_alphabetic() || UNIT_SYMBOLS.contains(&c));
    unit_like.then_some(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_dash_is_separator_after_digit() {
        assert_eq!(numbers("3.9-5.5"), vec![3.9, 5.5]);
        assert_eq!(numbers("BE -2.1"), vec![-2.1]);
        assert_eq!(numbers("-0,5"), vec![-0.5]);
        assert_eq!(numbers("(-3 - 3)"), vec![-3.0, 3.0]);
        assert!(numbers("ммоль/л").is_empty());
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("5.6 ммоль/л"), Some(5.6));
        assert_eq!(first_number("↑ 7,2"), Some(7.2));
        assert_eq!(first_number("нет"), None);
    }

    #[test]
    fn test_strict_number_and_range() {
        assert!(is_strict_number("5.6"));
        assert!(is_strict_number("140"));
        assert!(is_strict_number("-2,1"));
        assert!(!is_strict_number("5.6*"));
        assert!(!is_strict_number("3.9-5.5"));

        assert!(is_strict_range("3.9-5.5"));
        assert!(is_strict_range("(0 - 40)"));
        assert!(!is_strict_range("до 5.5"));
    }

    #[test]
    fn test_parse_comparator() {
        assert_eq!(parse_comparator("< 5.2"), Some(Bound::Max(5.2)));
        assert_eq!(parse_comparator("<=200"), Some(Bound::Max(200.0)));
        assert_eq!(parse_comparator("≥ 1,0"), Some(Bound::Min(1.0)));
        assert_eq!(parse_comparator("> 60"), Some(Bound::Min(60.0)));
        assert_eq!(parse_comparator("3.9-5.5"), None);
    }

    #[test]
    fn test_digit_density() {
        assert_eq!(digit_density(""), 0.0);
        assert_eq!(digit_density("ab12"), 0.5);
        assert_eq!(digit_density("a b 1 2"), 0.5);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Глюкоза: "), "Глюкоза");
        assert_eq!(clean_name("* Общий   белок -"), "Общий белок");
        assert_eq!(clean_name("Гемоглобин (HGB)"), "Гемоглобин (HGB)");
    }

    #[test]
    fn test_validate_name_accepts() {
        assert_eq!(validate_name("Glucose").unwrap(), "Glucose");
        assert_eq!(validate_name("ALT:").unwrap(), "ALT");
        assert_eq!(validate_name("Витамин B12").unwrap(), "Витамин B12");
    }

    #[test]
    fn test_validate_name_rejects() {
        assert_eq!(validate_name("Hb"), Err(NameRejection::TooShort));
        assert_eq!(validate_name(&"a".repeat(81)), Err(NameRejection::TooLong));
        assert_eq!(validate_name("25-OH vitamin"), Err(NameRejection::LeadingNonLetter));
        assert_eq!(validate_name("Дата рождения"), Err(NameRejection::Blacklisted));
        assert_eq!(validate_name("AB 1234567"), Err(NameRejection::DigitHeavy));
        assert_eq!(validate_name("Проба № 5"), Err(NameRejection::NumberMarker));
    }

    #[test]
    fn test_clean_units() {
        assert_eq!(clean_units("U/L"), Some("U/L".to_string()));
        assert_eq!(clean_units("10^9/л"), Some("10^9/л".to_string()));
        assert_eq!(clean_units(""), None);
        assert_eq!(clean_units("3.9-5.5"), None);
        assert_eq!(clean_units("очень длинный комментарий к анализу"), None);
    }
}
