//! Keyword tables used to recognise table headers and reject non-indicator text.
//!
//! Every table is an ordered slice of lowercase substrings. Matching is a
//! plain `contains` on lowercased text, so extending a table is a one-line
//! change. Russian forms are stems (`"исслед"` covers `"Исследование"`,
//! `"исследования"`, ...). Short keywords that also occur inside analyte
//! names live in [`ROW_BLACKLIST_WORDS`] and only match whole words.

use crate::layout::header::ColumnKind;

/// Header keyword families, in match priority order.
///
/// A header cell is assigned to the first family with a matching keyword.
/// Reference comes first because its captions often contain the value stem
/// (`"Референсные значения"`), and Name precedes Units because `"ед"` is a
/// substring of `"исследование"`.
pub const HEADER_KEYWORDS: &[(ColumnKind, &[&str])] = &[
    (
        ColumnKind::Reference,
        &["норм", "реф", "ref", "range", "interval", "интервал"],
    ),
    (
        ColumnKind::Name,
        &[
            "исслед",
            "показат",
            "наименован",
            "тест",
            "анализ",
            "test",
            "analyte",
            "parameter",
            "investigation",
        ],
    ),
    (ColumnKind::Value, &["значен", "результ", "result", "value"]),
    // Header text is padded with a trailing space before matching, so "ед "
    // also catches a bare "Ед" caption.
    (ColumnKind::Units, &["ед.", "ед ", "единиц", "unit"]),
];

/// Administrative keywords that disqualify a layout row outright.
///
/// Rows carrying these are structurally identical to table rows but are
/// patient, order or laboratory metadata.
pub const ROW_BLACKLIST: &[&str] = &[
    "пациент",
    "patient",
    "дата",
    "возраст",
    "пол:",
    "согласи",
    "consent",
    "паспорт",
    "passport",
    "адрес",
    "address",
    "заказ",
    "номер",
    "врач",
    "doctor",
    "physician",
    "исполнитель",
    "подпись",
    "signature",
    "лиценз",
    "license",
    "телефон",
    "phone",
    "e-mail",
    "email",
];

/// Row keywords matched as whole words.
///
/// A word may carry trailing digits (`"iso15189"`). As substrings these
/// would reject `"Cortisol"` or `"Стандартный бикарбонат"`.
pub const ROW_BLACKLIST_WORDS: &[&str] = &[
    "фио", "date", "order", "iso", "гост", "стандарт", "полис",
];

/// Lines of OCR text that never carry an indicator.
pub const TEXT_SKIP_KEYWORDS: &[&str] = &[
    "пациент",
    "patient",
    "фио",
    "дата",
    "date",
    "возраст",
    "пол:",
    "паспорт",
    "passport",
    "адрес",
    "address",
    "заказ",
    "order",
    "врач",
    "doctor",
    "клиник",
    "clinic",
    "медицинский центр",
    "medical center",
    "лаборатори",
    "laboratory",
    "лиценз",
    "license",
    "телефон",
    "тел.",
    "тел:",
    "phone",
    "e-mail",
    "email",
    "www.",
    "http",
    ".ru",
    ".com",
    "страниц",
    "page",
    "подпись",
    "signature",
    "исполнитель",
    "комментари",
    "примечани",
];

/// Markers of the closing disclaimer. Nothing after them is trusted.
pub const DOCUMENT_END_MARKERS: &[&str] = &[
    "не является диагнозом",
    "не являются диагнозом",
    "не является медицинским заключением",
    "не является окончательным диагнозом",
    "требуют консультации врача",
    "проконсультируйтесь с врачом",
    "is not a diagnosis",
    "not a medical diagnosis",
    "consult your physician",
];

/// Markers of order or sample numbers inside a candidate name.
pub const NUMBER_MARKERS: &[&str] = &["№", "#", "n°", "no."];

/// Whether `lowercase` contains any keyword of `table`.
pub fn contains_any(lowercase: &str, table: &[&str]) -> bool {
    table.iter().any(|kw| lowercase.contains(kw))
}

/// Whether some word of `lowercase` is a keyword of `words`, optionally
/// followed by digits.
pub fn contains_word(lowercase: &str, words: &[&str]) -> bool {
    lowercase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| {
            words.iter().any(|kw| {
                w.strip_prefix(kw)
                    .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
            })
        })
}

/// Whether a lowercased row or name carries administrative metadata.
pub fn is_blacklisted(lowercase: &str) -> bool {
    contains_any(lowercase, ROW_BLACKLIST) || contains_word(lowercase, ROW_BLACKLIST_WORDS)
}

/// Column family a header caption belongs to, if any.
///
/// # Examples
///
/// ```
/// use lab_oxide::indicators::lexicon::header_kind;
/// use lab_oxide::layout::header::ColumnKind;
///
/// assert_eq!(header_kind("Референсные значения"), Some(ColumnKind::Reference));
/// assert_eq!(header_kind("Исследование"), Some(ColumnKind::Name));
/// assert_eq!(header_kind("Ед"), Some(ColumnKind::Units));
/// assert_eq!(header_kind("Глюкоза"), None);
/// ```
pub fn header_kind(text: &str) -> Option<ColumnKind> {
    let padded = format!("{} ", text.trim().to_lowercase());
    HEADER_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&padded, keywords))
        .map(|(kind, _)| *kind)
}

/// Whether a text line mentions every header family at once.
pub fn is_header_line(text: &str) -> bool {
    let padded = format!("{} ", text.to_lowercase());
    HEADER_KEYWORDS
        .iter()
        .all(|(_, keywords)| contains_any(&padded, keywords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_kind_priorities() {
        assert_eq!(header_kind("Значение"), Some(ColumnKind::Value));
        assert_eq!(header_kind("Результат"), Some(ColumnKind::Value));
        assert_eq!(header_kind("Ед. изм."), Some(ColumnKind::Units));
        assert_eq!(header_kind("Единицы"), Some(ColumnKind::Units));
        assert_eq!(header_kind("Норма"), Some(ColumnKind::Reference));
        assert_eq!(header_kind("Показатель"), Some(ColumnKind::Name));
        assert_eq!(header_kind("Reference range"), Some(ColumnKind::Reference));
        assert_eq!(header_kind("Units"), Some(ColumnKind::Units));
    }

    #[test]
    fn test_header_kind_ignores_plain_rows() {
        assert_eq!(header_kind("5.6"), None);
        assert_eq!(header_kind("ммоль/л"), None);
        assert_eq!(header_kind("Холестерин"), None);
    }

    #[test]
    fn test_is_header_line() {
        assert!(is_header_line("Исследование Результат Ед. изм. Референсные значения"));
        assert!(is_header_line("Test Result Units Reference range"));
        assert!(!is_header_line("Глюкоза 5.6 ммоль/л 3.9-5.5"));
        assert!(!is_header_line("Исследование Результат"));
    }

    #[test]
    fn test_blacklist_words_need_word_boundaries() {
        assert!(!is_blacklisted("cortisol"));
        assert!(!is_blacklisted("стандартный бикарбонат"));
        assert!(!is_blacklisted("полисахариды"));
        assert!(is_blacklisted("стандарт iso 15189"));
        assert!(is_blacklisted("гост р 53079"));
        assert!(is_blacklisted("iso15189:2012"));
        assert!(is_blacklisted("order no. 12"));
        assert!(is_blacklisted("пациент: иванов"));
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("дата рождения: 01.01.1990", ROW_BLACKLIST));
        assert!(!contains_any("глюкоза 5.6", ROW_BLACKLIST));
        assert!(contains_any(
            "результаты не являются диагнозом и требуют консультации врача",
            DOCUMENT_END_MARKERS
        ));
    }
}
