//! Line-by-line decoding of flat OCR or page text.
//!
//! Decoding starts after the first line that names all four column families,
//! or at the top when no such line exists. Boilerplate lines are skipped and
//! a closing disclaimer ends the scan.

use crate::indicators::lexicon::{
    contains_any, is_header_line, DOCUMENT_END_MARKERS, TEXT_SKIP_KEYWORDS,
};
use crate::indicators::merge::dedup_first;
use crate::indicators::parse::{
    clean_name, clean_units, digit_density, parse_comparator, parse_number, MIN_NAME_CHARS,
};
use crate::indicators::Candidate;
use crate::reference::{ReferenceRange, KNOWN_TESTS};
use lazy_static::lazy_static;
use regex::Regex;

/// Digit share above which a line with `:` or `.` is treated as an identifier.
pub const LINE_DIGIT_DENSITY_LIMIT: f32 = 0.35;

lazy_static! {
    /// name, value, optional units, optional "min-max" range
    static ref RE_TEXT_ROW: Regex = Regex::new(
        r"(?P<name>\p{L}[\p{L}\d\- ]{2,49}?)\s+(?P<value>[-+]?\d+(?:[.,]\d+)?)(?:\s*(?P<unit>[\p{L}%µ][\p{L}\d%µ/\^\*\.]{0,11}))?(?:\s*\(?\s*(?P<min>\d+(?:[.,]\d+)?)\s*[-–—]\s*(?P<max>\d+(?:[.,]\d+)?)\s*\)?)?"
    )
    .unwrap();

    static ref KNOWN_PATTERNS: Vec<(&'static ReferenceRange, Regex)> = KNOWN_TESTS
        .iter()
        .map(|test| (test, Regex::new(test.pattern).unwrap()))
        .collect();
}

/// Decode every indicator mention on one line.
///
/// The line is expected to have passed the skip filters already. A match
/// without a range takes a comparator bound only from the text between its
/// end and the start of the next match.
pub fn decode_line(line: &str) -> Vec<Candidate> {
    let mut out = Vec::new();
    let matches: Vec<_> = RE_TEXT_ROW.captures_iter(line).collect();

    for (idx, caps) in matches.iter().enumerate() {
        let tail_start = caps.get(0).map_or(line.len(), |m| m.end());
        let tail_end = matches
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(line.len(), |m| m.start());
        let tail = &line[tail_start..tail_end];

        let Some(raw_name) = caps.name("name") else {
            continue;
        };
        let name = clean_name(raw_name.as_str());
        if name.chars().count() < MIN_NAME_CHARS
            || contains_any(&name.to_lowercase(), TEXT_SKIP_KEYWORDS)
        {
            log::trace!("text match rejected (name '{}'): {}", name, line);
            continue;
        }

        let Some(value) = caps.name("value").and_then(|m| parse_number(m.as_str())) else {
            continue;
        };
        let mut candidate = Candidate::new(name).with_value(value);
        candidate.units = caps.name("unit").and_then(|m| clean_units(m.as_str()));

        let range = caps
            .name("min")
            .and_then(|m| parse_number(m.as_str()))
            .zip(caps.name("max").and_then(|m| parse_number(m.as_str())));
        match range {
            Some((min, max)) => {
                candidate.ref_min = Some(min);
                candidate.ref_max = Some(max);
            },
            None => {
                if let Some(bound) = parse_comparator(tail) {
                    candidate.apply_bound(bound);
                }
            },
        }

        out.push(candidate);
    }

    out
}

/// Decode the table lines of `text`, first mention of each name wins.
pub fn decode_lines(text: &str) -> Vec<Candidate> {
    let lines: Vec<&str> = text.lines().collect();
    let start = match lines.iter().position(|l| is_header_line(l)) {
        Some(idx) => {
            log::debug!("text header found on line {}", idx + 1);
            idx + 1
        },
        None => 0,
    };

    let mut candidates = Vec::new();
    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();
        if contains_any(&lower, DOCUMENT_END_MARKERS) {
            log::debug!("text decoding stopped at disclaimer: {}", line);
            break;
        }
        if contains_any(&lower, TEXT_SKIP_KEYWORDS) {
            log::trace!("line skipped (keyword): {}", line);
            continue;
        }
        if (line.contains(':') || line.contains('.'))
            && digit_density(line) > LINE_DIGIT_DENSITY_LIMIT
        {
            log::trace!("line skipped (digit-heavy): {}", line);
            continue;
        }

        candidates.extend(decode_line(line));
    }

    dedup_first(candidates)
}

/// Well-known tests mentioned anywhere in `text` and absent from `existing`.
///
/// Each catalog entry contributes at most one candidate, with the catalog's
/// units and reference range.
pub fn detect_known_tests(text: &str, existing: &[Candidate]) -> Vec<Candidate> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    KNOWN_PATTERNS
        .iter()
        .filter(|(test, _)| !existing.iter().any(|c| test.matches(&c.test_name)))
        .filter_map(|(test, re)| {
            let value = parse_number(re.captures(&normalized)?.get(1)?.as_str())?;
            log::debug!("known test '{}' detected in text: {}", test.name, value);
            Some(
                Candidate::new(test.name)
                    .with_value(value)
                    .with_units(test.units)
                    .with_range(test.ref_min, test.ref_max),
            )
        })
        .collect()
}

/// Decode a block of OCR or page text.
///
/// Known tests already present in `existing` (typically candidates of an
/// earlier pass over the same document) or among the decoded lines are not
/// emitted again under their catalog name.
pub fn decode_text(text: &str, known_tests: bool, existing: &[Candidate]) -> Vec<Candidate> {
    let mut candidates = decode_lines(text);
    if known_tests {
        let seen: Vec<Candidate> = existing.iter().chain(&candidates).cloned().collect();
        let known = detect_known_tests(text, &seen);
        candidates.extend(known);
    }
    candidates
}
