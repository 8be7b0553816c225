//! Field cleanup for extracted class and trainer names.

use std::sync::OnceLock;

use regex::Regex;

use crate::time::TIME_TOKEN;

/// Words that show up where a trainer name is expected but belong to the
/// class name or the time.
const TRAINER_STOPWORDS: &[&str] = &[
    "AM", "PM", "EXPRESS", "FULL", "BODY", "PUSH", "PULL", "LAB", "BARRE", "CYCLE", "MAT",
];

fn is_stopword(word: &str) -> bool {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric());
    TRAINER_STOPWORDS.iter().any(|s| s.eq_ignore_ascii_case(word))
}

/// Whether the text after a separator is a piece of the class name rather
/// than a trainer.
pub(crate) fn is_class_fragment(candidate: &str) -> bool {
    match candidate.split_whitespace().next() {
        Some(first) => is_stopword(first),
        None => true,
    }
}

/// A trainer name must have at least three characters and must not be one of
/// the known class or time words.
pub fn is_valid_trainer(name: &str) -> bool {
    let name = name.trim();
    if name.chars().count() < 3 || is_stopword(name) {
        return false;
    }
    !name
        .split_whitespace()
        .next()
        .is_some_and(|first| first.split('-').any(is_stopword))
}

fn theme_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<name>.*?)\s*\((?P<theme>[^()]*)\)?\s*$").unwrap())
}

fn name_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z'\u{2019}.\-]*$").unwrap())
}

/// Split a raw trainer field into the trainer name and an optional theme.
///
/// `"Anisha (Bollywood Night)"` becomes `("Anisha", Some("Bollywood Night"))`.
/// Trailing tokens that are not name-shaped (digits, OCR symbols) are dropped.
pub fn clean_trainer_name(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    let (name_part, theme) = match raw.find('(') {
        Some(_) => match theme_suffix_regex().captures(raw) {
            Some(caps) => {
                let theme = caps["theme"].trim().to_string();
                (
                    caps["name"].to_string(),
                    (!theme.is_empty()).then_some(theme),
                )
            }
            None => (raw.to_string(), None),
        },
        None => (raw.to_string(), None),
    };

    let name = name_part
        .split_whitespace()
        .take_while(|word| name_word_regex().is_match(word))
        .collect::<Vec<_>>()
        .join(" ");
    (name.trim_end_matches('.').to_string(), theme)
}

fn leading_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^\s*{TIME_TOKEN}[\s:.,\-]*")).unwrap())
}

fn trailing_noise_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\s+(?:[A-Z0-9]*\d[A-Z0-9]*[A-Z][A-Z0-9]*|[A-Z0-9]*[A-Z][A-Z0-9]*\d[A-Z0-9]*))+$")
            .unwrap()
    })
}

fn trailing_punct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s.,;:*~_=|/\\\-]+$").unwrap())
}

/// Clean a raw class name: strip a leading time, trailing OCR noise runs and
/// dangling punctuation, then balance parentheses.
pub fn clean_class_name(raw: &str) -> String {
    let mut name = leading_time_regex().replace(raw, "").into_owned();

    // "Barre 57 X3R" -> "Barre 57"; a noise run needs a digit and an
    // uppercase letter and at least three characters.
    if let Some(m) = trailing_noise_regex().find(&name) {
        let noise_len: usize = m.as_str().split_whitespace().map(str::len).min().unwrap_or(0);
        if noise_len >= 3 {
            name.truncate(m.start());
        }
    }

    let name = trailing_punct_regex().replace(&name, "");
    let name = name.trim_start_matches(|c: char| c.is_whitespace() || "-:.,".contains(c));
    balance_parentheses(&name.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Drop unmatched closing parentheses and close any left open.
fn balance_parentheses(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                out.push(c);
            }
            ')' if depth == 0 => {}
            ')' => {
                depth -= 1;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    let mut out = out.trim_end().to_string();
    for _ in 0..depth {
        out.push(')');
    }
    out
}
