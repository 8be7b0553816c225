use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Clean up OCR / text-layer output before layout reconstruction.
///
/// Applies unicode normalization, ligature replacement, dash unification,
/// replacement character removal and per-line whitespace normalization.
/// Line breaks are preserved: they are the only structure flat text has.
pub fn cleanup_text(text: &str) -> String {
    // 1. Unicode NFC normalization.
    let mut result: String = text.nfc().collect();

    // 2. Fix ligatures (fi, fl, ffi, ffl).
    let ligatures = [
        ("\u{FB00}", "ff"),
        ("\u{FB01}", "fi"),
        ("\u{FB02}", "fl"),
        ("\u{FB03}", "ffi"),
        ("\u{FB04}", "ffl"),
    ];
    for (lig, replacement) in &ligatures {
        result = result.replace(lig, replacement);
    }

    // 3. Unify dash-like separators; OCR picks whichever glyph it likes.
    for dash in ['\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}'] {
        result = result.replace(dash, "-");
    }

    // 4. Remove Unicode replacement character and stray pipes from table rules.
    result = result.replace('\u{FFFD}', "");
    result = result.replace(['|', '\u{00A6}'], " ");

    // 5. Collapse horizontal whitespace and carriage returns per line.
    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

    result
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| re_spaces.replace_all(line.trim(), " ").to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lower-case, punctuation-free form used for vocabulary keys and loose
/// string comparisons.  Parentheses and apostrophes are dropped; every other
/// non-alphanumeric run becomes one space.
pub fn fold_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.nfc().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else if c == '\'' || c == '\u{2019}' {
            continue;
        } else {
            pending_space = true;
        }
    }
    out
}
