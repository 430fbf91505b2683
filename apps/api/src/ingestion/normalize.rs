use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ZEROS_BEFORE_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"0+[A-Za-z]").unwrap());

/// Normalizes OCR output: collapses whitespace, patches two common misreads
/// (`|` read for `l`, `0` read for `O` in front of a letter) and trims.
///
/// Idempotent. Both substitutions will also rewrite legitimate pipes and
/// zero-letter sequences such as "10km".
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let piped = collapsed.replace('|', "l");
    // A whole run of zeros is rewritten so a second pass finds nothing left.
    let zeroed = ZEROS_BEFORE_LETTER.replace_all(&piped, |caps: &Captures| {
        let matched = &caps[0];
        let letter_at = matched.len() - 1;
        format!("{}{}", "O".repeat(letter_at), &matched[letter_at..])
    });
    zeroed.trim().to_string()
}
