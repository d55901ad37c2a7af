//! Headline normalization.
//!
//! [`clean_headline`] folds raw headline text into the restricted alphabet the
//! downstream model is trained on and swaps instrument-specific vocabulary
//! for coarse tokens such as `**COMPANY**` or `**PRODUCT**`.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered `(phrase, token)` pairs for one instrument.
pub type Lexicon = [(String, String)];

/// Final form of a percentage figure.
pub const STATISTIC_TOKEN: &str = "**statistic**";

/// Letters-only stand-in for a percentage while punctuation is stripped.
const STATISTIC_PLACEHOLDER: &str = "zqstatisticzq";

/// A percentage, or a statistic token left by an earlier pass.
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+%|\*\*statistic\*\*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize one headline.
///
/// Steps, in order:
/// 1. lowercase
/// 2. `12%` (or an existing [`STATISTIC_TOKEN`]) becomes the statistic placeholder
/// 3. drop everything outside `a-z` and space
/// 4. collapse whitespace runs
/// 5. apply each lexicon pair as a literal substring replacement, in order,
///    to the text between placeholders
/// 6. expand the placeholder to [`STATISTIC_TOKEN`]
/// 7. split tokens that ended up glued together (`****` becomes `** **`)
/// 8. trim
///
/// Replacement is never retried, so a lexicon must list longer phrases before
/// the shorter phrases they contain.
pub fn clean_headline(raw: &str, lexicon: &Lexicon) -> String {
    let lowered = raw.to_lowercase();
    let marked = PERCENTAGE.replace_all(&lowered, STATISTIC_PLACEHOLDER);
    let letters: String = marked
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ')
        .collect();
    let collapsed = WHITESPACE.replace_all(&letters, " ");

    collapsed
        .split(STATISTIC_PLACEHOLDER)
        .map(|segment| apply_lexicon(segment, lexicon))
        .join(STATISTIC_TOKEN)
        .replace("****", "** **")
        .trim()
        .to_string()
}

/// Step 5 on one stretch of text between statistic placeholders.
fn apply_lexicon(segment: &str, lexicon: &Lexicon) -> String {
    let mut text = segment.to_string();
    for (phrase, token) in lexicon {
        if !phrase.is_empty() {
            text = text.replace(phrase.as_str(), token);
        }
    }
    text
}
