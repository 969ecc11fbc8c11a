//! Text normalization for the Orca engine's supported alphabet.

use crate::voice::Language;
use log::warn;
use regex::Regex;
use std::sync::OnceLock;

/// Glyphs rewritten before the allowlist is applied.
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{00ab}', "\""), // Left-pointing double angle quote
    ('\u{00bb}', "\""), // Right-pointing double angle quote
    ('\u{2039}', "'"),  // Single left-pointing angle quote
    ('\u{203a}', "'"),  // Single right-pointing angle quote
    ('\u{201c}', "\""), // Left double quote
    ('\u{201d}', "\""), // Right double quote
    ('\u{201e}', "\""), // Double low-9 quote
    ('\u{201f}', "\""), // Double high-reversed-9 quote
    ('\u{2018}', "'"),  // Left single quote
    ('\u{2019}', "'"),  // Right single quote
    ('\u{201a}', "'"),  // Single low-9 quote
    ('\u{201b}', "'"),  // Single high-reversed-9 quote
    ('\u{2032}', "'"),  // Prime
    ('\u{2033}', "\""), // Double prime
    ('\u{2011}', "-"),  // Non-breaking hyphen
    ('\u{2012}', "-"),  // Figure dash
    ('\u{2013}', "-"),  // En dash
    ('\u{2014}', "-"),  // Em dash
    ('\u{2015}', "-"),  // Horizontal bar
    ('\u{2026}', "..."), // Ellipsis
    ('\u{00a0}', " "),  // Non-breaking space
    ('\u{200b}', ""),   // Zero-width space
    ('\u{200c}', ""),   // Zero-width non-joiner
    ('\u{200d}', ""),   // Zero-width joiner
    ('\u{feff}', ""),   // BOM
];

/// Punctuation every language model accepts.
const BASE_PUNCTUATION: &str = ".,!?;:'\"()-";

/// Letters only the German models can pronounce.
const GERMAN_LETTERS: &str = "äöüÄÖÜß";

/// Compiled spacing rules.
struct SpacingRules {
    after_punctuation: Regex,
    hyphen_runs: Regex,
    before_hyphen: Regex,
    after_hyphen: Regex,
    whitespace: Regex,
}

impl SpacingRules {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            after_punctuation: Regex::new(r"([.!?,;:])([^\s\d.!?,;:])")?,
            hyphen_runs: Regex::new(r"-{2,}")?,
            before_hyphen: Regex::new(r"(\S)-")?,
            after_hyphen: Regex::new(r"-(\S)")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    fn apply(&self, text: &str) -> String {
        let text = self.hyphen_runs.replace_all(text, "-");
        let text = self.after_punctuation.replace_all(&text, "$1 $2");
        let text = space_before_parens(&text);
        let text = self.before_hyphen.replace_all(&text, "$1 -");
        let text = self.after_hyphen.replace_all(&text, "- $1");
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().to_string()
    }
}

/// Insert a space before every `(` that directly follows a non-space character.
fn space_before_parens(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if c == '(' && prev.is_some_and(|p| !p.is_whitespace()) {
            result.push(' ');
        }
        result.push(c);
        prev = Some(c);
    }

    result
}

static RULES: OnceLock<Result<SpacingRules, regex::Error>> = OnceLock::new();

fn spacing_rules() -> Result<&'static SpacingRules, &'static regex::Error> {
    RULES.get_or_init(SpacingRules::new).as_ref()
}

/// Normalize chapter text for synthesis.
///
/// This function:
/// - Unifies quote glyphs to `"` and `'` and replaces typographic dashes,
///   ellipses and invisible characters
/// - Drops characters outside the language's allowlist
/// - Repairs spacing around punctuation, parentheses and hyphens
/// - Collapses whitespace
///
/// Normalizing already-normalized text returns it unchanged. If the
/// spacing rules are unavailable the input is returned as-is.
pub fn normalize(text: &str, language: Language) -> String {
    match spacing_rules() {
        Ok(rules) => rules.apply(&filter_characters(text, language)),
        Err(e) => {
            warn!("Text normalization unavailable, passing text through: {}", e);
            text.to_string()
        }
    }
}

fn filter_characters(text: &str, language: Language) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        let replacement = REPLACEMENTS
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, r)| *r);

        if let Some(r) = replacement {
            result.push_str(r);
        } else if c.is_whitespace() {
            result.push(' ');
        } else if is_allowed_char(c, language) {
            result.push(c);
        }
    }

    result
}

/// Check if a character is in the engine alphabet for `language`.
fn is_allowed_char(c: char, language: Language) -> bool {
    if c.is_ascii_alphanumeric() || BASE_PUNCTUATION.contains(c) {
        return true;
    }

    language == Language::De && GERMAN_LETTERS.contains(c)
}
