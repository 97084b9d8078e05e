//! Identifier normalization
//!
//! Raw schema names (`ORIENTATION_GPS`, `arm_request`, `HTTPServer`) are
//! split into word tokens once and rendered into any case convention on
//! demand. Configured initialisms stay atomic and upper-case.

use crate::{GeneratorError, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Set of multi-letter tokens (e.g. "GPS", "ID") treated as atomic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Initialisms {
    entries: BTreeSet<String>,
}

impl Initialisms {
    /// Load initialisms from a file with one entry per line
    ///
    /// Empty lines and lines starting with `#` are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Configuration(format!(
                "Failed to read initialisms file {}: {}",
                path.display(),
                e
            ))
        })?;

        let initialisms = Self::parse(&content);
        debug!(
            path = %path.display(),
            count = initialisms.len(),
            "loaded initialisms"
        );
        Ok(initialisms)
    }

    /// Parse the line-based initialism list format
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    /// Case-insensitive membership test
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains(&word.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Initialisms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Kind of a normalized token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Ordinary word, stored lower-case
    Word,
    /// Configured initialism, stored upper-case
    Initialism,
    /// Single non-alphanumeric character kept verbatim (e.g. `.`)
    Symbol,
}

/// One token of an [`Identifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    kind: TokenKind,
}

impl Token {
    fn word(text: &str) -> Self {
        Self {
            text: text.to_lowercase(),
            kind: TokenKind::Word,
        }
    }

    fn initialism(text: &str) -> Self {
        Self {
            text: text.to_uppercase(),
            kind: TokenKind::Initialism,
        }
    }

    fn symbol(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            kind: TokenKind::Symbol,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Token as it appears in camel case after the first position
    fn capitalized(&self) -> String {
        match self.kind {
            TokenKind::Word => {
                let mut chars = self.text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            TokenKind::Initialism | TokenKind::Symbol => self.text.clone(),
        }
    }
}

/// Normalized name, renderable in any case convention
///
/// # Examples
/// ```
/// use protoc_gen_mavsdk_common::{Identifier, Initialisms};
///
/// let initialisms: Initialisms = ["GPS"].into_iter().collect();
/// let id = Identifier::parse("ORIENTATION_GPS", &initialisms);
/// assert_eq!(id.upper_camel_case(), "OrientationGPS");
/// assert_eq!(id.lower_camel_case(), "orientationGPS");
/// assert_eq!(id.lower_snake_case(), "orientation_gps");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    raw: String,
    tokens: Vec<Token>,
}

impl Identifier {
    /// Split a raw identifier into tokens
    ///
    /// Underscores, hyphens and whitespace separate words and are dropped.
    /// Any other non-alphanumeric character becomes its own symbol token.
    pub fn parse(raw: &str, initialisms: &Initialisms) -> Self {
        let mut tokens = Vec::new();
        let mut run = String::new();

        for ch in raw.chars() {
            if ch.is_alphanumeric() {
                run.push(ch);
                continue;
            }

            push_run(&run, initialisms, &mut tokens);
            run.clear();

            if !is_separator(ch) {
                tokens.push(Token::symbol(ch));
            }
        }
        push_run(&run, initialisms, &mut tokens);

        Self {
            raw: raw.to_string(),
            tokens,
        }
    }

    /// The string this identifier was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn upper_camel_case(&self) -> String {
        self.tokens.iter().map(Token::capitalized).collect()
    }

    pub fn lower_camel_case(&self) -> String {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if i == 0 {
                    token.text.to_lowercase()
                } else {
                    token.capitalized()
                }
            })
            .collect()
    }

    pub fn lower_snake_case(&self) -> String {
        self.snake_case(str::to_lowercase)
    }

    pub fn upper_snake_case(&self) -> String {
        self.snake_case(str::to_uppercase)
    }

    fn snake_case(&self, convert: fn(&str) -> String) -> String {
        let mut out = String::new();
        let mut previous_was_symbol = true;

        for token in &self.tokens {
            let is_symbol = token.kind == TokenKind::Symbol;
            if !previous_was_symbol && !is_symbol {
                out.push('_');
            }
            out.push_str(&convert(&token.text));
            previous_was_symbol = is_symbol;
        }

        out
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Identifier", 5)?;
        state.serialize_field("raw", &self.raw)?;
        state.serialize_field("upper_camel_case", &self.upper_camel_case())?;
        state.serialize_field("lower_camel_case", &self.lower_camel_case())?;
        state.serialize_field("lower_snake_case", &self.lower_snake_case())?;
        state.serialize_field("upper_snake_case", &self.upper_snake_case())?;
        state.end()
    }
}

fn is_separator(ch: char) -> bool {
    ch == '_' || ch == '-' || ch.is_whitespace()
}

/// Tokenize one alphanumeric run
///
/// The run is first cut at case transitions, then the longest sequence of
/// consecutive pieces spelling an initialism is merged into one token. A
/// remaining piece made up entirely of initialisms (`RTKGPS`) is split into
/// them; a piece only partly covered (`gpsfix`) stays one word.
fn push_run(run: &str, initialisms: &Initialisms, tokens: &mut Vec<Token>) {
    if run.is_empty() {
        return;
    }

    let pieces = split_case_transitions(run);
    let mut start = 0;

    while start < pieces.len() {
        let matched = (start + 1..=pieces.len())
            .rev()
            .find(|&end| initialisms.contains(&pieces[start..end].concat()));

        match matched {
            Some(end) => {
                tokens.push(Token::initialism(&pieces[start..end].concat()));
                start = end;
            }
            None => {
                match split_initialisms(&pieces[start], initialisms) {
                    Some(parts) => tokens.extend(parts.into_iter().map(Token::initialism)),
                    None => tokens.push(Token::word(&pieces[start])),
                }
                start += 1;
            }
        }
    }
}

/// Cover `piece` with consecutive initialisms, preferring longer prefixes
fn split_initialisms<'a>(piece: &'a str, initialisms: &Initialisms) -> Option<Vec<&'a str>> {
    if piece.is_empty() {
        return Some(Vec::new());
    }

    let ends: Vec<usize> = piece
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(piece.len()))
        .collect();

    ends.into_iter()
        .rev()
        .filter(|&end| initialisms.contains(&piece[..end]))
        .find_map(|end| {
            let mut parts = split_initialisms(&piece[end..], initialisms)?;
            parts.insert(0, &piece[..end]);
            Some(parts)
        })
}

/// Cut before an uppercase letter following a lowercase letter or digit,
/// and before the last capital of an uppercase run followed by lowercase.
fn split_case_transitions(run: &str) -> Vec<String> {
    let chars: Vec<char> = run.chars().collect();
    let mut pieces = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && ch.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());

            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower)
            {
                pieces.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
