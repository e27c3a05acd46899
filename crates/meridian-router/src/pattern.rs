//! Path template compilation.
//!
//! A template such as `/orders/{orderId}/items` compiles to the anchored
//! pattern `^/orders/(?P<orderId>[^/]+)/items$` plus the ordered capture
//! names `["orderId"]`. Templates are normalized first, so `//orders//x/`
//! and `/orders/x` compile identically.

use std::fmt;

use meridian_core::normalize_path;
use regex::Regex;

use crate::error::PatternError;
use crate::params::Params;

/// Capture body for a placeholder: one or more non-slash characters.
const CAPTURE_BODY: &str = "[^/]+";

/// A compiled path template.
#[derive(Clone)]
pub struct PathPattern {
    mask: String,
    regex: Regex,
    captures: Vec<String>,
}

impl PathPattern {
    /// Compiles a path template.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::DuplicateCapture`] when a placeholder name
    /// appears twice, or [`PatternError::InvalidRegex`] if the resulting
    /// pattern is rejected by the regex engine.
    ///
    /// # Example
    ///
    /// ```
    /// use meridian_router::PathPattern;
    ///
    /// let pattern = PathPattern::compile("orders//{orderId}/items/").unwrap();
    /// assert_eq!(pattern.mask(), "/orders/{orderId}/items");
    /// assert_eq!(pattern.captures(), ["orderId"]);
    /// assert_eq!(pattern.as_str(), "^/orders/(?P<orderId>[^/]+)/items$");
    /// ```
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let mask = normalize_path(template);
        let (source, captures) = translate(&mask)?;
        let regex = Regex::new(&source).map_err(|source| PatternError::InvalidRegex {
            template: mask.clone(),
            source,
        })?;

        Ok(Self {
            mask,
            regex,
            captures,
        })
    }

    /// Rebuilds a pattern from a previously compiled regex source.
    ///
    /// Used when loading flat schema records: the source is trusted and the
    /// capture names are read back from the regex itself.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidRegex`] if the source does not compile.
    pub fn from_source(mask: &str, source: &str) -> Result<Self, PatternError> {
        let mask = normalize_path(mask);
        let regex = Regex::new(source).map_err(|source| PatternError::InvalidRegex {
            template: mask.clone(),
            source,
        })?;
        let captures = regex
            .capture_names()
            .flatten()
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            mask,
            regex,
            captures,
        })
    }

    /// Returns the normalized mask this pattern was compiled from.
    #[must_use]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Returns the regex source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the capture names in template order.
    #[must_use]
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    /// Returns true if the mask contains no placeholders.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.captures.is_empty()
    }

    /// Returns true if a normalized path matches this pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Matches a normalized path and extracts the captured values in order.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::with_capacity(self.captures.len());
        for name in &self.captures {
            if let Some(value) = caps.name(name) {
                params.push(name.as_str(), value.as_str());
            }
        }
        Some(params)
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPattern")
            .field("mask", &self.mask)
            .field("pattern", &self.regex.as_str())
            .field("captures", &self.captures)
            .finish()
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.mask == other.mask && self.regex.as_str() == other.regex.as_str()
    }
}

impl Eq for PathPattern {}

/// Lists the placeholder names of a template in order, duplicates included.
///
/// Only `{identifier}` placeholders count; braces around anything else are
/// literal text.
#[must_use]
pub fn placeholder_names(template: &str) -> Vec<String> {
    tokenize(template)
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder(name) => Some(name.to_string()),
            Token::Literal(_) => None,
        })
        .collect()
}

/// Returns true if a mask segment holds an `{identifier}` placeholder.
///
/// Uses the same tokenizer as [`PathPattern::compile`], so a segment is
/// variable here exactly when its compiled pattern captures.
#[must_use]
pub fn is_variable_segment(segment: &str) -> bool {
    tokenize(segment)
        .iter()
        .any(|token| matches!(token, Token::Placeholder(_)))
}

enum Token<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                if open > 0 {
                    tokens.push(Token::Literal(&rest[..open]));
                }
                tokens.push(Token::Placeholder(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                tokens.push(Token::Literal(&rest[..=open]));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }
    tokens
}

fn translate(mask: &str) -> Result<(String, Vec<String>), PatternError> {
    let mut source = String::with_capacity(mask.len() + 16);
    let mut captures: Vec<String> = Vec::new();
    source.push('^');

    for token in tokenize(mask) {
        match token {
            Token::Literal(text) => source.push_str(&regex::escape(text)),
            Token::Placeholder(name) => {
                if captures.iter().any(|existing| existing == name) {
                    return Err(PatternError::DuplicateCapture {
                        template: mask.to_string(),
                        name: name.to_string(),
                    });
                }
                source.push_str("(?P<");
                source.push_str(name);
                source.push('>');
                source.push_str(CAPTURE_BODY);
                source.push(')');
                captures.push(name.to_string());
            }
        }
    }

    source.push('$');
    Ok((source, captures))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
