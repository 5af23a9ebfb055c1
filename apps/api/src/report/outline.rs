//! Outline Parser — turns `Title:WordLimit` lines into an ordered outline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("Invalid section format: '{0}'. Please follow the format 'Title:WordLimit'")]
    MalformedSection(String),

    #[error("Section title is empty in line '{0}'")]
    EmptyTitle(String),

    #[error("Invalid word limit '{1}' for section '{0}'. Word limit should be a positive integer")]
    InvalidWordLimit(String, String),
}

/// A single section of the requested report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub title: String,
    pub word_limit: u64,
}

/// Ordered mapping from section title to target word count.
///
/// Titles are unique. Inserting a title that already exists replaces its word
/// limit but keeps the position of the first occurrence, the same way an
/// insertion-ordered map behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: String, word_limit: u64) {
        match self.entries.iter_mut().find(|e| e.title == title) {
            Some(existing) => existing.word_limit = word_limit,
            None => self.entries.push(OutlineEntry { title, word_limit }),
        }
    }

    #[cfg(test)]
    pub fn get(&self, title: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.word_limit)
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all section word limits.
    pub fn total_words(&self) -> u64 {
        self.entries
            .iter()
            .fold(0, |total: u64, e| total.saturating_add(e.word_limit))
    }
}

/// Parses a multi-line outline.
///
/// Rules:
/// - each line is trimmed; blank lines are skipped
/// - a line needs exactly one `:` separating title from word limit
/// - the title must be non-empty after trimming
/// - the word limit must be a positive base-10 integer
///
/// Stops at the first offending line.
pub fn parse_outline(input: &str) -> Result<Outline, OutlineError> {
    let mut outline = Outline::new();

    for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (title, word_limit_text) = match line.split_once(':') {
            Some((title, rest)) if !rest.contains(':') => (title.trim(), rest.trim()),
            _ => return Err(OutlineError::MalformedSection(line.to_string())),
        };

        if title.is_empty() {
            return Err(OutlineError::EmptyTitle(line.to_string()));
        }

        let word_limit = word_limit_text
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                OutlineError::InvalidWordLimit(title.to_string(), word_limit_text.to_string())
            })?;

        outline.insert(title.to_string(), word_limit);
    }

    Ok(outline)
}
