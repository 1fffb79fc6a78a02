use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app::ParseError;

/// Numbers drawn for one category, in the order they appear on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawEntry {
    pub category: String,
    pub numbers: Vec<u8>,
}

impl DrawEntry {
    pub fn new(category: impl Into<String>, numbers: Vec<u8>) -> Self {
        Self {
            category: category.into(),
            numbers,
        }
    }
}

/// A validated result for one draw. Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    draw_date: NaiveDate,
    draw_number: Option<u32>,
    entries: Vec<DrawEntry>,
    fetched_at: DateTime<Utc>,
    raw_excerpt: String,
}

impl DrawResult {
    /// Build a result, rejecting an empty entry list or an entry without numbers.
    ///
    /// Per-category length and range checks belong to the parser, which knows
    /// the category shapes.
    pub fn new(
        draw_date: NaiveDate,
        draw_number: Option<u32>,
        entries: Vec<DrawEntry>,
        raw_excerpt: String,
    ) -> Result<Self, ParseError> {
        if entries.is_empty() {
            return Err(ParseError::Malformed("no category entries".into()));
        }
        if let Some(empty) = entries.iter().find(|e| e.numbers.is_empty()) {
            return Err(ParseError::Malformed(format!(
                "category {} has no numbers",
                empty.category
            )));
        }

        Ok(Self {
            draw_date,
            draw_number,
            entries,
            fetched_at: Utc::now(),
            raw_excerpt,
        })
    }

    pub fn draw_date(&self) -> NaiveDate {
        self.draw_date
    }

    pub fn draw_number(&self) -> Option<u32> {
        self.draw_number
    }

    pub fn entries(&self) -> &[DrawEntry] {
        &self.entries
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn raw_excerpt(&self) -> &str {
        &self.raw_excerpt
    }

    /// Hex SHA-256 of the source excerpt, for telling page revisions apart in logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.raw_excerpt.as_bytes());
        hex::encode(hasher.finalize())
    }
}
