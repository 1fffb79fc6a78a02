//! Results page parsing.
//!
//! Turns the raw page into a validated [`DrawResult`]. Pure: no network and
//! no shared state, so one parser can serve the scheduler and interactive
//! requests at the same time.
//!
//! ```text
//! raw page → text lines → draw date → category groups → freshness check
//! ```

mod date;
mod text;

use chrono::NaiveDate;

use crate::app::ParseError;
use crate::domain::{CategorySpec, DrawEntry, DrawResult};

#[derive(Debug, Clone)]
pub struct ResultParser {
    categories: Vec<CategorySpec>,
}

impl Default for ResultParser {
    fn default() -> Self {
        Self::new(CategorySpec::lotto_wheels())
    }
}

/// Outcome of looking for one category on one line.
enum LineMatch {
    Absent,
    Valid(Vec<u8>),
    Invalid(String),
}

impl ResultParser {
    pub fn new(categories: Vec<CategorySpec>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[CategorySpec] {
        &self.categories
    }

    /// Parse `raw` into a result.
    ///
    /// With `expected_date` set, a well-formed page for another date is
    /// reported as [`ParseError::Stale`]. Structural problems are always
    /// [`ParseError::Malformed`], and no partial result is ever returned.
    pub fn parse(
        &self,
        raw: &str,
        expected_date: Option<NaiveDate>,
    ) -> Result<DrawResult, ParseError> {
        let lines = text::page_lines(raw);
        if lines.is_empty() {
            return Err(ParseError::Malformed("page has no text".into()));
        }

        let date_hit = date::find_draw_date(&lines)
            .ok_or_else(|| ParseError::Malformed("no draw date found".into()))?;

        let mut used_lines = vec![date_hit.line];
        let mut entries = Vec::with_capacity(self.categories.len());

        for spec in &self.categories {
            let (line, numbers) = Self::locate(spec, &lines)?;
            used_lines.push(line);
            entries.push(DrawEntry::new(spec.name.clone(), numbers));
        }

        if let Some(expected) = expected_date {
            if date_hit.date != expected {
                return Err(ParseError::Stale {
                    found: date_hit.date,
                    expected,
                });
            }
        }

        let draw_number = date::find_draw_number(&lines).map(|(line, number)| {
            used_lines.push(line);
            number
        });

        let first = used_lines.iter().copied().min().unwrap_or(date_hit.line);
        let last = used_lines.iter().copied().max().unwrap_or(date_hit.line);
        let excerpt = lines[first..=last].join("\n");

        DrawResult::new(date_hit.date, draw_number, entries, excerpt)
    }

    /// Find the first line carrying a valid number group for `spec`.
    fn locate(spec: &CategorySpec, lines: &[String]) -> Result<(usize, Vec<u8>), ParseError> {
        let name: Vec<&str> = tokens(&spec.name).collect();
        let mut rejection = None;

        for (index, line) in lines.iter().enumerate() {
            match Self::match_line(spec, &name, line) {
                LineMatch::Absent => {}
                LineMatch::Valid(numbers) => return Ok((index, numbers)),
                LineMatch::Invalid(reason) => {
                    rejection.get_or_insert(reason);
                }
            }
        }

        Err(ParseError::Malformed(rejection.unwrap_or_else(|| {
            format!("no numbers found for {}", spec.name)
        })))
    }

    fn match_line(spec: &CategorySpec, name: &[&str], line: &str) -> LineMatch {
        if name.is_empty() {
            return LineMatch::Absent;
        }

        let line_tokens: Vec<&str> = tokens(line).collect();
        let mut outcome = LineMatch::Absent;

        for start in 0..line_tokens.len().saturating_sub(name.len() - 1) {
            let window = &line_tokens[start..start + name.len()];
            if !window.iter().zip(name).all(|(a, b)| a.eq_ignore_ascii_case(b)) {
                continue;
            }

            let group: Vec<&str> = line_tokens[start + name.len()..]
                .iter()
                .copied()
                .take_while(|t| t.bytes().all(|b| b.is_ascii_digit()))
                .collect();

            // The name alone (headings, ads) is not a result line.
            if group.is_empty() {
                continue;
            }

            match validate_group(spec, &group) {
                Ok(numbers) => return LineMatch::Valid(numbers),
                Err(reason) => outcome = LineMatch::Invalid(reason),
            }
        }

        outcome
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

fn validate_group(spec: &CategorySpec, group: &[&str]) -> Result<Vec<u8>, String> {
    if group.len() != spec.count {
        return Err(format!(
            "{} has {} numbers, expected {}",
            spec.name,
            group.len(),
            spec.count
        ));
    }

    let width = spec.max.to_string().len();
    let mut numbers = Vec::with_capacity(group.len());

    for token in group {
        let value = token
            .parse::<u8>()
            .ok()
            .filter(|v| token.len() <= width && spec.accepts(*v))
            .ok_or_else(|| {
                format!(
                    "{} has out-of-range number {} (allowed {}..={})",
                    spec.name, token, spec.min, spec.max
                )
            })?;

        if numbers.contains(&value) {
            return Err(format!("{} repeats number {}", spec.name, value));
        }
        numbers.push(value);
    }

    Ok(numbers)
}
