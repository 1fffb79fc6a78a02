//! Draw date and draw number extraction from page text.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b").unwrap()
});

static TEXTUAL_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s+(gennaio|febbraio|marzo|aprile|maggio|giugno|luglio|agosto|settembre|ottobre|novembre|dicembre)\s+(\d{4})\b",
    )
    .unwrap()
});

static DRAW_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:estrazione|concorso)\s+(?:numero|nr\.?|n[°º.]?)?\s*(\d{1,4})\b").unwrap()
});

const MONTHS: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// A date and the index of the line it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateHit {
    pub date: NaiveDate,
    pub line: usize,
}

/// Locate the draw date.
///
/// Lines that mention the draw ("ESTRAZIONE", "CONCORSO") take precedence so
/// that a page header carrying today's date cannot hide an old result.
pub fn find_draw_date(lines: &[String]) -> Option<DateHit> {
    first_date(lines.iter().enumerate().filter(|(_, l)| mentions_draw(l)))
        .or_else(|| first_date(lines.iter().enumerate()))
}

fn first_date<'a>(mut candidates: impl Iterator<Item = (usize, &'a String)>) -> Option<DateHit> {
    candidates.find_map(|(line, text)| date_in(text).map(|date| DateHit { date, line }))
}

/// Draw number and the index of the line it was read from.
pub fn find_draw_number(lines: &[String]) -> Option<(usize, u32)> {
    lines.iter().enumerate().find_map(|(index, line)| {
        DRAW_NUMBER_REGEX
            .captures_iter(line)
            .find_map(|caps| {
                let number = caps.get(1)?;
                // "ESTRAZIONE 15/10/2026": the digits open a date.
                if opens_date(&line[number.end()..]) {
                    return None;
                }
                number.as_str().parse().ok()
            })
            .map(|number| (index, number))
    })
}

fn opens_date(rest: &str) -> bool {
    let mut chars = rest.chars();
    matches!(chars.next(), Some('/' | '.' | '-'))
        && chars.next().is_some_and(|c| c.is_ascii_digit())
}

fn mentions_draw(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.contains("ESTRAZION") || upper.contains("CONCORSO")
}

fn date_in(line: &str) -> Option<NaiveDate> {
    let numeric = NUMERIC_DATE_REGEX.captures_iter(line).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        NaiveDate::from_ymd_opt(year, month, day)
    });

    numeric.or_else(|| {
        TEXTUAL_DATE_REGEX.captures_iter(line).find_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month_name = caps[2].to_lowercase();
            let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
    })
}

fn expand_year(digits: &str) -> Option<i32> {
    let year: i32 = digits.parse().ok()?;
    Some(if digits.len() == 2 { 2000 + year } else { year })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_formats() {
        assert_eq!(date_in("del 14/10/2026"), Some(ymd(2026, 10, 14)));
        assert_eq!(date_in("del 4.1.2026"), Some(ymd(2026, 1, 4)));
        assert_eq!(date_in("del 14-10-26"), Some(ymd(2026, 10, 14)));
    }

    #[test]
    fn test_textual_italian_date() {
        assert_eq!(date_in("Estrazione di martedì 14 Ottobre 2026"), Some(ymd(2026, 10, 14)));
    }

    #[test]
    fn test_impossible_date_is_skipped() {
        assert_eq!(date_in("31/02/2026 oppure 01/03/2026"), Some(ymd(2026, 3, 1)));
        assert_eq!(date_in("nessuna data"), None);
    }

    #[test]
    fn test_draw_line_beats_header_date() {
        let page = lines("TELEVIDEO 16/10/2026 20:15\nLOTTO\nESTRAZIONE DEL 15/10/2026\nBARI 1 2 3 4 5");
        let hit = find_draw_date(&page).unwrap();
        assert_eq!(hit.date, ymd(2026, 10, 15));
        assert_eq!(hit.line, 2);
    }

    #[test]
    fn test_falls_back_to_first_date() {
        let page = lines("LOTTO\nRisultati del 15/10/2026\nBARI 1 2 3 4 5");
        assert_eq!(find_draw_date(&page).map(|h| h.line), Some(1));
    }

    #[test]
    fn test_draw_number_variants() {
        assert_eq!(
            find_draw_number(&lines("LOTTO\nESTRAZIONE N. 123 DEL 15/10/2026")),
            Some((1, 123))
        );
        assert_eq!(find_draw_number(&lines("Concorso n° 45")), Some((0, 45)));
        assert_eq!(find_draw_number(&lines("Estrazione del 15/10/2026")), None);
        assert_eq!(find_draw_number(&lines("Concorso 87.")), Some((0, 87)));
    }

    #[test]
    fn test_date_after_draw_word_is_not_a_number() {
        assert_eq!(find_draw_number(&lines("ESTRAZIONE 15/10/2026")), None);
        assert_eq!(find_draw_number(&lines("Estrazione 15.10.26")), None);
        assert_eq!(
            find_draw_number(&lines("ESTRAZIONE 15/10/2026\nCONCORSO N. 124")),
            Some((1, 124))
        );
    }
}
