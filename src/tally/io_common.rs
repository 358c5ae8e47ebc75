// Conventions shared by the readers of form exports.

use crate::tally::*;

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// The glyph that starts the title of a bonus question.
pub const BONUS_MARKER: char = '🎯';

static BONUS_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s*\[(.*?)\]\s*$").unwrap());
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\s*").unwrap());

/// Where the questions are in a row of the export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FormLayout {
    pub questions: Vec<Question>,
    /// Index of the column of the first question.
    pub first_col: usize,
    /// 3 for quizzes (answer, points, feedback), 1 otherwise.
    pub col_increment: usize,
    pub name_col: Option<usize>,
}

impl FormLayout {
    /// The answers of a row, in the order of the questions.
    ///
    /// The list stops at the last cell of the row, which may leave out the
    /// trailing unanswered questions.
    pub fn answers(&self, row: &[String]) -> Vec<String> {
        (0..self.questions.len())
            .map(|idx| idx * self.col_increment + self.first_col)
            .map_while(|col| row.get(col).cloned())
            .collect()
    }

    /// The name of the participant, empty if the form does not ask for it.
    pub fn name(&self, row: &[String]) -> String {
        self.name_col
            .and_then(|col| row.get(col).cloned())
            .unwrap_or_default()
    }
}

/// Checks that the first titles of the header are the expected ones.
pub fn check_required_titles(header: &[String], required: &[&str]) -> BTallyResult<()> {
    for (idx, expected) in required.iter().enumerate() {
        let title = header.get(idx).map(|s| s.as_str()).unwrap_or("");
        if title != *expected {
            return Err(Box::new(TallyError::MissingTitleColumn {
                col: idx + 1,
                expected: expected.to_string(),
            }));
        }
    }
    Ok(())
}

/// Builds a question out of the title of a column.
///
/// A title starting with the bonus marker must end with the bonus answer in
/// brackets: `🎯 Largest planet? [Jupiter]`. The text before the brackets may be
/// empty.
///
/// col: the column number, starting at 1, used in error messages.
pub fn build_question(col: usize, title: &str) -> BTallyResult<Question> {
    if title.trim().is_empty() {
        return Err(Box::new(TallyError::UntitledColumn { col }));
    }
    let rest = match title.strip_prefix(BONUS_MARKER) {
        Some(rest) => rest,
        None => return Ok(Question::new(title)),
    };
    match BONUS_TITLE.captures(rest.trim()) {
        Some(caps) => {
            let text = caps.get(1).map(|m| m.as_str()).unwrap_or("").trim();
            let answer = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
            if answer.is_empty() {
                return Err(Box::new(TallyError::MalformedBonusTitle {
                    col,
                    title: title.to_string(),
                }));
            }
            debug!(
                "build_question: column {:?}: bonus question {:?} with answer {:?}",
                col, text, answer
            );
            Ok(Question::bonus(text, answer))
        }
        None => Err(Box::new(TallyError::MalformedBonusTitle {
            col,
            title: title.to_string(),
        })),
    }
}

/// Removes a numbering prefix such as `12. ` from a title.
pub fn trim_number_prefix(s: &str) -> &str {
    match NUMBER_PREFIX.find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    }
}

/// Parses the timestamps written by Google Forms and Google Sheets.
///
/// A trailing time zone such as `GMT-5` is ignored.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let s = match s.find(" GMT") {
        Some(idx) => &s[..idx],
        None => s,
    };
    [
        "%m/%d/%Y %H:%M:%S",
        "%Y/%m/%d %I:%M:%S %p",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Converts an Excel serial date (days since 1899-12-30) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let ms = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(ms))
}
