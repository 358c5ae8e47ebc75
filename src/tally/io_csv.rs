// Primitives for reading the CSV exports of Google Forms.

use std::fs::File;

use crate::tally::{io_common::*, *};

const REQUIRED_TITLES: [&str; 2] = ["Timestamp", "Email Address"];

pub fn read_csv(path: &str) -> BTallyResult<ParsedForm> {
    let mut records = get_records(path)?;

    let header: Vec<String> = records
        .next()
        .context(EmptyCsvSnafu { path })?
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv: header: {:?}", header);
    let layout = check_csv_titles(&header)?;

    let mut res: Vec<ParsedRecord> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if row.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv: skipping empty line {:?}", lineno);
            continue;
        }
        if row.len() < REQUIRED_TITLES.len() {
            return Err(Box::new(TallyError::CsvLineTooShort { lineno }));
        }
        let completed_at = parse_timestamp(&row[0]).context(CsvTimestampSnafu {
            lineno,
            content: row[0].clone(),
        })?;
        let rec = ParsedRecord {
            lineno,
            email: row[1].clone(),
            name: layout.name(&row),
            completed_at,
            answers: layout.answers(&row),
        };
        debug!("read_csv: lineno: {:?} record: {:?}", lineno, rec);
        res.push(rec);
    }
    Ok(ParsedForm {
        questions: layout.questions,
        records: res,
    })
}

/// Checks the header of a Google Forms export and finds the questions.
///
/// The export starts with the timestamp and the email. An optional name
/// question may follow if its title starts with `Your Name`.
pub fn check_csv_titles(header: &[String]) -> BTallyResult<FormLayout> {
    let titles: Vec<String> = header
        .iter()
        .map(|s| s.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if titles.len() < 3 {
        return Err(Box::new(TallyError::TooFewColumns {
            found: titles.len(),
            expected: 3,
        }));
    }
    check_required_titles(&titles, &REQUIRED_TITLES)?;

    let (first_col, name_col) = if titles[2].starts_with("Your Name") {
        (3, Some(2))
    } else {
        (2, None)
    };

    let mut questions: Vec<Question> = Vec::new();
    for (idx, title) in titles.iter().enumerate().skip(first_col) {
        questions.push(build_question(idx + 1, trim_number_prefix(title))?);
    }
    debug!(
        "check_csv_titles: {:?} questions, name column: {:?}",
        questions.len(),
        name_col
    );
    Ok(FormLayout {
        questions,
        first_col,
        col_increment: 1,
        name_col,
    })
}

fn get_records(path: &str) -> TallyResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}
