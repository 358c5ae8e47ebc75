use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::tally::{io_common::*, *};

const REQUIRED_TITLES: [&str; 5] = ["ID", "Start time", "Completion time", "Email", "Name"];
const COMPLETION_COL: usize = 2;
const EMAIL_COL: usize = 3;
const NAME_COL: usize = 4;

/// Reads the Excel export of the responses of Microsoft Forms.
///
/// Row 1 holds the titles of the columns, the next rows the responses.
pub fn read_msforms(path: &str, worksheet_name: Option<String>) -> BTallyResult<ParsedForm> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("read_msforms: header: {:?}", header);
    let layout = check_msforms_titles(&header)?;

    let mut res: Vec<ParsedRecord> = Vec::new();
    for (idx, cells) in iter.enumerate() {
        let lineno = idx + 2;
        let row: Vec<String> = cells.iter().map(cell_to_string).collect();
        if row.iter().all(|s| s.trim().is_empty()) {
            debug!("read_msforms: skipping empty row {:?}", lineno);
            continue;
        }
        let completed_at = read_completion_time(cells.get(COMPLETION_COL)).context(
            ExcelTimestampSnafu {
                lineno,
                content: format!("{:?}", cells.get(COMPLETION_COL)),
            },
        )?;
        let rec = ParsedRecord {
            lineno,
            email: row.get(EMAIL_COL).cloned().unwrap_or_default(),
            name: layout.name(&row),
            completed_at,
            answers: layout.answers(&row),
        };
        debug!("read_msforms: lineno: {:?} record: {:?}", lineno, rec);
        res.push(rec);
    }
    Ok(ParsedForm {
        questions: layout.questions,
        records: res,
    })
}

/// Checks the header of a Microsoft Forms export and finds the questions.
///
/// Quizzes have a `Total points` column after the name, and every question is
/// followed by its points and feedback columns.
pub fn check_msforms_titles(header: &[String]) -> BTallyResult<FormLayout> {
    if header.len() < 7 {
        return Err(Box::new(TallyError::TooFewColumns {
            found: header.len(),
            expected: 7,
        }));
    }
    check_required_titles(header, &REQUIRED_TITLES)?;

    let (first_col, col_increment) = if header[5] == "Total points" {
        (7, 3)
    } else {
        (5, 1)
    };

    let mut questions: Vec<Question> = Vec::new();
    for idx in (first_col..header.len()).step_by(col_increment) {
        let title = header[idx].as_str();
        if col_increment > 1 {
            if idx + 2 >= header.len() {
                return Err(Box::new(TallyError::IncompleteTriplet {}));
            }
            check_sub_column(header, idx + 1, &format!("Points - {}", title))?;
            check_sub_column(header, idx + 2, &format!("Feedback - {}", title))?;
        }
        questions.push(build_question(idx + 1, title)?);
    }
    debug!(
        "check_msforms_titles: {:?} questions, quiz: {:?}",
        questions.len(),
        col_increment > 1
    );
    Ok(FormLayout {
        questions,
        first_col,
        col_increment,
        name_col: Some(NAME_COL),
    })
}

// The export sometimes names the extra columns 'Column1', 'Column2', ...
fn check_sub_column(header: &[String], idx: usize, expected: &str) -> BTallyResult<()> {
    let found = header[idx].as_str();
    if found != expected && !found.starts_with("Column") {
        return Err(Box::new(TallyError::MissingSubColumn {
            col: idx + 1,
            expected: expected.to_string(),
            found: found.to_string(),
        }));
    }
    Ok(())
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        // Numbers are written without a trailing '.0'
        x => x.to_string(),
    }
}

/// The completion time, stored as an Excel serial date or as text.
fn read_completion_time(cell: Option<&DataType>) -> Option<NaiveDateTime> {
    match cell {
        Some(DataType::Float(f)) => excel_serial_to_datetime(*f),
        Some(DataType::Int(i)) => excel_serial_to_datetime(*i as f64),
        Some(DataType::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) => excel_serial_to_datetime(f),
            Err(_) => parse_timestamp(s),
        },
        Some(DataType::Empty) | None => None,
        // Date cells
        Some(x) => x
            .to_string()
            .parse::<f64>()
            .ok()
            .and_then(excel_serial_to_datetime),
    }
}

fn get_range(path: &str, worksheet_name_o: Option<String>) -> BTallyResult<calamine::Range<DataType>> {
    debug!(
        "read_msforms: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(TallyError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_msforms: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(TallyError::TooManyWorksheets {
                names: all_worksheets.iter().map(|(n, _)| n.clone()).collect(),
                path: path.to_string(),
            })),
        }
    }
}
