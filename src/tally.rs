use log::{debug, info, warn};

use crowd_scoring::builder::Builder;
use crowd_scoring::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use chrono::NaiveDateTime;
use text_diff::print_diff;

use crate::tally::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_msforms;
pub mod report;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find the worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display(
        "The workbook {path} has several worksheets ({names:?}), the worksheet name must be provided"
    ))]
    TooManyWorksheets { names: Vec<String>, path: String },
    #[snafu(display("Line {lineno}: invalid completion time {content}"))]
    ExcelTimestamp { lineno: usize, content: String },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("The CSV file {path} has no data"))]
    EmptyCsv { path: String },
    #[snafu(display("Line {lineno}: cannot parse the line"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno}: the line is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: invalid timestamp {content}"))]
    CsvTimestamp { lineno: usize, content: String },

    #[snafu(display("The input has {found} columns, at least {expected} are expected"))]
    TooFewColumns { found: usize, expected: usize },
    #[snafu(display("Column #{col} is not {expected}"))]
    MissingTitleColumn { col: usize, expected: String },
    #[snafu(display("Column #{col} has no title"))]
    UntitledColumn { col: usize },
    #[snafu(display(
        "Column #{col} is a bonus question but is missing the ending answer <{title} [answer]>"
    ))]
    MalformedBonusTitle { col: usize, title: String },
    #[snafu(display("Column #{col} was supposed to be '{expected}' but is '{found}'"))]
    MissingSubColumn {
        col: usize,
        expected: String,
        found: String,
    },
    #[snafu(display("Too few columns, expected answer, points, feedback triplets"))]
    IncompleteTriplet {},

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Line {lineno}: {source}"))]
    InvalidRecord {
        source: ScoringErrors,
        lineno: usize,
    },
    #[snafu(display("Scoring failed: {source}"))]
    Scoring { source: ScoringErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;
pub type BTallyResult<T> = Result<T, Box<TallyError>>;

/// A response, as parsed by the readers.
/// This is before normalization.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRecord {
    /// The line in the source file, starting at 1 with the header.
    pub lineno: usize,
    pub email: String,
    pub name: String,
    pub completed_at: NaiveDateTime,
    pub answers: Vec<String>,
}

/// The content of a form export: the questions from the header and the records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedForm {
    pub questions: Vec<Question>,
    pub records: Vec<ParsedRecord>,
}

fn read_form(settings: &TallySettings) -> BTallyResult<ParsedForm> {
    info!(
        "Attempting to read {:?} file {:?}",
        settings.input_type, settings.input_path
    );
    match settings.input_type {
        InputType::Csv => io_csv::read_csv(&settings.input_path),
        InputType::MsForms => io_msforms::read_msforms(
            &settings.input_path,
            settings.excel_worksheet_name.clone(),
        ),
    }
}

fn score_form(
    form: &ParsedForm,
    roster: Option<&Roster>,
    fill_mode: FillMode,
) -> BTallyResult<ScoringResult> {
    let mut builder = Builder::new(&form.questions);
    if let Some(r) = roster {
        builder = builder.roster(r);
    }
    for rec in form.records.iter() {
        debug!("score_form: record: {:?}", rec);
        builder
            .add_response(&rec.email, &rec.name, rec.completed_at, &rec.answers)
            .context(InvalidRecordSnafu {
                lineno: rec.lineno,
            })?;
    }
    let res = builder.run(fill_mode).context(ScoringSnafu {})?;
    Ok(res)
}

fn write_summary(out: &str, pretty_js: &str) -> BTallyResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing results to {:?}", out);
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> TallyResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated results and reference results")
    }
    Ok(())
}

/// Reads the roster and prints how many teams and members it has.
pub fn load_roster(path: &str) -> BTallyResult<Roster> {
    let roster = read_roster(path)?;
    println!("{}", report::roster_summary(&roster, path));
    Ok(roster)
}

pub fn run_tally(settings: &TallySettings) -> BTallyResult<()> {
    let roster: Option<Roster> = match &settings.teams_path {
        Some(p) => Some(load_roster(p)?),
        None => {
            println!("Teams mode is disabled");
            None
        }
    };

    let form = read_form(settings)?;
    println!("Read {} responses", form.records.len());

    let result = score_form(&form, roster.as_ref(), settings.fill_mode)?;

    report::print_report(&result, settings.individual);

    // Assemble the final json
    let result_js = report::build_summary_js(&result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = &settings.out {
        write_summary(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &settings.reference {
        check_reference(reference_path, &pretty_js_stats)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(test_name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), test_name)
    }

    fn test_settings(
        test_name: &str,
        input_lpath: &str,
        teams_lpath: Option<&str>,
        summary_lpath: &str,
    ) -> TallySettings {
        let dir = test_dir(test_name);
        let input_path = format!("{}/{}", dir, input_lpath);
        TallySettings {
            input_type: InputType::from_option(&None, &input_path).unwrap(),
            input_path,
            excel_worksheet_name: None,
            teams_path: teams_lpath.map(|p| format!("{}/{}", dir, p)),
            individual: true,
            fill_mode: FillMode::Average,
            out: None,
            reference: Some(format!("{}/{}", dir, summary_lpath)),
        }
    }

    fn run_tally_test(
        test_name: &str,
        teams_lpath: Option<&str>,
        summary_lpath: &str,
    ) -> BTallyResult<()> {
        let _ = env_logger::try_init();
        run_tally(&test_settings(
            test_name,
            "responses.csv",
            teams_lpath,
            summary_lpath,
        ))
    }

    fn run_msforms_test(input_lpath: &str, worksheet: Option<&str>) -> BTallyResult<()> {
        let _ = env_logger::try_init();
        let settings = TallySettings {
            excel_worksheet_name: worksheet.map(|w| w.to_string()),
            ..test_settings(
                "basic_msforms",
                input_lpath,
                Some("teams.json"),
                "expected_summary.json",
            )
        };
        assert_eq!(settings.input_type, InputType::MsForms);
        run_tally(&settings)
    }

    fn read_test_form(test_name: &str) -> ParsedForm {
        io_csv::read_csv(&format!("{}/responses.csv", test_dir(test_name))).unwrap()
    }

    #[test]
    fn basic_csv_teams() {
        let res = run_tally_test("basic_csv", Some("teams.json"), "expected_summary.json");
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn basic_csv_individual() {
        let res = run_tally_test("basic_csv", None, "expected_summary_individual.json");
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn basic_csv_wrong_reference() {
        let res = run_tally_test("basic_csv", None, "expected_summary.json");
        assert!(matches!(res.map_err(|e| *e), Err(TallyError::Whatever { .. })));
    }

    #[test]
    fn basic_csv_unknown_participant() {
        let res = run_tally_test("basic_csv", Some("teams_partial.json"), "expected_summary.json");
        match res.map_err(|e| *e) {
            Err(TallyError::InvalidRecord { source, lineno }) => {
                assert_eq!(
                    source,
                    ScoringErrors::UnknownParticipant("eve@example.com".to_string())
                );
                assert_eq!(lineno, 7);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn basic_csv_fill_modes() {
        let form = read_test_form("basic_csv");
        let roster = read_roster(&format!("{}/teams.json", test_dir("basic_csv"))).unwrap();
        for mode in [FillMode::Average, FillMode::Least, FillMode::Middle] {
            let res = score_form(&form, Some(&roster), mode).unwrap();
            let teams = res.teams.unwrap();
            let larks = teams.iter().find(|t| t.team_name == "Larks").unwrap();
            // A single respondent: every mode uses that score.
            assert_eq!(larks.fill_in_score, 6);
            assert_eq!(larks.final_score, 24);
        }
    }

    #[test]
    fn basic_msforms_teams() {
        let res = run_msforms_test("responses.xlsx", None);
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn basic_msforms_named_worksheet() {
        let res = run_msforms_test("two_sheets.xlsx", Some("Form1"));
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn basic_msforms_too_many_worksheets() {
        let res = run_msforms_test("two_sheets.xlsx", None);
        assert!(matches!(
            res.map_err(|e| *e),
            Err(TallyError::TooManyWorksheets { .. })
        ));
    }

    #[test]
    fn load_roster_counts() {
        let roster = load_roster(&format!("{}/teams.json", test_dir("basic_msforms"))).unwrap();
        assert_eq!(roster.teams.len(), 2);
        assert_eq!(roster.total_members(), 4);
    }
}
