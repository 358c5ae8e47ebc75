use clap::Parser;

/// Scores quizzes by crowd popularity: every answer is worth the number of
/// participants who gave the same answer.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The export of the responses of the form.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or msforms) The type of the input. If not specified, it is deduced
    /// from the extension of the input file (.csv or .xlsx).
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. It may be
    /// omitted when the workbook has a single worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, optional) A JSON file describing the teams. Leave it out to only
    /// compute individual scores.
    #[clap(short, long, value_parser)]
    pub teams: Option<String>,

    /// If passed as an argument, the score of every answer of every participant is printed.
    #[clap(long, takes_value = false)]
    pub individual: bool,

    /// (avg, least or middle) How to score the missing members of incomplete teams.
    #[clap(long, value_parser, default_value = "avg")]
    pub missing: String,

    /// If passed as an argument, prints the teams and exits.
    #[clap(long, takes_value = false)]
    pub print_teams: bool,

    /// (file path, 'stdout' or empty) If specified, the results will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the results in JSON format. If provided,
    /// crowdtally will check that the computed results match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
