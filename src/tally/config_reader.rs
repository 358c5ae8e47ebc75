use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;
use std::path::Path;

/// The formats of the form exports.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    /// Google Forms, CSV export.
    Csv,
    /// Microsoft Forms, Excel export.
    MsForms,
}

impl InputType {
    /// Reads the input type, or guesses it from the extension of the input file.
    pub fn from_option(input_type: &Option<String>, input_path: &str) -> TallyResult<InputType> {
        let extension = Path::new(input_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match (input_type.as_deref(), extension.as_deref()) {
            (Some("csv"), _) => Ok(InputType::Csv),
            (Some("msforms"), _) => Ok(InputType::MsForms),
            (Some(x), _) => whatever!("unknown input type {:?}, expected csv or msforms", x),
            (None, Some("csv")) => Ok(InputType::Csv),
            (None, Some("xlsx")) => Ok(InputType::MsForms),
            (None, _) => whatever!(
                "cannot guess the type of the input {:?}, please use --input-type",
                input_path
            ),
        }
    }
}

/// Everything needed to run a tally, after validation of the command line.
#[derive(PartialEq, Debug, Clone)]
pub struct TallySettings {
    pub input_path: String,
    pub input_type: InputType,
    pub excel_worksheet_name: Option<String>,
    pub teams_path: Option<String>,
    pub individual: bool,
    pub fill_mode: FillMode,
    pub out: Option<String>,
    pub reference: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterMember {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// The roster file: the members of each team, keyed by team name.
pub type RosterFile = BTreeMap<String, Vec<RosterMember>>;

/// Reads the teams from a JSON file.
///
/// The teams are sorted by name and the emails are lower-cased.
pub fn read_roster(path: &str) -> BTallyResult<Roster> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let rf: RosterFile = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let teams: Vec<Team> = rf
        .into_iter()
        .map(|(name, members)| Team {
            name,
            members: members
                .into_iter()
                .map(|m| Member {
                    email: m.email.trim().to_lowercase(),
                    name: m.name,
                })
                .collect(),
        })
        .collect();
    debug!("read_roster: {:?}", teams);
    Ok(Roster::new(teams))
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
