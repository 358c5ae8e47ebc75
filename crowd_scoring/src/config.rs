// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;

/// One participant's submission.
///
/// In most cases, it is easier to create responses through the builder API,
/// which takes care of the normalization.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Response {
    /// The identity of the participant, lower-cased.
    pub email: String,
    pub name: String,
    /// Empty when no roster is provided.
    pub team: String,
    pub completed_at: NaiveDateTime,
    /// Aligned with the list of questions.
    pub answers: Vec<String>,
    /// Aligned with the list of answers.
    pub score_per_answer: Vec<u32>,
    pub total_score: u32,
}

/// How many times an answer was given to a question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PopulationCount {
    pub freq: u32,
    /// The answer as it was first written, before lower-casing.
    pub original_answer: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub text: String,
    /// The designated answer of a bonus question.
    pub bonus_answer: Option<String>,
    /// Only meaningful for bonus questions, filled by the scoring.
    pub bonus_value: u32,
    /// Keyed by the lower-cased answer. Empty answers are never counted.
    pub population_counts: HashMap<String, PopulationCount>,
}

impl Question {
    pub fn new(text: &str) -> Question {
        Question {
            text: text.to_string(),
            bonus_answer: None,
            bonus_value: 0,
            population_counts: HashMap::new(),
        }
    }

    pub fn bonus(text: &str, bonus_answer: &str) -> Question {
        Question {
            bonus_answer: Some(bonus_answer.to_string()),
            ..Question::new(text)
        }
    }

    pub fn is_bonus(&self) -> bool {
        self.bonus_answer.is_some()
    }

    /// True if the answer is the designated answer of this bonus question.
    pub fn is_bonus_answer(&self, answer: &str) -> bool {
        match &self.bonus_answer {
            Some(b) => b.to_lowercase() == answer.to_lowercase(),
            None => false,
        }
    }

    /// The frequency of the most popular answer, 0 if nobody answered.
    pub fn most_frequent(&self) -> u32 {
        self.population_counts
            .values()
            .map(|pc| pc.freq)
            .max()
            .unwrap_or(0)
    }

    /// The answers with their points, from the most to the least popular.
    ///
    /// The bonus answer is reported with the bonus value. Ties are ordered by the
    /// answer text so that the ranking is stable between runs.
    pub fn ranked_answers(&self) -> Vec<(String, u32)> {
        let mut res: Vec<(String, u32)> = self
            .population_counts
            .values()
            .map(|pc| {
                let points = if self.is_bonus_answer(&pc.original_answer) {
                    self.bonus_value
                } else {
                    pc.freq
                };
                (pc.original_answer.clone(), points)
            })
            .collect();
        res.sort_by(|(a1, p1), (a2, p2)| p2.cmp(p1).then_with(|| a1.cmp(a2)));
        res
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Member {
    /// Lower-cased by the roster loader.
    pub email: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Team {
    pub name: String,
    pub members: Vec<Member>,
}

/// The number of members of a complete team.
pub const DEFAULT_TEAM_SIZE: usize = 4;

/// All the teams of a session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Roster {
    pub teams: Vec<Team>,
    pub team_size: usize,
}

impl Roster {
    pub fn new(teams: Vec<Team>) -> Roster {
        Roster {
            teams,
            team_size: DEFAULT_TEAM_SIZE,
        }
    }

    pub fn with_team_size(self, team_size: usize) -> Roster {
        Roster { team_size, ..self }
    }

    /// The name of the team of this participant, if any.
    pub fn find_team(&self, email: &str) -> Option<&str> {
        let email = email.to_lowercase();
        self.teams
            .iter()
            .find(|t| t.members.iter().any(|m| m.email.to_lowercase() == email))
            .map(|t| t.name.as_str())
    }

    pub fn total_members(&self) -> usize {
        self.teams.iter().map(|t| t.members.len()).sum()
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MemberScore {
    pub name: String,
    /// None for the placeholders of the missing members.
    pub email: Option<String>,
    pub score: u32,
}

/// The display name used for the placeholders of missing members.
pub const PLACEHOLDER_NAME: &str = "--------";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TeamScoreEntry {
    pub team_name: String,
    /// The observed members by decreasing score, then the placeholders.
    pub members: Vec<MemberScore>,
    pub observed_member_count: usize,
    pub fill_in_score: u32,
    pub final_score: u32,
}

/// A roster member who did not submit any response.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MissingMember {
    pub team: String,
    pub email: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoringResult {
    /// One scored response per participant.
    pub responses: Vec<Response>,
    pub questions: Vec<Question>,
    /// Only present in team mode, in roster order.
    pub teams: Option<Vec<TeamScoreEntry>>,
    pub missing_members: Vec<MissingMember>,
}

/// Errors that prevent the scoring from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    /// A response could not be matched to any team of the roster.
    UnknownParticipant(String),
    /// A response was submitted without an email.
    MissingIdentity,
    TooManyAnswers {
        email: String,
        expected: usize,
        found: usize,
    },
    UnknownFillMode(String),
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::UnknownParticipant(email) => {
                write!(f, "cannot find '{}' on any team", email)
            }
            ScoringErrors::MissingIdentity => write!(f, "response without an email"),
            ScoringErrors::TooManyAnswers {
                email,
                expected,
                found,
            } => write!(
                f,
                "response from '{}' has {} answers but there are only {} questions",
                email, found, expected
            ),
            ScoringErrors::UnknownFillMode(s) => {
                write!(f, "missing member mode must be 'avg', 'least', or 'middle', not '{}'", s)
            }
        }
    }
}

// ********* Configuration **********

/// How to fill in the score of the missing members of an incomplete team.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum FillMode {
    /// The average of the observed members, rounded down.
    #[default]
    Average,
    /// The lowest observed score.
    Least,
    /// The second best score (the only score for a single member).
    Middle,
}

impl FromStr for FillMode {
    type Err = ScoringErrors;

    fn from_str(s: &str) -> Result<FillMode, ScoringErrors> {
        match s {
            "avg" => Ok(FillMode::Average),
            "least" => Ok(FillMode::Least),
            "middle" => Ok(FillMode::Middle),
            x => Err(ScoringErrors::UnknownFillMode(x.to_string())),
        }
    }
}
