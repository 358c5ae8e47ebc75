use chrono::NaiveDateTime;
use log::debug;

pub use crate::config::*;

/// A builder for adding responses.
///
/// The builder normalizes the raw records as they are read from a form export:
/// the email is trimmed and lower-cased, the answers are trimmed and aligned with
/// the questions, and the team of the participant is looked up if a roster is set.
///
/// ```
/// use crowd_scoring::builder::Builder;
/// use crowd_scoring::{FillMode, Member, Question, Roster, Team};
/// # use crowd_scoring::ScoringErrors;
/// # use chrono::NaiveDate;
/// # let at = NaiveDate::from_ymd_opt(2022, 10, 21).unwrap().and_hms_opt(9, 0, 0).unwrap();
///
/// let roster = Roster::new(vec![Team {
///     name: "Owls".to_string(),
///     members: vec![Member { email: "ann@example.com".to_string(), name: "Ann".to_string() }],
/// }]);
/// let mut builder = Builder::new(&[Question::new("Best pet?")]).roster(&roster);
///
/// builder.add_response(" Ann@Example.com", "Ann", at, &[" cat ".to_string()])?;
///
/// let result = builder.run(FillMode::Least)?;
/// assert_eq!(result.responses[0].team, "Owls");
/// assert_eq!(result.teams.unwrap()[0].final_score, 4);
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct Builder {
    pub(crate) _questions: Vec<Question>,
    pub(crate) _roster: Option<Roster>,
    pub(crate) _responses: Vec<Response>,
}

impl Builder {
    pub fn new(questions: &[Question]) -> Builder {
        Builder {
            _questions: questions.to_vec(),
            _roster: None,
            _responses: Vec::new(),
        }
    }

    /// Turns on the team mode.
    ///
    /// The roster must be set before adding responses, as every participant must
    /// then be found on a team.
    pub fn roster(self, roster: &Roster) -> Builder {
        Builder {
            _roster: Some(roster.clone()),
            ..self
        }
    }

    /// Adds a response, as read from the source.
    ///
    /// answers: the answers in the order of the questions. Missing trailing answers
    /// are treated as unanswered questions.
    pub fn add_response(
        &mut self,
        email: &str,
        name: &str,
        completed_at: NaiveDateTime,
        answers: &[String],
    ) -> Result<(), ScoringErrors> {
        let r = normalize(
            email,
            name,
            completed_at,
            answers,
            self._questions.len(),
            self._roster.as_ref(),
        )?;
        self._responses.push(r);
        Ok(())
    }

    pub fn responses(&self) -> &[Response] {
        &self._responses
    }

    pub fn run(self, fill_mode: FillMode) -> Result<ScoringResult, ScoringErrors> {
        crate::run_scoring(
            self._responses,
            &self._questions,
            self._roster.as_ref(),
            fill_mode,
        )
    }
}

/// Builds a canonical response out of a raw record.
///
/// When there is no name, the email is used for display.
pub fn normalize(
    email: &str,
    name: &str,
    completed_at: NaiveDateTime,
    answers: &[String],
    num_questions: usize,
    roster: Option<&Roster>,
) -> Result<Response, ScoringErrors> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ScoringErrors::MissingIdentity);
    }
    if answers.len() > num_questions {
        return Err(ScoringErrors::TooManyAnswers {
            email,
            expected: num_questions,
            found: answers.len(),
        });
    }
    let team = match roster {
        Some(r) => r
            .find_team(&email)
            .map(|s| s.to_string())
            .ok_or_else(|| ScoringErrors::UnknownParticipant(email.clone()))?,
        None => "".to_string(),
    };
    let name = match name.trim() {
        "" => email.clone(),
        x => x.to_string(),
    };

    let mut aligned: Vec<String> = answers.iter().map(|a| a.trim().to_string()).collect();
    aligned.resize(num_questions, "".to_string());
    debug!("normalize: {:?} ({:?}) team {:?}", email, name, team);

    Ok(Response {
        email,
        name,
        team,
        completed_at,
        answers: aligned,
        score_per_answer: vec![0; num_questions],
        total_score: 0,
    })
}
