/*!

Scoring of quizzes by crowd popularity.

Every answer earns as many points as the number of participants who gave the same
answer (ignoring case). Bonus questions designate one answer that is worth one and
a half times the most popular answer. The scores of the participants can then be
summed by team, with a policy to compensate for the members who did not answer.

```
use crowd_scoring::builder::Builder;
use crowd_scoring::{FillMode, Question};
# use crowd_scoring::ScoringErrors;
# use chrono::NaiveDate;
# let at = NaiveDate::from_ymd_opt(2022, 10, 21).unwrap().and_hms_opt(9, 0, 0).unwrap();

let mut builder = Builder::new(&[Question::new("Capital of France?")]);
builder.add_response("ann@example.com", "Ann", at, &["Paris".to_string()])?;
builder.add_response("bob@example.com", "Bob", at, &["paris".to_string()])?;
builder.add_response("cid@example.com", "Cid", at, &["London".to_string()])?;

let result = builder.run(FillMode::Average)?;
let totals: Vec<u32> = result.responses.iter().map(|r| r.total_score).collect();
assert_eq!(totals, vec![2, 2, 1]);
# Ok::<(), ScoringErrors>(())
```

See the [manual] for the input formats understood by the `crowdtally` program.
*/

mod config;
use log::{debug, info};

pub use crate::config::*;

pub mod builder;
pub mod manual;
pub mod teams;

/// Runs the whole scoring pipeline on the normalized responses.
///
/// Arguments:
/// * `responses` the normalized responses, possibly with several submissions per participant
/// * `questions` the questions, in the same order as the answers of the responses
/// * `roster` the teams. If not provided, only the individual scores are computed.
/// * `fill_mode` the policy for the missing members of incomplete teams
pub fn run_scoring(
    responses: Vec<Response>,
    questions: &[Question],
    roster: Option<&Roster>,
    fill_mode: FillMode,
) -> Result<ScoringResult, ScoringErrors> {
    info!(
        "Processing {:?} responses, {:?} questions, team mode: {:?}",
        responses.len(),
        questions.len(),
        roster.is_some()
    );
    let mut responses = dedup(responses);
    info!("{:?} responses after removing duplicates", responses.len());

    let mut questions: Vec<Question> = questions.to_vec();
    score(&mut responses, &mut questions);

    let (teams, missing_members) = match roster {
        Some(r) => {
            let entries = teams::aggregate(&responses, r, fill_mode)?;
            let missing = teams::find_missing(&responses, r);
            info!(
                "Scored {:?} teams, {:?} members did not respond",
                entries.len(),
                missing.len()
            );
            (Some(entries), missing)
        }
        None => (None, Vec::new()),
    };

    Ok(ScoringResult {
        responses,
        questions,
        teams,
        missing_members,
    })
}

/// Only keeps the last completed response of each participant.
///
/// If a participant submitted several responses with the same completion time, the
/// one that came last in the input is kept. The output is ordered by email.
pub fn dedup(mut responses: Vec<Response>) -> Vec<Response> {
    // Stable sort: equal timestamps keep their input order.
    responses.sort_by(|r1, r2| {
        r1.email
            .cmp(&r2.email)
            .then_with(|| r1.completed_at.cmp(&r2.completed_at))
    });
    let mut res: Vec<Response> = Vec::with_capacity(responses.len());
    for r in responses {
        match res.last_mut() {
            Some(last) if last.email == r.email => {
                debug!(
                    "dedup: dropping response of {:?} completed at {:?}",
                    last.email, last.completed_at
                );
                *last = r;
            }
            _ => res.push(r),
        }
    }
    res
}

/// The value of the designated answer of a bonus question: 1.5 times the most
/// popular answer, rounded down.
pub fn bonus_value(peak: u32) -> u32 {
    peak + peak / 2
}

/// Computes the population counts of the questions and the scores of the responses.
///
/// The population counts are rebuilt from scratch. The responses are expected to be
/// deduplicated already and to have as many answers as there are questions.
pub fn score(responses: &mut [Response], questions: &mut [Question]) {
    for q in questions.iter_mut() {
        q.population_counts.clear();
        q.bonus_value = 0;
    }

    // Frequency of each answer.
    for r in responses.iter() {
        for (q, answer) in questions.iter_mut().zip(r.answers.iter()) {
            if answer.is_empty() {
                continue;
            }
            q.population_counts
                .entry(answer.to_lowercase())
                .and_modify(|pc| pc.freq += 1)
                .or_insert_with(|| PopulationCount {
                    freq: 1,
                    original_answer: answer.clone(),
                });
        }
    }

    for q in questions.iter_mut().filter(|q| q.is_bonus()) {
        let peak = q.most_frequent();
        q.bonus_value = bonus_value(peak);
        debug!(
            "score: bonus question {:?}: peak {:?} -> bonus value {:?}",
            q.text, peak, q.bonus_value
        );
    }

    for r in responses.iter_mut() {
        r.score_per_answer = vec![0; questions.len()];
        r.total_score = 0;
        for (idx, (q, answer)) in questions.iter().zip(r.answers.iter()).enumerate() {
            if answer.is_empty() {
                continue;
            }
            let points = if q.is_bonus_answer(answer) {
                q.bonus_value
            } else {
                // Every non-empty answer was counted in the first pass.
                q.population_counts
                    .get(&answer.to_lowercase())
                    .map(|pc| pc.freq)
                    .unwrap_or(0)
            };
            r.score_per_answer[idx] = points;
            r.total_score += points;
        }
        debug!("score: {:?}: {:?}", r.email, r.score_per_answer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 3, 4)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn response(email: &str, hour: u32, answers: &[&str]) -> Response {
        Response {
            email: email.to_string(),
            name: email.to_string(),
            team: "".to_string(),
            completed_at: at(hour),
            answers: answers.iter().map(|s| s.to_string()).collect(),
            score_per_answer: vec![0; answers.len()],
            total_score: 0,
        }
    }

    #[test]
    fn dedup_keeps_last_completed() {
        for input in [
            vec![response("a@x.org", 9, &["old"]), response("a@x.org", 10, &["new"])],
            vec![response("a@x.org", 10, &["new"]), response("a@x.org", 9, &["old"])],
        ] {
            let res = dedup(input);
            assert_eq!(res.len(), 1);
            assert_eq!(res[0].answers, vec!["new".to_string()]);
        }
    }

    #[test]
    fn dedup_is_idempotent() {
        let input = vec![
            response("b@x.org", 9, &["1"]),
            response("a@x.org", 11, &["2"]),
            response("b@x.org", 12, &["3"]),
            response("c@x.org", 8, &["4"]),
            response("a@x.org", 10, &["5"]),
        ];
        let once = dedup(input);
        let emails: Vec<&str> = once.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.org", "b@x.org", "c@x.org"]);
        assert_eq!(dedup(once.clone()), once);
    }

    #[test]
    fn dedup_empty() {
        assert!(dedup(vec![]).is_empty());
    }

    #[test]
    fn bonus_formula() {
        assert_eq!(bonus_value(10), 15);
        assert_eq!(bonus_value(7), 10);
        assert_eq!(bonus_value(1), 1);
        assert_eq!(bonus_value(0), 0);
    }

    #[test]
    fn paris_and_london() {
        let mut responses = vec![
            response("a@x.org", 9, &["Paris"]),
            response("b@x.org", 9, &["paris"]),
            response("c@x.org", 9, &["London"]),
        ];
        let mut questions = vec![Question::new("Capital?")];
        score(&mut responses, &mut questions);

        let pc = &questions[0].population_counts;
        assert_eq!(pc.len(), 2);
        assert_eq!(pc["paris"].freq, 2);
        assert_eq!(pc["paris"].original_answer, "Paris");
        assert_eq!(pc["london"].freq, 1);

        let scores: Vec<u32> = responses.iter().map(|r| r.total_score).collect();
        assert_eq!(scores, vec![2, 2, 1]);
        assert_eq!(responses[0].score_per_answer, vec![2]);
    }

    #[test]
    fn unanswered_questions_score_nothing() {
        let mut responses = vec![
            response("a@x.org", 9, &["red", ""]),
            response("b@x.org", 9, &["", "dog"]),
            response("c@x.org", 9, &["Red", "dog"]),
        ];
        let mut questions = vec![Question::new("Color?"), Question::new("Pet?")];
        score(&mut responses, &mut questions);

        for (idx, q) in questions.iter().enumerate() {
            let total: u32 = q.population_counts.values().map(|pc| pc.freq).sum();
            let answered = responses
                .iter()
                .filter(|r| !r.answers[idx].is_empty())
                .count();
            assert_eq!(total as usize, answered);
            assert!(!q.population_counts.contains_key(""));
        }
        assert_eq!(responses[0].score_per_answer, vec![2, 0]);
        assert_eq!(responses[1].score_per_answer, vec![0, 2]);
        assert_eq!(responses[2].total_score, 4);
    }

    #[test]
    fn bonus_answer_is_worth_more() {
        let mut responses: Vec<Response> = (0..7)
            .map(|i| response(&format!("p{}@x.org", i), 9, &["Blue"]))
            .collect();
        responses.push(response("q@x.org", 9, &["GREEN"]));
        let mut questions = vec![Question::bonus("Favorite color?", "green")];
        score(&mut responses, &mut questions);

        assert_eq!(questions[0].bonus_value, 10);
        assert_eq!(responses[0].total_score, 7);
        assert_eq!(responses[7].total_score, 10);
        assert_eq!(
            questions[0].ranked_answers(),
            vec![("GREEN".to_string(), 10), ("Blue".to_string(), 7)]
        );
    }

    #[test]
    fn bonus_question_without_answers() {
        let mut responses = vec![response("a@x.org", 9, &[""])];
        let mut questions = vec![Question::bonus("Nobody knows", "42")];
        score(&mut responses, &mut questions);
        assert_eq!(questions[0].bonus_value, 0);
        assert_eq!(responses[0].total_score, 0);
    }

    #[test]
    fn scoring_twice_gives_the_same_counts() {
        let mut responses = vec![
            response("a@x.org", 9, &["x"]),
            response("b@x.org", 9, &["X"]),
        ];
        let mut questions = vec![Question::new("?")];
        score(&mut responses, &mut questions);
        score(&mut responses, &mut questions);
        assert_eq!(questions[0].population_counts["x"].freq, 2);
        assert_eq!(responses[1].total_score, 2);
    }

    #[test]
    fn ranked_answers_break_ties_by_text() {
        let mut responses = vec![
            response("a@x.org", 9, &["pear"]),
            response("b@x.org", 9, &["apple"]),
            response("c@x.org", 9, &["fig"]),
            response("d@x.org", 9, &["Fig"]),
        ];
        let mut questions = vec![Question::new("Fruit?")];
        score(&mut responses, &mut questions);
        assert_eq!(
            questions[0].ranked_answers(),
            vec![
                ("fig".to_string(), 2),
                ("apple".to_string(), 1),
                ("pear".to_string(), 1)
            ]
        );
    }

    #[test]
    fn fill_modes() {
        assert_eq!(FillMode::default(), FillMode::Average);
        assert_eq!("least".parse::<FillMode>(), Ok(FillMode::Least));
        assert_eq!("middle".parse::<FillMode>(), Ok(FillMode::Middle));
        assert_eq!(
            "median".parse::<FillMode>(),
            Err(ScoringErrors::UnknownFillMode("median".to_string()))
        );
    }

    #[test]
    fn run_without_roster() {
        let _ = env_logger::try_init();
        let responses = vec![
            response("a@x.org", 9, &["yes"]),
            response("a@x.org", 10, &["no"]),
            response("b@x.org", 9, &["no"]),
        ];
        let res = run_scoring(
            responses,
            &[Question::new("Well?")],
            None,
            FillMode::Average,
        )
        .unwrap();
        assert_eq!(res.responses.len(), 2);
        assert!(res.teams.is_none());
        assert!(res.missing_members.is_empty());
        assert!(res.responses.iter().all(|r| r.total_score == 2));
    }
}
