// The console report and the JSON summary of a scoring run.

use crate::tally::*;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

/// The participants from the best to the worst score. Ties are ordered by name.
pub fn ranked_players(result: &ScoringResult) -> Vec<&Response> {
    let mut players: Vec<&Response> = result.responses.iter().collect();
    players.sort_by(|r1, r2| {
        r2.total_score
            .cmp(&r1.total_score)
            .then_with(|| r1.name.cmp(&r2.name))
    });
    players
}

/// The teams from the best to the worst score. Ties are ordered by team name.
pub fn ranked_teams(teams: &[TeamScoreEntry]) -> Vec<&TeamScoreEntry> {
    let mut res: Vec<&TeamScoreEntry> = teams.iter().collect();
    res.sort_by(|t1, t2| {
        t2.final_score
            .cmp(&t1.final_score)
            .then_with(|| t1.team_name.cmp(&t2.team_name))
    });
    res
}

pub fn print_report(result: &ScoringResult, individual: bool) {
    for m in result.missing_members.iter() {
        println!("Missing response from {} on team {}", m.email, m.team);
    }

    for (idx, q) in result.questions.iter().enumerate() {
        println!("Question #{} -- {}", idx + 1, q.text);
        for (answer, points) in q.ranked_answers() {
            if q.is_bonus_answer(&answer) {
                println!("\t{:3} 🎯\t{}", points, answer);
            } else {
                println!("\t{:3}\t{}", points, answer);
            }
        }
    }

    if individual {
        for r in result.responses.iter() {
            println!("{}", r.name);
            for (idx, (answer, points)) in r.answers.iter().zip(r.score_per_answer.iter()).enumerate() {
                println!("\t{:2}: {:3}\t{}", idx, points, answer);
            }
            println!("\t-----------------------\n\t total {}", r.total_score);
        }
        println!();
    }

    println!("\nPlayer Scores");
    for r in ranked_players(result) {
        println!("{:4}\t{}", r.total_score, r.name);
    }

    if let Some(teams) = &result.teams {
        println!("\nTeam Scores");
        for t in ranked_teams(teams) {
            println!("{:4}\t{}", t.final_score, t.team_name);
            for m in t.members.iter() {
                println!("\t{:4}\t{}", m.score, m.name);
            }
        }
    }
}

pub fn roster_summary(roster: &Roster, path: &str) -> String {
    format!(
        "Read {} teams and {} members from {}",
        roster.teams.len(),
        roster.total_members(),
        path
    )
}

/// Prints the teams and their members, then all the emails on one line.
pub fn print_teams(roster: &Roster) {
    for t in roster.teams.iter() {
        println!("Team Name: {}", t.name);
        for m in t.members.iter() {
            println!("\t{}", m.name);
        }
    }
    let emails: Vec<&str> = roster
        .teams
        .iter()
        .flat_map(|t| t.members.iter().map(|m| m.email.as_str()))
        .collect();
    println!("{}", emails.join(","));
}

fn question_to_json(q: &Question) -> JSValue {
    let answers: Vec<JSValue> = q
        .ranked_answers()
        .into_iter()
        .map(|(answer, points)| json!({"answer": answer, "points": points}))
        .collect();
    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert("question".to_string(), json!(q.text));
    js.insert("answers".to_string(), json!(answers));
    if let Some(bonus_answer) = &q.bonus_answer {
        js.insert("bonusAnswer".to_string(), json!(bonus_answer));
        js.insert("bonusValue".to_string(), json!(q.bonus_value));
    }
    JSValue::Object(js)
}

fn team_to_json(t: &TeamScoreEntry) -> JSValue {
    let members: Vec<JSValue> = t
        .members
        .iter()
        .map(|m| json!({"name": m.name, "score": m.score}))
        .collect();
    json!({
        "team": t.team_name,
        "score": t.final_score,
        "fillIn": t.fill_in_score,
        "respondents": t.observed_member_count,
        "members": members
    })
}

pub fn build_summary_js(result: &ScoringResult) -> JSValue {
    let questions: Vec<JSValue> = result.questions.iter().map(question_to_json).collect();
    let players: Vec<JSValue> = ranked_players(result)
        .into_iter()
        .map(|r| {
            json!({
                "name": r.name,
                "email": r.email,
                "score": r.total_score,
                "answerScores": r.score_per_answer
            })
        })
        .collect();
    let missing: Vec<JSValue> = result
        .missing_members
        .iter()
        .map(|m| json!({"team": m.team, "email": m.email}))
        .collect();

    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert("questions".to_string(), json!(questions));
    js.insert("players".to_string(), json!(players));
    if let Some(teams) = &result.teams {
        let teams_js: Vec<JSValue> = ranked_teams(teams).into_iter().map(team_to_json).collect();
        js.insert("teams".to_string(), json!(teams_js));
    }
    js.insert("missingMembers".to_string(), json!(missing));
    JSValue::Object(js)
}
