//! Team scores.

use log::debug;

use crate::config::*;

/// Sums the scores of the members of each team.
///
/// The teams that have fewer respondents than the nominal team size get a fill-in
/// score for each missing member, computed with the given mode. Teams without any
/// respondent score zero. The entries are returned in the order of the roster.
///
/// Every response must belong to a team of the roster.
pub fn aggregate(
    responses: &[Response],
    roster: &Roster,
    fill_mode: FillMode,
) -> Result<Vec<TeamScoreEntry>, ScoringErrors> {
    let mut by_team: Vec<Vec<MemberScore>> = vec![Vec::new(); roster.teams.len()];
    for r in responses.iter() {
        let email = r.email.to_lowercase();
        let team_idx = roster
            .teams
            .iter()
            .position(|t| t.members.iter().any(|m| m.email.to_lowercase() == email))
            .ok_or_else(|| ScoringErrors::UnknownParticipant(r.email.clone()))?;
        by_team[team_idx].push(MemberScore {
            name: r.name.clone(),
            email: Some(r.email.clone()),
            score: r.total_score,
        });
    }

    let mut res: Vec<TeamScoreEntry> = Vec::with_capacity(roster.teams.len());
    for (team, mut members) in roster.teams.iter().zip(by_team) {
        // Stable: members with the same score stay in response order.
        members.sort_by(|m1, m2| m2.score.cmp(&m1.score));
        let observed = members.len();
        let mut final_score: u32 = members.iter().map(|m| m.score).sum();
        let fill_in_score = if observed > 0 && observed < roster.team_size {
            let scores: Vec<u32> = members.iter().map(|m| m.score).collect();
            fill_in(&scores, fill_mode)
        } else {
            0
        };
        if observed > 0 && observed < roster.team_size {
            let num_missing = roster.team_size - observed;
            final_score += fill_in_score * num_missing as u32;
            for _ in 0..num_missing {
                members.push(MemberScore {
                    name: PLACEHOLDER_NAME.to_string(),
                    email: None,
                    score: fill_in_score,
                });
            }
        }
        debug!(
            "aggregate: team {:?}: {:?} members, fill-in {:?}, score {:?}",
            team.name, observed, fill_in_score, final_score
        );
        res.push(TeamScoreEntry {
            team_name: team.name.clone(),
            members,
            observed_member_count: observed,
            fill_in_score,
            final_score,
        });
    }
    Ok(res)
}

/// The score given to each missing member of a team.
///
/// `scores` are the scores of the members who responded, in decreasing order.
/// Must not be empty.
pub fn fill_in(scores: &[u32], fill_mode: FillMode) -> u32 {
    match (fill_mode, scores) {
        (_, []) => 0,
        (FillMode::Average, _) => scores.iter().sum::<u32>() / scores.len() as u32,
        (FillMode::Least, _) => scores.iter().min().cloned().unwrap_or(0),
        // The second best score, not the median.
        (FillMode::Middle, [only]) => *only,
        (FillMode::Middle, [_, second, ..]) => *second,
    }
}

/// The roster members who did not respond, in roster order.
pub fn find_missing(responses: &[Response], roster: &Roster) -> Vec<MissingMember> {
    let mut res: Vec<MissingMember> = Vec::new();
    for team in roster.teams.iter() {
        for member in team.members.iter() {
            let email = member.email.to_lowercase();
            if !responses.iter().any(|r| r.email.to_lowercase() == email) {
                debug!("find_missing: {:?} on team {:?}", member.email, team.name);
                res.push(MissingMember {
                    team: team.name.clone(),
                    email: member.email.clone(),
                });
            }
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn member(email: &str) -> Member {
        Member {
            email: email.to_string(),
            name: email.to_uppercase(),
        }
    }

    fn roster() -> Roster {
        Roster::new(vec![
            Team {
                name: "Owls".to_string(),
                members: ["a@x.org", "b@x.org", "c@x.org", "d@x.org"]
                    .iter()
                    .map(|e| member(e))
                    .collect(),
            },
            Team {
                name: "Larks".to_string(),
                members: ["e@x.org", "f@x.org", "g@x.org", "h@x.org"]
                    .iter()
                    .map(|e| member(e))
                    .collect(),
            },
            Team {
                name: "Crows".to_string(),
                members: vec![member("i@x.org")],
            },
        ])
    }

    fn scored(email: &str, total_score: u32) -> Response {
        Response {
            email: email.to_string(),
            name: email.to_string(),
            team: "".to_string(),
            completed_at: NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            answers: vec![],
            score_per_answer: vec![],
            total_score,
        }
    }

    fn two_owls() -> Vec<Response> {
        vec![scored("b@x.org", 10), scored("a@x.org", 30)]
    }

    #[test]
    fn fill_in_modes() {
        for (mode, fill, total) in [
            (FillMode::Average, 20, 80),
            (FillMode::Least, 10, 60),
            (FillMode::Middle, 10, 60),
        ] {
            let res = aggregate(&two_owls(), &roster(), mode).unwrap();
            let owls = &res[0];
            assert_eq!(owls.team_name, "Owls");
            assert_eq!(owls.observed_member_count, 2);
            assert_eq!(owls.fill_in_score, fill, "{:?}", mode);
            assert_eq!(owls.final_score, total, "{:?}", mode);
            let scores: Vec<u32> = owls.members.iter().map(|m| m.score).collect();
            assert_eq!(scores, vec![30, 10, fill, fill]);
            assert_eq!(owls.members[2].name, PLACEHOLDER_NAME);
            assert_eq!(owls.members[3].email, None);
        }
    }

    #[test]
    fn fill_in_middle() {
        assert_eq!(fill_in(&[12], FillMode::Middle), 12);
        assert_eq!(fill_in(&[30, 20, 5], FillMode::Middle), 20);
        assert_eq!(fill_in(&[7, 6], FillMode::Average), 6);
        assert_eq!(fill_in(&[], FillMode::Least), 0);
    }

    #[test]
    fn empty_and_full_teams() {
        let responses: Vec<Response> = ["e@x.org", "f@x.org", "g@x.org", "h@x.org"]
            .iter()
            .map(|e| scored(e, 5))
            .collect();
        let res = aggregate(&responses, &roster(), FillMode::Average).unwrap();
        let names: Vec<&str> = res.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["Owls", "Larks", "Crows"]);

        assert_eq!(res[0].final_score, 0);
        assert_eq!(res[0].fill_in_score, 0);
        assert!(res[0].members.is_empty());

        assert_eq!(res[1].final_score, 20);
        assert_eq!(res[1].fill_in_score, 0);
        assert_eq!(res[1].members.len(), 4);
    }

    #[test]
    fn team_size_is_configurable() {
        let r = roster().with_team_size(3);
        let res = aggregate(&two_owls(), &r, FillMode::Least).unwrap();
        assert_eq!(res[0].final_score, 50);
        assert_eq!(res[0].members.len(), 3);
    }

    #[test]
    fn unknown_participant_fails() {
        let mut responses = two_owls();
        responses.push(scored("zed@x.org", 3));
        assert_eq!(
            aggregate(&responses, &roster(), FillMode::Average),
            Err(ScoringErrors::UnknownParticipant("zed@x.org".to_string()))
        );
    }

    #[test]
    fn missing_members() {
        let missing = find_missing(&two_owls(), &roster());
        let emails: Vec<&str> = missing.iter().map(|m| m.email.as_str()).collect();
        assert_eq!(
            emails,
            vec!["c@x.org", "d@x.org", "e@x.org", "f@x.org", "g@x.org", "h@x.org", "i@x.org"]
        );
        assert_eq!(missing[0].team, "Owls");
        assert_eq!(missing[6].team, "Crows");
    }
}
