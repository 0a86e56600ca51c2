use crate::compatibility;
use crate::models::{CompatibilityMatch, SparringSession, StudentRecord};

/// Scores every unordered pair of the roster in index order: (0,1), (0,2), .., (n-2,n-1).
pub fn generate(
    roster: &[StudentRecord],
    sessions: &[SparringSession],
) -> Vec<CompatibilityMatch> {
    let mut matches = Vec::with_capacity(pair_count(roster.len()));
    for (i, student1) in roster.iter().enumerate() {
        for student2 in &roster[i + 1..] {
            matches.push(compatibility::calculate(student1, student2, sessions));
        }
    }
    matches
}

pub fn pair_count(roster_size: usize) -> usize {
    roster_size * roster_size.saturating_sub(1) / 2
}

/// Keeps the last tournament around until the roster or history changes.
#[derive(Debug, Default)]
pub struct TournamentCache {
    roster: Vec<StudentRecord>,
    sessions: Vec<SparringSession>,
    matches: Vec<CompatibilityMatch>,
    generation: u64,
}

impl TournamentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(
        &mut self,
        roster: &[StudentRecord],
        sessions: &[SparringSession],
    ) -> &[CompatibilityMatch] {
        if self.generation == 0 || self.roster != roster || self.sessions != sessions {
            self.roster = roster.to_vec();
            self.sessions = sessions.to_vec();
            self.matches = generate(roster, sessions);
            self.generation += 1;
            tracing::debug!(
                students = roster.len(),
                pairs = self.matches.len(),
                generation = self.generation,
                "rebuilt sparring tournament"
            );
        }
        &self.matches
    }

    /// Number of times the tournament has been rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn roster(size: usize) -> Vec<StudentRecord> {
        (0..size)
            .map(|index| StudentRecord {
                id: format!("student-{index}"),
                first_name: format!("First{index}"),
                last_name: format!("Last{index}"),
                height_cm: 165.0 + index as f64 * 3.0,
                weight_kg: 60.0 + index as f64 * 2.5,
                age: 18 + index as u32,
                level: Level::ALL[index % Level::ALL.len()],
                strengths: Vec::new(),
                weaknesses: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn small_rosters_produce_no_matches() {
        assert!(generate(&[], &[]).is_empty());
        assert!(generate(&roster(1), &[]).is_empty());
    }

    #[test]
    fn two_students_produce_one_match() {
        let matches = generate(&roster(2), &[]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].student1.id, "student-0");
        assert_eq!(matches[0].student2.id, "student-1");
    }

    #[test]
    fn pairs_follow_roster_order() {
        let ids: Vec<(String, String)> = generate(&roster(4), &[])
            .into_iter()
            .map(|m| (m.student1.id, m.student2.id))
            .collect();
        let expected: Vec<(String, String)> = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
            .into_iter()
            .map(|(i, j)| (format!("student-{i}"), format!("student-{j}")))
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn cache_reuses_result_until_inputs_change() {
        let mut students = roster(3);
        let mut sessions = Vec::new();
        let mut cache = TournamentCache::new();

        assert_eq!(cache.matches(&students, &sessions).len(), 3);
        assert_eq!(cache.matches(&students, &sessions).len(), 3);
        assert_eq!(cache.generation(), 1);

        sessions.push(SparringSession {
            id: "s1".to_string(),
            student1_id: "student-0".to_string(),
            student2_id: "student-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        });
        assert_eq!(cache.matches(&students, &sessions)[0].previous_session_count, 1);
        assert_eq!(cache.generation(), 2);

        students.pop();
        assert_eq!(cache.matches(&students, &sessions).len(), 1);
        assert_eq!(cache.generation(), 3);
    }

    #[test]
    fn empty_roster_is_still_cached() {
        let mut cache = TournamentCache::new();
        assert!(cache.matches(&[], &[]).is_empty());
        assert!(cache.matches(&[], &[]).is_empty());
        assert_eq!(cache.generation(), 1);
    }

    proptest! {
        #[test]
        fn every_unordered_pair_appears_once(size in 0usize..12) {
            let matches = generate(&roster(size), &[]);
            prop_assert_eq!(matches.len(), pair_count(size));

            let pairs: HashSet<(String, String)> = matches
                .iter()
                .map(|m| {
                    let (a, b) = (m.student1.id.clone(), m.student2.id.clone());
                    if a < b { (a, b) } else { (b, a) }
                })
                .collect();
            prop_assert_eq!(pairs.len(), matches.len());
            prop_assert!(matches.iter().all(|m| m.student1.id != m.student2.id));
        }
    }
}
