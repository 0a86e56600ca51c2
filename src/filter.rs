use std::cmp::Ordering;

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::models::{CompatibilityMatch, Level, StudentRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortMode {
    /// Highest compatibility score first
    #[default]
    Compatibility,
    /// Fewest previous sessions first
    Sessions,
    /// Longest since the last session first, never-sparred pairs last
    LastSession,
}

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub student_id: Option<String>,
    pub level: Option<Level>,
    pub search: String,
    pub sort: SortMode,
}

impl MatchFilter {
    pub fn apply(&self, matches: &[CompatibilityMatch]) -> Vec<CompatibilityMatch> {
        let mut selected: Vec<CompatibilityMatch> = matches
            .iter()
            .filter(|candidate| self.keeps(candidate))
            .cloned()
            .collect();

        match self.sort {
            SortMode::Compatibility => {
                selected.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score))
            }
            SortMode::Sessions => {
                selected.sort_by_key(|candidate| candidate.previous_session_count)
            }
            SortMode::LastSession => selected
                .sort_by(|a, b| compare_last_session(a.last_session_date, b.last_session_date)),
        }

        selected
    }

    pub fn keeps(&self, candidate: &CompatibilityMatch) -> bool {
        self.matches_student(candidate)
            && self.matches_level(candidate)
            && self.matches_search(candidate)
    }

    fn matches_student(&self, candidate: &CompatibilityMatch) -> bool {
        match &self.student_id {
            Some(id) => candidate.involves(id),
            None => true,
        }
    }

    fn matches_level(&self, candidate: &CompatibilityMatch) -> bool {
        match self.level {
            Some(level) => candidate.student1.level == level || candidate.student2.level == level,
            None => true,
        }
    }

    fn matches_search(&self, candidate: &CompatibilityMatch) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        name_contains(&candidate.student1, &needle) || name_contains(&candidate.student2, &needle)
    }

    /// Short human label used in report headers.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = &self.student_id {
            parts.push(format!("student {id}"));
        }
        if let Some(level) = self.level {
            parts.push(format!("level {level}"));
        }
        if !self.search.is_empty() {
            parts.push(format!("search \"{}\"", self.search));
        }
        if parts.is_empty() {
            "all pairs".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn name_contains(student: &StudentRecord, needle: &str) -> bool {
    student.first_name.to_lowercase().contains(needle)
        || student.last_name.to_lowercase().contains(needle)
}

/// Older sessions first; pairs that never sparred sort after every dated pair.
fn compare_last_session(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
