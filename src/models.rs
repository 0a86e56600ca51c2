use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    Competitor,
    Elite,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Beginner,
        Level::Intermediate,
        Level::Advanced,
        Level::Competitor,
        Level::Elite,
    ];

    /// Position on the 1..=5 ladder used for level distance.
    pub fn ordinal(self) -> u8 {
        match self {
            Level::Beginner => 1,
            Level::Intermediate => 2,
            Level::Advanced => 3,
            Level::Competitor => 4,
            Level::Elite => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::Competitor => "competitor",
            Level::Elite => "elite",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownLevel(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    Ideal,
    Good,
    Acceptable,
    NotRecommended,
}

impl Recommendation {
    /// First matching tier wins: ideal, good, acceptable, then not-recommended.
    pub fn from_verdict(score: u32, warning_count: usize) -> Self {
        if score >= 80 && warning_count == 0 {
            Recommendation::Ideal
        } else if score >= 60 && warning_count <= 1 {
            Recommendation::Good
        } else if score >= 40 {
            Recommendation::Acceptable
        } else {
            Recommendation::NotRecommended
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Ideal => "ideal",
            Recommendation::Good => "good",
            Recommendation::Acceptable => "acceptable",
            Recommendation::NotRecommended => "not-recommended",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub level: Level,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

impl StudentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparringSession {
    pub id: String,
    pub student1_id: String,
    pub student2_id: String,
    pub date: NaiveDate,
}

impl SparringSession {
    pub fn involves_pair(&self, a: &str, b: &str) -> bool {
        (self.student1_id == a && self.student2_id == b)
            || (self.student1_id == b && self.student2_id == a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityMatch {
    pub student1: StudentRecord,
    pub student2: StudentRecord,
    pub compatibility_score: u32,
    pub reasons: Vec<String>,
    pub warnings: Vec<String>,
    pub previous_session_count: usize,
    pub last_session_date: Option<NaiveDate>,
    pub recommendation: Recommendation,
}

impl CompatibilityMatch {
    pub fn involves(&self, student_id: &str) -> bool {
        self.student1.id == student_id || self.student2.id == student_id
    }

    pub fn pairs(&self, a: &str, b: &str) -> bool {
        (self.student1.id == a && self.student2.id == b)
            || (self.student1.id == b && self.student2.id == a)
    }
}
