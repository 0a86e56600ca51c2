use chrono::NaiveDate;

use crate::models::{CompatibilityMatch, Recommendation, SparringSession, StudentRecord};

/// Sessions beyond this count start to penalize a pair.
pub const REPEAT_SESSION_LIMIT: usize = 5;

/// Points and explanation contributed by one scoring category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    pub points: i32,
    pub reason: Option<String>,
    pub warning: Option<String>,
}

impl Signal {
    fn reason(points: i32, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: Some(reason.into()),
            warning: None,
        }
    }

    fn warning(points: i32, warning: impl Into<String>) -> Self {
        Self {
            points,
            reason: None,
            warning: Some(warning.into()),
        }
    }
}

pub fn calculate(
    student1: &StudentRecord,
    student2: &StudentRecord,
    sessions: &[SparringSession],
) -> CompatibilityMatch {
    let history: Vec<&SparringSession> = sessions
        .iter()
        .filter(|session| session.involves_pair(&student1.id, &student2.id))
        .collect();

    let signals = [
        height_signal(student1.height_cm, student2.height_cm),
        weight_signal(student1.weight_kg, student2.weight_kg),
        level_signal(student1, student2),
        age_signal(student1.age, student2.age),
        skills_signal(complementary_count(student1, student2)),
        history_signal(history.len()),
    ];

    let mut raw_score = 0;
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();
    for signal in signals {
        raw_score += signal.points;
        reasons.extend(signal.reason);
        warnings.extend(signal.warning);
    }

    let compatibility_score = raw_score.clamp(0, 100) as u32;
    let recommendation = Recommendation::from_verdict(compatibility_score, warnings.len());

    CompatibilityMatch {
        student1: student1.clone(),
        student2: student2.clone(),
        compatibility_score,
        reasons,
        warnings,
        previous_session_count: history.len(),
        last_session_date: last_session_date(&history),
        recommendation,
    }
}

pub fn height_signal(height1: f64, height2: f64) -> Signal {
    let diff = (height1 - height2).abs();
    if diff <= 5.0 {
        Signal::reason(25, "Very similar height")
    } else if diff <= 10.0 {
        Signal::reason(20, "Compatible height")
    } else if diff <= 15.0 {
        Signal::reason(10, "Acceptable height difference")
    } else {
        Signal::warning(0, format!("Height difference of {diff}cm"))
    }
}

pub fn weight_signal(weight1: f64, weight2: f64) -> Signal {
    let diff = (weight1 - weight2).abs();
    if diff <= 3.0 {
        Signal::reason(25, "Very similar weight")
    } else if diff <= 5.0 {
        Signal::reason(20, "Compatible weight")
    } else if diff <= 10.0 {
        Signal::reason(10, "Acceptable weight difference")
    } else {
        Signal::warning(0, format!("Weight difference of {diff:.1}kg"))
    }
}

pub fn level_signal(student1: &StudentRecord, student2: &StudentRecord) -> Signal {
    match student1.level.ordinal().abs_diff(student2.level.ordinal()) {
        0 => Signal::reason(30, "Same technical level"),
        1 => Signal::reason(25, "Compatible levels"),
        2 => Signal::reason(15, "Moderate level difference"),
        _ => Signal::warning(5, "Large technical level difference"),
    }
}

/// Six to ten years apart earns nothing and warns about nothing.
pub fn age_signal(age1: u32, age2: u32) -> Signal {
    let diff = age1.abs_diff(age2);
    if diff <= 3 {
        Signal::reason(10, "Similar ages")
    } else if diff <= 5 {
        Signal::reason(5, "Acceptable age difference")
    } else if diff > 10 {
        Signal::warning(0, format!("Age difference of {diff} years"))
    } else {
        Signal::default()
    }
}

fn skills_signal(count: usize) -> Signal {
    if count == 0 {
        return Signal::default();
    }
    let noun = if count == 1 { "area" } else { "areas" };
    Signal::reason(5 * count as i32, format!("{count} complementary {noun}"))
}

fn history_signal(count: usize) -> Signal {
    if count > REPEAT_SESSION_LIMIT {
        Signal::warning(-10, format!("Have sparred together {count} times"))
    } else if count > 0 {
        let noun = if count == 1 { "session" } else { "sessions" };
        Signal::reason(0, format!("{count} previous {noun}"))
    } else {
        Signal::default()
    }
}

/// Strengths of each student that line up with a weakness of the other,
/// counted in both directions.
pub fn complementary_count(student1: &StudentRecord, student2: &StudentRecord) -> usize {
    covered_weaknesses(&student1.strengths, &student2.weaknesses)
        + covered_weaknesses(&student2.strengths, &student1.weaknesses)
}

fn covered_weaknesses(strengths: &[String], weaknesses: &[String]) -> usize {
    strengths
        .iter()
        .filter(|strength| {
            weaknesses
                .iter()
                .any(|weakness| skills_overlap(strength, weakness))
        })
        .count()
}

/// Either tag contains the first word of the other, ignoring case.
pub fn skills_overlap(strength: &str, weakness: &str) -> bool {
    let strength = strength.to_lowercase();
    let weakness = weakness.to_lowercase();
    strength.contains(first_token(&weakness)) || weakness.contains(first_token(&strength))
}

fn first_token(tag: &str) -> &str {
    tag.split(char::is_whitespace).next().unwrap_or_default()
}

fn last_session_date(history: &[&SparringSession]) -> Option<NaiveDate> {
    history.iter().map(|session| session.date).max()
}
