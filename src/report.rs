use std::fmt::Write;

use crate::models::{CompatibilityMatch, Recommendation, StudentRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSummary {
    pub recommendation: Recommendation,
    pub count: usize,
}

pub fn summarize_by_tier(matches: &[CompatibilityMatch]) -> Vec<TierSummary> {
    [
        Recommendation::Ideal,
        Recommendation::Good,
        Recommendation::Acceptable,
        Recommendation::NotRecommended,
    ]
    .into_iter()
    .map(|recommendation| TierSummary {
        recommendation,
        count: matches
            .iter()
            .filter(|candidate| candidate.recommendation == recommendation)
            .count(),
    })
    .collect()
}

fn pair_label(candidate: &CompatibilityMatch) -> String {
    format!(
        "{} ({}) vs {} ({})",
        candidate.student1.full_name(),
        candidate.student1.level,
        candidate.student2.full_name(),
        candidate.student2.level
    )
}

/// Renders the already filtered and sorted matches as markdown.
pub fn build_report(
    filter_label: &str,
    roster: &[StudentRecord],
    matches: &[CompatibilityMatch],
) -> String {
    let summaries = summarize_by_tier(matches);
    let mut output = String::new();

    let _ = writeln!(output, "# Sparring Compatibility Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} students, {} candidate pairs)",
        filter_label,
        roster.len(),
        matches.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation Mix");

    if matches.is_empty() {
        let _ = writeln!(output, "No candidate pairs for this selection.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(output, "- {}: {} pairs", summary.recommendation, summary.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Suggested Pairs");

    if matches.is_empty() {
        let _ = writeln!(output, "No candidate pairs for this selection.");
    } else {
        for candidate in matches.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} score {} ({})",
                pair_label(candidate),
                candidate.compatibility_score,
                candidate.recommendation
            );
            for reason in &candidate.reasons {
                let _ = writeln!(output, "  - + {reason}");
            }
            for warning in &candidate.warnings {
                let _ = writeln!(output, "  - ! {warning}");
            }
            if let Some(date) = candidate.last_session_date {
                let _ = writeln!(
                    output,
                    "  - last sparred {} ({} sessions total)",
                    date, candidate.previous_session_count
                );
            }
        }
    }

    let avoid: Vec<&CompatibilityMatch> = matches
        .iter()
        .filter(|candidate| candidate.recommendation == Recommendation::NotRecommended)
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Pairs To Avoid");

    if avoid.is_empty() {
        let _ = writeln!(output, "No pairs flagged as not recommended.");
    } else {
        for candidate in avoid {
            let _ = writeln!(
                output,
                "- {}: {}",
                pair_label(candidate),
                candidate.warnings.join("; ")
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MatchFilter;
    use crate::models::Level;
    use crate::tournament;

    fn student(
        id: &str,
        first: &str,
        height: f64,
        weight: f64,
        age: u32,
        level: Level,
    ) -> StudentRecord {
        StudentRecord {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            height_cm: height,
            weight_kg: weight,
            age,
            level,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }

    #[test]
    fn tiers_are_counted() {
        let roster = vec![
            student("a", "Ana", 175.0, 70.0, 25, Level::Intermediate),
            student("b", "Bea", 176.0, 69.0, 24, Level::Intermediate),
            student("c", "Cruz", 205.0, 110.0, 45, Level::Elite),
        ];
        let matches = tournament::generate(&roster, &[]);
        let summaries = summarize_by_tier(&matches);

        assert_eq!(summaries[0].recommendation, Recommendation::Ideal);
        assert_eq!(summaries[0].count, 1);
        assert_eq!(summaries[3].count, 2);
        assert_eq!(summaries.iter().map(|s| s.count).sum::<usize>(), 3);
    }

    #[test]
    fn report_lists_pairs_and_pairs_to_avoid() {
        let roster = vec![
            student("a", "Ana", 175.0, 70.0, 25, Level::Intermediate),
            student("b", "Bea", 176.0, 69.0, 24, Level::Intermediate),
            student("c", "Cruz", 205.0, 110.0, 45, Level::Elite),
        ];
        let matches = MatchFilter::default().apply(&tournament::generate(&roster, &[]));
        let report = build_report("all pairs", &roster, &matches);

        assert!(report.contains("Generated for all pairs (3 students, 3 candidate pairs)"));
        assert!(report
            .contains("- Ana Doe (intermediate) vs Bea Doe (intermediate) score 90 (ideal)"));
        assert!(report.contains("  - + Same technical level"));
        assert!(report
            .contains("## Pairs To Avoid\n- Ana Doe (intermediate) vs Cruz Doe (elite): "));
    }

    #[test]
    fn empty_selection_is_reported() {
        let report = build_report("student x", &[], &[]);
        assert!(report.contains("No candidate pairs for this selection."));
        assert!(report.contains("No pairs flagged as not recommended."));
    }
}
