//! Turns per-question evaluations into a preliminary final assessment.
//!
//! Aggregation is advisory: it seeds the editable assessment fields and the
//! interviewer may overwrite any of them before completing the interview.
//! Overrides are never re-aggregated.

use crate::models::{FinalAssessment, QuestionRecord};

/// Neutral default on the 0-100 scale, used when no question carries a
/// structured evaluation summary.
pub const NEUTRAL_MEAN: i32 = 50;

/// Neutral default on the 1-10 assessment scale.
pub const NEUTRAL_SCORE: i32 = 5;

/// Per-dimension rounded means across evaluated questions, on the summary's
/// 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMeans {
    pub code_quality: i32,
    pub technical_proficiency: i32,
    pub problem_solving: i32,
    pub overall: i32,
}

/// Computes the rounded per-dimension means over questions that carry a
/// structured summary. An empty evaluated set yields [`NEUTRAL_MEAN`] across
/// the board rather than dividing by zero.
///
/// Dimension mapping: code quality from `code_quality`, technical
/// proficiency from `correctness` (the skill-assessment field), problem
/// solving from `edge_case_handling` (the problem-understanding field);
/// overall is the rounded mean of the prior three.
pub fn aggregate_scores(questions: &[QuestionRecord]) -> ScoreMeans {
    let summaries: Vec<_> = questions
        .iter()
        .filter_map(|q| q.evaluation.as_ref().and_then(|e| e.summary.as_ref()))
        .collect();

    if summaries.is_empty() {
        return ScoreMeans {
            code_quality: NEUTRAL_MEAN,
            technical_proficiency: NEUTRAL_MEAN,
            problem_solving: NEUTRAL_MEAN,
            overall: NEUTRAL_MEAN,
        };
    }

    let code_quality = rounded_mean(summaries.iter().map(|s| s.code_quality));
    let technical_proficiency = rounded_mean(summaries.iter().map(|s| s.correctness));
    let problem_solving = rounded_mean(summaries.iter().map(|s| s.edge_case_handling));
    let overall = rounded_mean([code_quality, technical_proficiency, problem_solving].into_iter());

    ScoreMeans {
        code_quality,
        technical_proficiency,
        problem_solving,
        overall,
    }
}

/// Seeds an editable final assessment from the aggregated means, scaled to
/// the 1-10 assessment range. Narrative fields start empty; the interviewer
/// fills or overwrites them before completion.
pub fn seed_assessment(questions: &[QuestionRecord]) -> FinalAssessment {
    let means = aggregate_scores(questions);
    FinalAssessment {
        technical_proficiency: to_ten_scale(means.technical_proficiency),
        problem_solving: to_ten_scale(means.problem_solving),
        code_quality: to_ten_scale(means.code_quality),
        overall_score: to_ten_scale(means.overall),
        strengths: Vec::new(),
        areas_for_improvement: Vec::new(),
        comments: String::new(),
    }
}

fn rounded_mean(values: impl Iterator<Item = i32>) -> i32 {
    let (sum, count) = values.fold((0i64, 0i64), |(s, c), v| (s + v as i64, c + 1));
    if count == 0 {
        return NEUTRAL_MEAN;
    }
    ((sum as f64) / (count as f64)).round() as i32
}

fn to_ten_scale(mean: i32) -> i32 {
    ((mean as f64) / 10.0).round().clamp(1.0, 10.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, EvaluationRecord, EvaluationSummary};

    fn evaluated_question(correctness: i32, code_quality: i32, edge_cases: i32) -> QuestionRecord {
        QuestionRecord {
            skill: "Rust".to_string(),
            difficulty: Difficulty::Medium,
            question: "q".to_string(),
            candidate_code: Some("fn main() {}".to_string()),
            evaluation: Some(EvaluationRecord {
                summary: Some(EvaluationSummary {
                    overall_assessment: "ok".to_string(),
                    correctness,
                    code_quality,
                    efficiency: "O(n)".to_string(),
                    edge_case_handling: edge_cases,
                    overall_rating: 80,
                }),
                raw: "{}".to_string(),
            }),
            interviewer_notes: None,
        }
    }

    fn unevaluated_question() -> QuestionRecord {
        QuestionRecord {
            skill: "Rust".to_string(),
            difficulty: Difficulty::Easy,
            question: "q".to_string(),
            candidate_code: None,
            evaluation: None,
            interviewer_notes: None,
        }
    }

    #[test]
    fn empty_evaluated_set_yields_neutral_defaults() {
        let means = aggregate_scores(&[unevaluated_question()]);
        assert_eq!(means.code_quality, NEUTRAL_MEAN);
        assert_eq!(means.overall, NEUTRAL_MEAN);

        let seeded = seed_assessment(&[]);
        assert_eq!(seeded.overall_score, NEUTRAL_SCORE);
        assert_eq!(seeded.technical_proficiency, NEUTRAL_SCORE);
    }

    #[test]
    fn code_quality_80_90_100_means_90() {
        let questions = vec![
            evaluated_question(70, 80, 60),
            evaluated_question(70, 90, 60),
            evaluated_question(70, 100, 60),
        ];
        let means = aggregate_scores(&questions);
        assert_eq!(means.code_quality, 90);
        assert_eq!(means.technical_proficiency, 70);
        assert_eq!(means.problem_solving, 60);
        // (90 + 70 + 60) / 3 = 73.33 -> 73
        assert_eq!(means.overall, 73);
    }

    #[test]
    fn questions_without_summary_are_skipped_not_zeroed() {
        let questions = vec![evaluated_question(80, 80, 80), unevaluated_question()];
        let means = aggregate_scores(&questions);
        assert_eq!(means.code_quality, 80);
    }

    #[test]
    fn record_with_raw_but_no_summary_is_skipped() {
        let mut q = evaluated_question(80, 80, 80);
        q.evaluation = Some(EvaluationRecord {
            summary: None,
            raw: "the model rambled".to_string(),
        });
        let means = aggregate_scores(&[q]);
        assert_eq!(means.overall, NEUTRAL_MEAN);
    }

    #[test]
    fn seeded_assessment_is_on_the_ten_scale() {
        let questions = vec![evaluated_question(85, 92, 78)];
        let seeded = seed_assessment(&questions);
        assert_eq!(seeded.code_quality, 9);
        assert_eq!(seeded.technical_proficiency, 9); // 85 -> 8.5 -> 9
        assert_eq!(seeded.problem_solving, 8);
        assert!(seeded.strengths.is_empty());
        assert!(seeded.comments.is_empty());
    }

    #[test]
    fn rounding_never_leaves_the_one_to_ten_range() {
        let questions = vec![evaluated_question(0, 0, 0)];
        let seeded = seed_assessment(&questions);
        assert_eq!(seeded.overall_score, 1);

        let questions = vec![evaluated_question(100, 100, 100)];
        let seeded = seed_assessment(&questions);
        assert_eq!(seeded.overall_score, 10);
    }
}
