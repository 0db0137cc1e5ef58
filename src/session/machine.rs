//! Legal-mutation rules for an interview session.
//!
//! Two states: in-progress (initial) and completed (terminal). Every
//! mutation is validated here before anything is persisted; a completed
//! session rejects all further actions with `InvalidState`, never silently.

use log::info;

use crate::error::{Error, Result};
use crate::models::{InterviewSession, SessionStatus};
use crate::session::{QuestionUpdate, SessionAction};

/// Applies one action to the session in place. On error the session is
/// left untouched.
pub fn apply_action(session: &mut InterviewSession, action: SessionAction) -> Result<()> {
    if session.status == SessionStatus::Completed {
        return Err(Error::InvalidState(format!(
            "Interview {} is completed and can no longer be modified",
            session.id
        )));
    }

    match action {
        SessionAction::AddQuestion(question) => {
            session.questions.push(question);
            info!(
                "Interview {}: question {} added",
                session.id,
                session.questions.len()
            );
            Ok(())
        }
        SessionAction::UpdateQuestion(update) => update_question(session, update),
        SessionAction::CompleteInterview(assessment) => {
            // Terminal transition: status and assessment change together.
            session.final_assessment = Some(assessment);
            session.status = SessionStatus::Completed;
            info!(
                "Interview {} completed with {} questions",
                session.id,
                session.questions.len()
            );
            Ok(())
        }
    }
}

/// Field-level merge into the question at the given position. Unspecified
/// fields are left untouched; replacement never happens wholesale.
fn update_question(session: &mut InterviewSession, update: QuestionUpdate) -> Result<()> {
    let index = update.question_index;
    let question = session
        .questions
        .get_mut(index)
        .ok_or_else(|| Error::NotFound(format!("Question {}", index)))?;

    if let Some(code) = update.candidate_code {
        question.candidate_code = Some(code);
    }
    if let Some(evaluation) = update.evaluation {
        question.evaluation = Some(evaluation);
    }
    if let Some(notes) = update.interviewer_notes {
        question.interviewer_notes = Some(notes);
    }

    info!("Interview {}: question {} updated", session.id, index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Difficulty, EvaluationRecord, EvaluationSummary, FinalAssessment, QuestionRecord,
    };
    use uuid::Uuid;

    fn new_session() -> InterviewSession {
        InterviewSession::new(Uuid::new_v4(), Uuid::new_v4())
    }

    fn question(skill: &str) -> QuestionRecord {
        QuestionRecord {
            skill: skill.to_string(),
            difficulty: Difficulty::Hard,
            question: "Design a rate limiter".to_string(),
            candidate_code: None,
            evaluation: None,
            interviewer_notes: None,
        }
    }

    fn assessment() -> FinalAssessment {
        FinalAssessment {
            technical_proficiency: 8,
            problem_solving: 7,
            code_quality: 8,
            overall_score: 8,
            strengths: vec!["Clear communication".to_string()],
            areas_for_improvement: vec!["Edge cases".to_string()],
            comments: "Strong hire".to_string(),
        }
    }

    #[test]
    fn add_question_appends_in_progress() {
        let mut session = new_session();
        apply_action(&mut session, SessionAction::AddQuestion(question("Rust"))).unwrap();
        apply_action(&mut session, SessionAction::AddQuestion(question("SQL"))).unwrap();
        assert_eq!(session.questions.len(), 2);
        assert_eq!(session.questions[1].skill, "SQL");
    }

    #[test]
    fn update_question_merges_without_clobbering_siblings() {
        let mut session = new_session();
        apply_action(&mut session, SessionAction::AddQuestion(question("Rust"))).unwrap();

        apply_action(
            &mut session,
            SessionAction::UpdateQuestion(QuestionUpdate {
                question_index: 0,
                candidate_code: Some("fn solve() {}".to_string()),
                evaluation: None,
                interviewer_notes: None,
            }),
        )
        .unwrap();

        apply_action(
            &mut session,
            SessionAction::UpdateQuestion(QuestionUpdate {
                question_index: 0,
                candidate_code: None,
                evaluation: None,
                interviewer_notes: Some("confident".to_string()),
            }),
        )
        .unwrap();

        let q = &session.questions[0];
        assert_eq!(q.candidate_code.as_deref(), Some("fn solve() {}"));
        assert_eq!(q.interviewer_notes.as_deref(), Some("confident"));
        assert_eq!(q.skill, "Rust");
    }

    #[test]
    fn update_question_out_of_bounds_is_not_found_and_leaves_session_unchanged() {
        let mut session = new_session();
        apply_action(&mut session, SessionAction::AddQuestion(question("Rust"))).unwrap();
        let before = serde_json::to_value(&session).unwrap();

        let err = apply_action(
            &mut session,
            SessionAction::UpdateQuestion(QuestionUpdate {
                question_index: 5,
                candidate_code: Some("ignored".to_string()),
                evaluation: None,
                interviewer_notes: None,
            }),
        )
        .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(serde_json::to_value(&session).unwrap(), before);
    }

    #[test]
    fn complete_sets_status_and_assessment_together() {
        let mut session = new_session();
        apply_action(&mut session, SessionAction::AddQuestion(question("Rust"))).unwrap();
        apply_action(&mut session, SessionAction::CompleteInterview(assessment())).unwrap();

        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.final_assessment.is_some());
    }

    #[test]
    fn completed_is_terminal_for_every_action() {
        let mut session = new_session();
        apply_action(&mut session, SessionAction::CompleteInterview(assessment())).unwrap();
        let before = serde_json::to_value(&session).unwrap();

        let actions = vec![
            SessionAction::AddQuestion(question("Go")),
            SessionAction::UpdateQuestion(QuestionUpdate {
                question_index: 0,
                candidate_code: Some("late".to_string()),
                evaluation: None,
                interviewer_notes: None,
            }),
            SessionAction::CompleteInterview(assessment()),
        ];

        for action in actions {
            let err = apply_action(&mut session, action).unwrap_err();
            assert!(matches!(err, Error::InvalidState(_)));
        }
        assert_eq!(serde_json::to_value(&session).unwrap(), before);
    }

    #[test]
    fn evaluation_merge_attaches_summary_and_raw() {
        let mut session = new_session();
        apply_action(&mut session, SessionAction::AddQuestion(question("Rust"))).unwrap();

        let record = EvaluationRecord {
            summary: Some(EvaluationSummary {
                overall_assessment: "fine".to_string(),
                correctness: 80,
                code_quality: 80,
                efficiency: "O(n)".to_string(),
                edge_case_handling: 80,
                overall_rating: 80,
            }),
            raw: "```json{...}```".to_string(),
        };

        apply_action(
            &mut session,
            SessionAction::UpdateQuestion(QuestionUpdate {
                question_index: 0,
                candidate_code: None,
                evaluation: Some(record),
                interviewer_notes: None,
            }),
        )
        .unwrap();

        let stored = session.questions[0].evaluation.as_ref().unwrap();
        assert_eq!(stored.summary.as_ref().unwrap().correctness, 80);
        assert!(!stored.raw.is_empty());
    }
}
