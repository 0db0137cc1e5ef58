pub mod machine;

pub use machine::apply_action;

use serde::{Deserialize, Serialize};

use crate::models::{EvaluationRecord, FinalAssessment, QuestionRecord};

/// The `{action, data}` body of a session PATCH. Action names are part of
/// the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum SessionAction {
    AddQuestion(QuestionRecord),
    UpdateQuestion(QuestionUpdate),
    CompleteInterview(FinalAssessment),
}

/// Field-level patch for the question at `question_index`. Absent fields
/// leave the stored record untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionUpdate {
    pub question_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer_notes: Option<String>,
}
