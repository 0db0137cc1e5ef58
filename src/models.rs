use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewLevel {
    High,
    Mid,
    Low,
}

impl InterviewLevel {
    pub fn as_str(&self) -> &str {
        match self {
            InterviewLevel::High => "High",
            InterviewLevel::Mid => "Mid",
            InterviewLevel::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Intern,
    #[serde(rename = "Full-Time")]
    FullTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Interviewer,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Interviewer => "interviewer",
        }
    }
}

/// One interview's full record. Stored as a single document; the question
/// list and final assessment always travel with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: Uuid,
    pub candidate: Uuid,
    pub interviewer: Uuid,
    pub date: DateTime<Utc>,
    pub status: SessionStatus,
    pub questions: Vec<QuestionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_assessment: Option<FinalAssessment>,
}

impl InterviewSession {
    pub fn new(candidate: Uuid, interviewer: Uuid) -> Self {
        InterviewSession {
            id: Uuid::new_v4(),
            candidate,
            interviewer,
            date: Utc::now(),
            status: SessionStatus::InProgress,
            questions: Vec::new(),
            final_assessment: None,
        }
    }
}

/// A question within a session. Identity is positional (index in the
/// session's question list), not a stable key of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub skill: String,
    pub difficulty: Difficulty,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer_notes: Option<String>,
}

/// AI evaluation of submitted code. `summary` is absent whenever the model
/// response could not be decoded; `raw` always keeps the original text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<EvaluationSummary>,
    pub raw: String,
}

/// The structured block the evaluation prompt asks the model to return.
/// Numeric fields are 0-100; `efficiency` is a Big-O description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub overall_assessment: String,
    pub correctness: i32,
    pub code_quality: i32,
    pub efficiency: String,
    pub edge_case_handling: i32,
    pub overall_rating: i32,
}

/// Final candidate assessment. Scores are 1-10. Seeded from the aggregator,
/// freely editable by the interviewer until the session completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalAssessment {
    pub technical_proficiency: i32,
    pub problem_solving: i32,
    pub code_quality: i32,
    pub overall_score: i32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub comments: String,
}

/// Candidate self-rating, two 1-10 scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfAssessment {
    pub backend: i32,
    pub frontend: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub position: Position,
    pub skills: Vec<String>,
    pub self_assessment: SelfAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    pub interview_level: InterviewLevel,
    pub created_at: DateTime<Utc>,
}

/// An authenticated actor. Deactivation is a soft flag; principals are
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Session read view with its references resolved, mirroring the store's
/// populate calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedSession {
    #[serde(flatten)]
    pub session: InterviewSession,
    pub candidate_details: Candidate,
    pub interviewer_details: Principal,
}
