//! Prompt templates for the completion service. The text here is
//! configuration, not logic: each template is rendered by substituting
//! `{variable}` placeholders before the request goes out.

/// Identifies one of the fixed prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    GenerateQuestion,
    EvaluateCode,
    FinalAssessment,
    FollowUp,
}

impl PromptTemplate {
    pub fn text(&self) -> &'static str {
        match self {
            PromptTemplate::GenerateQuestion => QUESTION_TEMPLATE,
            PromptTemplate::EvaluateCode => CODE_EVALUATION_TEMPLATE,
            PromptTemplate::FinalAssessment => FINAL_ASSESSMENT_TEMPLATE,
            PromptTemplate::FollowUp => FOLLOW_UP_TEMPLATE,
        }
    }

    /// Renders the template with `{name}` placeholders replaced. Unknown
    /// placeholders are left in place so a missing variable is visible in
    /// the outgoing prompt rather than silently dropped.
    pub fn render(&self, vars: &[(&str, String)]) -> String {
        let mut prompt = self.text().to_string();
        for (name, value) in vars {
            prompt = prompt.replace(&format!("{{{}}}", name), value);
        }
        prompt
    }
}

const QUESTION_TEMPLATE: &str = r#"You are an expert technical interviewer. Generate a coding question for a candidate with the following parameters:

Skills: {skills}
Difficulty: {difficulty}
Interview Level: {level}

The question should:
1. Be specific to the selected skills
2. Match the difficulty level
3. Include a clear problem statement with constraints
4. Include input/output examples
5. Be in a LeetCode-style format

Generate the output in proper markdown with ## section headings for "Problem Statement", "Examples" and "Constraints", and fenced code blocks for example code.

Question:
"#;

const CODE_EVALUATION_TEMPLATE: &str = r#"You are an ultra-precise AI code evaluator. Analyze the given code against the interview question below and ALWAYS return a properly formatted JSON report.

QUESTION: {question}
CODE: {code}
SKILLS: {skills}

Evaluate correctness, efficiency (time and space complexity), code quality and edge case handling.

CRITICAL OUTPUT REQUIREMENTS - structure your response as a valid JSON object with EXACTLY this format:

```json
{
  "overall_assessment": "Brief description of code quality and functionality",
  "correctness": 85,
  "code_quality": 75,
  "efficiency": "O(n) time complexity, O(1) space complexity",
  "edge_case_handling": 70,
  "overall_rating": 80
}
```

IMPORTANT RULES:
- ALL numeric values must be integers between 0-100
- The "efficiency" field must be a string containing Big O notation
- DO NOT alter the JSON structure, omit fields or add additional fields
- Your entire response must be ONLY the valid JSON object, nothing else

If you cannot evaluate the code for any reason, still return the JSON format with default values and explain the issue in the "overall_assessment" field.
"#;

const FINAL_ASSESSMENT_TEMPLATE: &str = r#"You are an expert technical interviewer. Generate a comprehensive assessment for a candidate based on their interview performance:

Candidate Name: {name}
Position: {position}
Skills Assessed: {skills}
Interview Questions and Evaluations: {questionEvaluations}

Provide a detailed assessment covering technical proficiency (1-10), problem-solving approach (1-10), code quality and efficiency (1-10), an overall score (1-10), 3-5 areas of strength, 2-3 areas for improvement and summary comments.

Return only a JSON object as the final response:

```json
{
  "finalAssessment": {
    "technicalProficiency": 7,
    "problemSolvingApproach": 7,
    "codeQualityAndEfficiency": 7,
    "overallScore": 7,
    "areasOfStrength": ["..."],
    "areasForImprovement": ["..."],
    "summaryComments": "..."
  }
}
```
"#;

const FOLLOW_UP_TEMPLATE: &str = r#"You are an expert technical interviewer conducting a coding interview. Based on the candidate's solution to a previous question, generate relevant follow-up questions.

PREVIOUS QUESTION: {question}

CANDIDATE'S CODE SOLUTION: {code}

EVALUATION: {evaluation}

SKILLS BEING ASSESSED: {skills}

Generate 3 follow-up questions that probe deeper into the candidate's understanding, address weaknesses in their code, and explore related concepts or optimizations.

Return the response in this JSON format:

```json
{
  "followUpQuestions": [
    {
      "question": "Detailed question text here",
      "focus": "What this question is testing",
      "difficulty": "Easy|Medium|Hard"
    }
  ]
}
```
"#;
