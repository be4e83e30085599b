// src/services/advisor.rs

use std::fmt::Write;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::AiConfig,
    models::result::{ExamResult, ResultStatus},
    services::ServiceError,
};

const SYSTEM_PROMPT: &str = "You are a career and study counsellor for students in Bangladesh. \
Given a board examination result, suggest suitable next steps: streams or subjects to pursue, \
scholarships worth checking, and areas to improve. Be encouraging, concrete and brief \
(under 200 words). Answer in the language the student is most likely to prefer, English by default.";

/// Produces free-text guidance for a result. Opaque to the lookup pipeline.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn recommend(&self, result: &ExamResult) -> Result<String, ServiceError>;
}

/// Advisor backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ChatAdvisor {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatAdvisor {
    pub fn new(client: reqwest::Client, config: &AiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl Advisor for ChatAdvisor {
    async fn recommend(&self, result: &ExamResult) -> Result<String, ServiceError> {
        let summary = summarize(result);
        tracing::debug!("Requesting recommendation from model {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage { role: "system", content: SYSTEM_PROMPT },
                    ChatMessage { role: "user", content: &summary },
                ],
                temperature: 0.7,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected {
                service: "advisor",
                status: status.as_u16(),
                detail: detail.chars().take(300).collect(),
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ServiceError::EmptyResponse("advisor"))
    }
}

/// Compact, name-free description of a result for the model prompt.
pub fn summarize(result: &ExamResult) -> String {
    let verdict = match result.status {
        ResultStatus::Pass => "Pass",
        ResultStatus::Fail => "Fail",
    };

    let mut out = format!(
        "Exam: {} {}\nBoard: {}\nGroup: {}\nGPA: {:.2}\nResult: {}\nSubject grades:\n",
        result.exam.to_uppercase(),
        result.year,
        result.board,
        result.student_info.group,
        result.gpa,
        verdict
    );
    for grade in &result.grades {
        let name = if grade.subject_name.is_empty() {
            &grade.subject_code
        } else {
            &grade.subject_name
        };
        let _ = writeln!(out, "- {}: {}", name, grade.grade);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{GradeInfo, StudentInfo};

    #[test]
    fn summary_lists_grades_without_personal_details() {
        let result = ExamResult {
            roll: "123456".into(),
            registration: "1234567890".into(),
            board: "dhaka".into(),
            year: "2024".into(),
            exam: "ssc".into(),
            gpa: 4.5,
            status: ResultStatus::Pass,
            student_info: StudentInfo {
                name: "Rahim".into(),
                father_name: "Karim".into(),
                mother_name: "Rahima".into(),
                group: "SCIENCE".into(),
                date_of_birth: "01-01-2008".into(),
                institute: "Some School".into(),
                session: "2022-23".into(),
            },
            grades: vec![
                GradeInfo {
                    subject_code: "101".into(),
                    subject_name: "BANGLA".into(),
                    grade: "A".into(),
                    marks: None,
                },
                GradeInfo {
                    subject_code: "109".into(),
                    subject_name: String::new(),
                    grade: "A+".into(),
                    marks: None,
                },
            ],
        };

        let summary = summarize(&result);
        assert!(summary.contains("Exam: SSC 2024"));
        assert!(summary.contains("GPA: 4.50"));
        assert!(summary.contains("- BANGLA: A\n"));
        assert!(summary.contains("- 109: A+\n"));
        assert!(!summary.contains("Rahim"));
        assert!(!summary.contains("123456"));
    }
}
