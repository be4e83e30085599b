// src/models/result.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    config::EARLIEST_EXAM_YEAR,
    models::meta::{current_year, is_known_board, is_known_exam},
};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Pass/fail verdict exactly as the upstream provider decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    Pass,
    Fail,
}

/// Descriptive facts about the examinee, relayed verbatim from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub group: String,
    pub date_of_birth: String,
    pub institute: String,
    pub session: String,
}

/// One examined subject. Order within `ExamResult::grades` is upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeInfo {
    pub subject_code: String,
    pub subject_name: String,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<String>,
}

/// Normalized result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub roll: String,
    pub registration: String,
    pub board: String,
    pub year: String,
    pub exam: String,
    pub gpa: f64,
    pub status: ResultStatus,
    pub student_info: StudentInfo,
    pub grades: Vec<GradeInfo>,
}

/// Everything ResultFetcher needs for one upstream round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultQuery {
    pub exam: String,
    pub year: String,
    pub board: String,
    pub roll: String,
    pub registration: String,
    pub captcha_answer: String,
    pub session_cookie: String,
}

impl ResultQuery {
    /// Names of the fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("exam", &self.exam),
            ("year", &self.year),
            ("board", &self.board),
            ("roll", &self.roll),
            ("registration", &self.registration),
            ("captcha_answer", &self.captcha_answer),
            ("session_cookie", &self.session_cookie),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// DTO for `POST /api/result`, as submitted by the lookup form.
#[derive(Debug, Deserialize, Validate)]
pub struct ResultForm {
    #[validate(custom(function = validate_exam))]
    pub exam: String,
    #[validate(custom(function = validate_year))]
    pub year: String,
    #[validate(custom(function = validate_board))]
    pub board: String,
    #[validate(
        length(min = 1, max = 10, message = "Roll must be 1 to 10 digits."),
        custom(function = validate_digits)
    )]
    pub roll: String,
    #[validate(
        length(min = 1, max = 12, message = "Registration must be 1 to 12 digits."),
        custom(function = validate_digits)
    )]
    pub registration: String,
    #[validate(length(min = 1, max = 10, message = "Enter the characters shown in the image."))]
    pub captcha: String,
    #[validate(length(min = 1, message = "CAPTCHA session missing, reload the CAPTCHA."))]
    pub cookie: String,
}

impl From<ResultForm> for ResultQuery {
    /// Codes are lower-cased; roll, registration and CAPTCHA are trimmed.
    /// The cookie is passed through untouched.
    fn from(form: ResultForm) -> Self {
        Self {
            exam: form.exam.trim().to_lowercase(),
            year: form.year.trim().to_string(),
            board: form.board.trim().to_lowercase(),
            roll: form.roll.trim().to_string(),
            registration: form.registration.trim().to_string(),
            captcha_answer: form.captcha.trim().to_string(),
            session_cookie: form.cookie,
        }
    }
}

fn validate_exam(exam: &str) -> Result<(), ValidationError> {
    if !is_known_exam(&exam.trim().to_lowercase()) {
        return Err(ValidationError::new("unknown_exam").with_message("Unknown examination.".into()));
    }
    Ok(())
}

fn validate_board(board: &str) -> Result<(), ValidationError> {
    if !is_known_board(&board.trim().to_lowercase()) {
        return Err(ValidationError::new("unknown_board").with_message("Unknown board.".into()));
    }
    Ok(())
}

fn validate_year(year: &str) -> Result<(), ValidationError> {
    let year = year.trim();
    let parsed = year
        .parse::<i32>()
        .ok()
        .filter(|_| year.len() == 4 && DIGITS.is_match(year));

    match parsed {
        Some(y) if (EARLIEST_EXAM_YEAR..=current_year()).contains(&y) => Ok(()),
        _ => Err(ValidationError::new("invalid_year").with_message(
            format!("Year must be between {} and {}.", EARLIEST_EXAM_YEAR, current_year()).into(),
        )),
    }
}

fn validate_digits(value: &str) -> Result<(), ValidationError> {
    if !DIGITS.is_match(value.trim()) {
        return Err(ValidationError::new("not_numeric").with_message("Only digits are allowed.".into()));
    }
    Ok(())
}
