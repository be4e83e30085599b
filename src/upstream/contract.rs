// src/upstream/contract.rs

//! Everything we assume about the upstream provider's wire format lives here.
//!
//! Field aliases are accepted; required data is not optional. A payload
//! either maps completely into an `ExamResult` or is rejected.

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde_json::{Map, Value};

use crate::{
    models::result::{ExamResult, GradeInfo, ResultQuery, ResultStatus, StudentInfo},
    upstream::error::LookupError,
};

pub const CAPTCHA_PATH: &str = "/captcha";
pub const RESULT_PATH: &str = "/getres";

/// The provider only answers result requests that look like its own XHR.
pub const REQUESTED_WITH: (&str, &str) = ("x-requested-with", "XMLHttpRequest");

/// Used when the CAPTCHA response carries no usable `Content-Type`.
pub const FALLBACK_CAPTCHA_MIME: &str = "image/png";

const NOT_FOUND_MARKERS: &[&str] = &["not found", "no result", "পাওয়া যায়নি"];
const CAPTCHA_MARKERS: &[&str] = &["captcha", "ক্যাপচা"];

/// Joins every `Set-Cookie` value with `", "`, otherwise untouched.
///
/// Values that are not visible ASCII cannot be echoed in a `Cookie`
/// header and are skipped with a warning.
pub fn session_cookie(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| match v.to_str() {
            Ok(cookie) => Some(cookie),
            Err(_) => {
                tracing::warn!(
                    "Skipping Set-Cookie value with non-ASCII bytes ({} bytes)",
                    v.len()
                );
                None
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// MIME type of the CAPTCHA image, without parameters.
///
/// A missing `Content-Type` falls back to PNG. Anything explicitly
/// declared as non-image (an HTML error or bot-challenge page) is rejected.
pub fn captcha_mime(headers: &HeaderMap) -> Result<String, LookupError> {
    let Some(value) = headers.get(reqwest::header::CONTENT_TYPE) else {
        return Ok(FALLBACK_CAPTCHA_MIME.to_string());
    };

    let mime = value
        .to_str()
        .ok()
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime.starts_with("image/") {
        Ok(mime)
    } else {
        Err(malformed(format!("captcha endpoint returned {:?}", mime)))
    }
}

/// Form fields of the result request, in the order the provider's own page sends them.
pub fn result_form(query: &ResultQuery) -> Vec<(&'static str, String)> {
    vec![
        ("exam", query.exam.clone()),
        ("year", query.year.clone()),
        ("board", query.board.clone()),
        ("result_type", "1".to_string()),
        ("roll", query.roll.clone()),
        ("reg", query.registration.clone()),
        ("eiin", String::new()),
        ("dcode", String::new()),
        ("ccode", String::new()),
        ("captcha", query.captcha_answer.clone()),
    ]
}

/// Classifies an upstream result payload and maps it into an `ExamResult`.
pub fn parse_result(body: &[u8], query: &ResultQuery) -> Result<ExamResult, LookupError> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|e| malformed(format!("response is not JSON: {}", e)))?;
    let envelope = envelope
        .as_object()
        .ok_or_else(|| malformed("response is not a JSON object"))?;

    let message = envelope.get("msg").and_then(text).unwrap_or_default();
    let lowered = message.to_lowercase();

    if CAPTCHA_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Err(LookupError::CaptchaInvalid);
    }
    if NOT_FOUND_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Err(LookupError::ResultNotFound);
    }

    let status = envelope
        .get("status")
        .and_then(integer)
        .ok_or_else(|| malformed("missing status"))?;
    if status != 0 {
        return Err(malformed(format!("status {} ({})", status, message)));
    }

    let res = match envelope.get("res") {
        Some(Value::Object(res)) if !res.is_empty() => res,
        None | Some(Value::Null) => return Err(LookupError::ResultNotFound),
        Some(Value::Array(a)) if a.is_empty() => return Err(LookupError::ResultNotFound),
        Some(Value::Object(_)) => return Err(LookupError::ResultNotFound),
        Some(other) => return Err(malformed(format!("unexpected res: {}", kind_of(other)))),
    };

    if let Some(upstream_roll) = optional(res, &["roll_no", "roll", "ROLL_NO"]) {
        if !same_number(&upstream_roll, &query.roll) {
            return Err(malformed(format!(
                "response is for roll {}, not the requested one",
                upstream_roll
            )));
        }
    }

    let student_info = StudentInfo {
        name: required(res, &["name", "NAME", "stud_name"])?,
        father_name: optional(res, &["fname", "father_name", "FNAME"]).unwrap_or_default(),
        mother_name: optional(res, &["mname", "mother_name", "MNAME"]).unwrap_or_default(),
        group: optional(res, &["stud_group", "group", "STUD_GROUP"]).unwrap_or_default(),
        date_of_birth: optional(res, &["dob", "DOB", "date_of_birth"]).unwrap_or_default(),
        institute: optional(res, &["inst_name", "institute", "INST_NAME"]).unwrap_or_default(),
        session: optional(res, &["session", "SESSION"]).unwrap_or_default(),
    };

    let gpa_raw = required(res, &["gpa", "GPA", "cgpa"])?;
    let gpa = parse_gpa(&gpa_raw)?;

    let status_raw = required(res, &["result", "RESULT", "status_text"])?;
    let status = parse_status(&status_raw)?;

    let grades = parse_grades(envelope, res)?;

    Ok(ExamResult {
        roll: query.roll.clone(),
        registration: optional(res, &["reg_no", "reg", "REG_NO"])
            .unwrap_or_else(|| query.registration.clone()),
        board: query.board.clone(),
        year: query.year.clone(),
        exam: query.exam.clone(),
        gpa,
        status,
        student_info,
        grades,
    })
}

fn parse_gpa(raw: &str) -> Result<f64, LookupError> {
    let gpa: f64 = raw
        .trim()
        .parse()
        .map_err(|_| malformed(format!("unparsable GPA {:?}", raw)))?;
    if !(0.0..=5.0).contains(&gpa) {
        return Err(malformed(format!("GPA {} out of range", gpa)));
    }
    Ok(gpa)
}

fn parse_status(raw: &str) -> Result<ResultStatus, LookupError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "P" | "PASS" | "PASSED" => Ok(ResultStatus::Pass),
        "F" | "FAIL" | "FAILED" => Ok(ResultStatus::Fail),
        _ => Err(malformed(format!("unknown result status {:?}", raw))),
    }
}

/// Grades come either as a `sub_details` array of rows, or as a
/// `res_detail` string like `"101:A+,102:A"`.
fn parse_grades(envelope: &Map<String, Value>, res: &Map<String, Value>) -> Result<Vec<GradeInfo>, LookupError> {
    // `null` counts as absent at either level.
    let rows = envelope
        .get("sub_details")
        .filter(|v| !v.is_null())
        .or_else(|| res.get("sub_details").filter(|v| !v.is_null()));

    let grades = match rows {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| -> Result<GradeInfo, LookupError> {
                let row = row
                    .as_object()
                    .ok_or_else(|| malformed("subject row is not an object"))?;
                Ok(GradeInfo {
                    subject_code: required(row, &["SUB_CODE", "sub_code", "code"])?,
                    subject_name: optional(row, &["SUB_NAME", "sub_name", "name"]).unwrap_or_default(),
                    grade: required(row, &["GRADE", "grade", "LG"])?,
                    marks: optional(row, &["MARKS", "marks", "TOTAL"]),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(malformed(format!("unexpected sub_details: {}", kind_of(other)))),
        None => match optional(res, &["res_detail", "RES_DETAIL"]) {
            Some(detail) => parse_res_detail(&detail)?,
            None => Vec::new(),
        },
    };

    if grades.is_empty() {
        return Err(malformed("no subject grades"));
    }
    Ok(grades)
}

fn parse_res_detail(detail: &str) -> Result<Vec<GradeInfo>, LookupError> {
    detail
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<GradeInfo, LookupError> {
            let (code, grade) = entry
                .split_once(':')
                .ok_or_else(|| malformed(format!("bad res_detail entry {:?}", entry)))?;
            Ok(GradeInfo {
                subject_code: code.trim().to_string(),
                subject_name: String::new(),
                grade: grade.trim().to_string(),
                marks: None,
            })
        })
        .collect()
}

fn malformed(detail: impl Into<String>) -> LookupError {
    LookupError::UpstreamResponseMalformed(detail.into())
}

/// Renders scalars as text; strings are returned verbatim.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn optional(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(text)
        .find(|v| !v.trim().is_empty())
}

fn required(obj: &Map<String, Value>, keys: &[&str]) -> Result<String, LookupError> {
    optional(obj, keys).ok_or_else(|| malformed(format!("missing field {}", keys[0])))
}

fn same_number(a: &str, b: &str) -> bool {
    a.trim().trim_start_matches('0') == b.trim().trim_start_matches('0')
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use serde_json::json;

    use super::*;

    fn query() -> ResultQuery {
        ResultQuery {
            exam: "ssc".to_string(),
            year: "2024".to_string(),
            board: "dhaka".to_string(),
            roll: "123456".to_string(),
            registration: "1234567890".to_string(),
            captcha_answer: "ab12".to_string(),
            session_cookie: "PHPSESSID=abc".to_string(),
        }
    }

    fn parse(body: Value) -> Result<ExamResult, LookupError> {
        parse_result(body.to_string().as_bytes(), &query())
    }

    fn success_body() -> Value {
        json!({
            "status": 0,
            "msg": "",
            "res": {
                "roll_no": "123456",
                "reg_no": "1234567890",
                "name": "মোঃ রহিম উদ্দিন",
                "fname": "Karim Uddin",
                "mname": "Rahima Begum",
                "stud_group": "SCIENCE",
                "dob": "01-01-2008",
                "inst_name": "Dhaka Collegiate School",
                "session": "2022-2023",
                "gpa": "5.00",
                "result": "P"
            },
            "sub_details": [
                { "SUB_CODE": "101", "SUB_NAME": "BANGLA", "GRADE": "A+" },
                { "SUB_CODE": "107", "SUB_NAME": "ENGLISH", "GRADE": "A" },
                { "SUB_CODE": "109", "SUB_NAME": "MATHEMATICS", "GRADE": "A+", "MARKS": "95" }
            ]
        })
    }

    #[test]
    fn maps_successful_payload() {
        let result = parse(success_body()).unwrap();
        assert_eq!(result.gpa, 5.0);
        assert_eq!(result.status, ResultStatus::Pass);
        assert_eq!(result.student_info.name, "মোঃ রহিম উদ্দিন");
        assert_eq!(result.student_info.institute, "Dhaka Collegiate School");
        let codes: Vec<_> = result.grades.iter().map(|g| g.subject_code.as_str()).collect();
        assert_eq!(codes, ["101", "107", "109"]);
        assert_eq!(result.grades[2].marks.as_deref(), Some("95"));
        assert_eq!(result.board, "dhaka");
    }

    #[test]
    fn falls_back_to_res_detail_string() {
        let mut body = success_body();
        body.as_object_mut().unwrap().remove("sub_details");
        body["res"]["res_detail"] = json!("101:A+, 107:A-,109:B");
        let result = parse(body).unwrap();
        let grades: Vec<_> = result.grades.iter().map(|g| g.grade.as_str()).collect();
        assert_eq!(grades, ["A+", "A-", "B"]);
    }

    #[test]
    fn classifies_captcha_and_not_found_messages() {
        assert!(matches!(
            parse(json!({ "status": 1, "msg": "Wrong Captcha!" })),
            Err(LookupError::CaptchaInvalid)
        ));
        assert!(matches!(
            parse(json!({ "status": 1, "msg": "Result Not Found!" })),
            Err(LookupError::ResultNotFound)
        ));
        assert!(matches!(
            parse(json!({ "status": 0, "msg": "", "res": null })),
            Err(LookupError::ResultNotFound)
        ));
    }

    #[test]
    fn rejects_partial_payloads() {
        let mut missing_gpa = success_body();
        missing_gpa["res"].as_object_mut().unwrap().remove("gpa");
        assert!(matches!(parse(missing_gpa), Err(LookupError::UpstreamResponseMalformed(_))));

        let mut bad_gpa = success_body();
        bad_gpa["res"]["gpa"] = json!("five");
        assert!(matches!(parse(bad_gpa), Err(LookupError::UpstreamResponseMalformed(_))));

        let mut no_grades = success_body();
        no_grades["sub_details"] = json!([]);
        assert!(matches!(parse(no_grades), Err(LookupError::UpstreamResponseMalformed(_))));

        let full = success_body().to_string();
        assert!(matches!(
            parse_result(&full.as_bytes()[..40], &query()),
            Err(LookupError::UpstreamResponseMalformed(_))
        ));
    }

    #[test]
    fn rejects_result_for_another_roll() {
        let mut body = success_body();
        body["res"]["roll_no"] = json!("654321");
        assert!(matches!(parse(body), Err(LookupError::UpstreamResponseMalformed(_))));

        let mut padded = success_body();
        padded["res"]["roll_no"] = json!("0123456");
        assert!(parse(padded).is_ok());
    }

    #[test]
    fn joins_set_cookie_headers_verbatim() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("PHPSESSID=abc123; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("lb=7; HttpOnly"));
        assert_eq!(session_cookie(&headers), "PHPSESSID=abc123; path=/, lb=7; HttpOnly");
        assert_eq!(session_cookie(&HeaderMap::new()), "");
    }

    #[test]
    fn skips_non_ascii_set_cookie_values() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("PHPSESSID=abc123; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_bytes(b"name=r\xe9sum\xe9").unwrap());
        headers.append(SET_COOKIE, HeaderValue::from_static("lb=7"));
        assert_eq!(session_cookie(&headers), "PHPSESSID=abc123; path=/, lb=7");
    }

    #[test]
    fn captcha_mime_defaults_to_png() {
        let mut headers = HeaderMap::new();
        assert_eq!(captcha_mime(&headers).unwrap(), "image/png");
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("image/jpeg; charset=binary"),
        );
        assert_eq!(captcha_mime(&headers).unwrap(), "image/jpeg");
    }

    #[test]
    fn captcha_mime_rejects_declared_non_images() {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=UTF-8"),
        );
        assert!(matches!(
            captcha_mime(&headers),
            Err(LookupError::UpstreamResponseMalformed(_))
        ));
    }

    #[test]
    fn null_sub_details_falls_back_to_res_detail() {
        let mut body = success_body();
        body["sub_details"] = Value::Null;
        body["res"]["res_detail"] = json!("101:A+,107:A");
        let result = parse(body).unwrap();
        let codes: Vec<_> = result.grades.iter().map(|g| g.subject_code.as_str()).collect();
        assert_eq!(codes, ["101", "107"]);
    }
}
