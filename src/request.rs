//! Turning a `/predict` body into a [`StudentRecord`].
//!
//! JSON and form-encoded bodies are both accepted. Values may arrive as
//! numbers or as strings (the bundled page posts every form value as a
//! string), so each field is coerced individually and the first failure is
//! reported with the field's name.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::RequestError;
use crate::predictor::StudentRecord;

/// Alias accepted for `study_time`, used by older clients.
pub const STUDY_TIME_ALIAS: &str = "studytime";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
}

impl BodyFormat {
    /// A missing content type is treated as JSON.
    pub fn from_content_type(content_type: Option<&str>) -> Result<Self, RequestError> {
        let Some(raw) = content_type else {
            return Ok(BodyFormat::Json);
        };
        let mime = raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match mime.as_str() {
            "" | "application/json" => Ok(BodyFormat::Json),
            m if m.ends_with("+json") => Ok(BodyFormat::Json),
            "application/x-www-form-urlencoded" => Ok(BodyFormat::Form),
            _ => Err(RequestError::UnsupportedContentType(raw.to_string())),
        }
    }
}

pub fn parse_body(format: BodyFormat, body: &[u8]) -> Result<StudentRecord, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::Empty);
    }
    match format {
        BodyFormat::Json => parse_json(body),
        BodyFormat::Form => parse_form(body),
    }
}

pub fn parse_json(body: &[u8]) -> Result<StudentRecord, RequestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RequestError::Malformed(e.to_string()))?;
    match value {
        Value::Object(map) if !map.is_empty() => record_from_json(&map),
        _ => Err(RequestError::Empty),
    }
}

pub fn parse_form(body: &[u8]) -> Result<StudentRecord, RequestError> {
    let fields: HashMap<String, String> =
        serde_urlencoded::from_bytes(body).map_err(|e| RequestError::Malformed(e.to_string()))?;
    if fields.is_empty() {
        return Err(RequestError::Empty);
    }
    let get = |key: &'static str| fields.get(key).map(String::as_str);
    Ok(StudentRecord {
        name: get("name").map(str::to_string),
        age: int_from_str("age", required("age", get("age"))?)?,
        year1_marks: float_from_str("year1_marks", required("year1_marks", get("year1_marks"))?)?,
        year2_marks: float_from_str("year2_marks", required("year2_marks", get("year2_marks"))?)?,
        study_time: float_from_str(
            "study_time",
            required("study_time", get("study_time").or_else(|| get(STUDY_TIME_ALIAS)))?,
        )?,
        failures: int_from_str("failures", required("failures", get("failures"))?)?,
    })
}

fn record_from_json(map: &Map<String, Value>) -> Result<StudentRecord, RequestError> {
    let get = |key: &'static str| map.get(key);
    let name = match get("name") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    Ok(StudentRecord {
        name,
        age: int_from_json("age", required("age", get("age"))?)?,
        year1_marks: float_from_json("year1_marks", required("year1_marks", get("year1_marks"))?)?,
        year2_marks: float_from_json("year2_marks", required("year2_marks", get("year2_marks"))?)?,
        study_time: float_from_json(
            "study_time",
            required("study_time", get("study_time").or_else(|| get(STUDY_TIME_ALIAS)))?,
        )?,
        failures: int_from_json("failures", required("failures", get("failures"))?)?,
    })
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, RequestError> {
    value.ok_or(RequestError::MissingField(field))
}

fn invalid_int(field: &'static str) -> RequestError {
    RequestError::InvalidField {
        field,
        expected: "an integer",
    }
}

fn invalid_float(field: &'static str) -> RequestError {
    RequestError::InvalidField {
        field,
        expected: "a number",
    }
}

fn int_from_json(field: &'static str, value: &Value) -> Result<i64, RequestError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if integral(f) => Ok(f as i64),
                _ => Err(invalid_int(field)),
            }
        }
        Value::String(s) => int_from_str(field, s),
        _ => Err(invalid_int(field)),
    }
}

fn float_from_json(field: &'static str, value: &Value) -> Result<f64, RequestError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| invalid_float(field)),
        Value::String(s) => float_from_str(field, s),
        _ => Err(invalid_float(field)),
    }
}

/// Accepts `"18"` and `"18.0"`, rejects `"18.5"`.
fn int_from_str(field: &'static str, raw: &str) -> Result<i64, RequestError> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(i);
    }
    match raw.parse::<f64>() {
        Ok(f) if integral(f) => Ok(f as i64),
        _ => Err(invalid_int(field)),
    }
}

fn float_from_str(field: &'static str, raw: &str) -> Result<f64, RequestError> {
    match raw.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(invalid_float(field)),
    }
}

fn integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64
}
