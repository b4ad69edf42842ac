use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use serde::Deserialize;

use super::error::ApiError;

/// Shared handler state. One connection behind a mutex: every handler touches
/// at most one document per operation, so per-document atomicity is all the
/// isolation the API promises.
pub struct AppState {
    db: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        AppState {
            db: Mutex::new(conn),
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("store lock poisoned")))
    }
}

/// Directory listing filters shared by the student and teacher lists.
#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub q: Option<String>,
    pub section: Option<String>,
    pub branch: Option<String>,
}

/// `?reg=` filter used by the event and achievement lists.
#[derive(Debug, Deserialize)]
pub struct RegQuery {
    pub reg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubjectsQuery {
    pub branch: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksQuery {
    pub alloted_registration_name: Option<String>,
    pub branch: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub reg: Option<String>,
    pub sem: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Pulls a required query parameter or answers with a validation error.
pub fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_params(format!("{} is required", name))),
    }
}

/// Semesters arrive as strings in query parameters and as either numbers or
/// strings in JSON bodies.
pub fn parse_semester(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_params("semester must be a number"))
}

pub fn coerce_semester(value: &serde_json::Value) -> Result<i64, ApiError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    if let Some(s) = value.as_str() {
        return parse_semester(s);
    }
    Err(ApiError::bad_params("semester must be a number"))
}
