use actix_web::{web, HttpResponse};
use rusqlite::OptionalExtension;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{coerce_semester, parse_semester, require, AppState, SubjectsQuery};
use crate::model::SubjectEntry;

#[derive(Debug, Deserialize)]
pub struct SubjectsPayload {
    branch: Option<String>,
    semester: Option<serde_json::Value>,
    subjects: Option<Vec<SubjectEntry>>,
}

/// Returns the catalog list for (branch, semester), 404 when none was saved.
pub async fn get(
    state: web::Data<AppState>,
    query: web::Query<SubjectsQuery>,
) -> Result<HttpResponse, ApiError> {
    let branch = require(&query.branch, "branch")?;
    let semester = parse_semester(require(&query.semester, "semester")?)?;

    let conn = state.conn()?;
    let subjects_json: Option<String> = conn
        .query_row(
            "SELECT subjects FROM subject_catalogs WHERE branch = ? AND semester = ?",
            (branch, semester),
            |r| r.get(0),
        )
        .optional()?;
    let Some(subjects_json) = subjects_json else {
        return Err(ApiError::not_found("subjects not found"));
    };

    let subjects: Vec<SubjectEntry> = serde_json::from_str(&subjects_json)?;
    Ok(HttpResponse::Ok().json(subjects))
}

/// Full-document upsert keyed by (branch, semester). The incoming list
/// replaces whatever was stored; there is no merge.
pub async fn save(
    state: web::Data<AppState>,
    body: web::Json<SubjectsPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    let branch = require(&payload.branch, "branch")?.to_string();
    let semester = match &payload.semester {
        Some(v) => coerce_semester(v)?,
        None => return Err(ApiError::bad_params("semester is required")),
    };
    let Some(subjects) = payload.subjects else {
        return Err(ApiError::bad_params("subjects is required"));
    };

    let conn = state.conn()?;
    conn.execute(
        "INSERT INTO subject_catalogs(branch, semester, subjects) VALUES(?, ?, ?)
         ON CONFLICT(branch, semester) DO UPDATE SET subjects = excluded.subjects",
        (&branch, semester, &serde_json::to_string(&subjects)?),
    )?;

    tracing::info!(branch = %branch, semester, count = subjects.len(), "subject catalog saved");
    Ok(HttpResponse::Ok().json(json!({
        "branch": branch,
        "semester": semester,
        "subjects": subjects,
    })))
}
