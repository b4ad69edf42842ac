use actix_web::{web, HttpResponse};
use rusqlite::OptionalExtension;
use serde_json::json;

use super::students::{load_directory, matches_exact, matches_query};
use crate::api::error::ApiError;
use crate::api::types::{AppState, DirectoryQuery};

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<DirectoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = state.conn()?;
    let rows = load_directory(&conn, "teacher")?;

    let mut teachers = Vec::new();
    for row in rows {
        if let Some(q) = query.q.as_deref() {
            let fields = [row.first_name.as_str(), row.email.as_str(), row.phone.as_str()];
            if !matches_query(q, &fields) {
                continue;
            }
        }
        if !matches_exact(query.section.as_deref(), &row.section)
            || !matches_exact(query.branch.as_deref(), &row.branch)
        {
            continue;
        }
        let profile: serde_json::Value = serde_json::from_str(&row.profile)?;
        teachers.push(json!({ "id": row.id, "teacher": profile }));
    }

    Ok(HttpResponse::Ok().json(teachers))
}

pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let conn = state.conn()?;
    let profile_json: Option<String> = conn
        .query_row(
            "SELECT profile FROM accounts WHERE role = 'teacher' AND id = ?",
            [&id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(profile_json) = profile_json else {
        return Err(ApiError::not_found("teacher not found"));
    };
    let profile: serde_json::Value = serde_json::from_str(&profile_json)?;
    Ok(HttpResponse::Ok().json(profile))
}
