use actix_web::{web, HttpResponse};
use rusqlite::OptionalExtension;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{AppState, DirectoryQuery};

pub(super) struct DirectoryRow {
    pub id: String,
    pub first_name: String,
    pub registration: String,
    pub email: String,
    pub phone: String,
    pub section: String,
    pub branch: String,
    pub profile: String,
}

/// Case-insensitive substring match over the searchable directory fields.
pub(super) fn matches_query(q: &str, fields: &[&str]) -> bool {
    let needle = q.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Exact filter: absent means "don't filter".
pub(super) fn matches_exact(filter: Option<&str>, value: &str) -> bool {
    match filter {
        Some(expected) => value == expected,
        None => true,
    }
}

pub(super) fn load_directory(
    conn: &rusqlite::Connection,
    role: &str,
) -> Result<Vec<DirectoryRow>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, registration, email, phone, section, branch, profile
         FROM accounts WHERE role = ? ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([role], |r| {
            Ok(DirectoryRow {
                id: r.get(0)?,
                first_name: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                registration: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
                email: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
                phone: r.get::<_, Option<String>>(4)?.unwrap_or_default(),
                section: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
                branch: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
                profile: r.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<DirectoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = state.conn()?;
    let rows = load_directory(&conn, "student")?;

    let mut students = Vec::new();
    for row in rows {
        if let Some(q) = query.q.as_deref() {
            let fields = [
                row.first_name.as_str(),
                row.registration.as_str(),
                row.email.as_str(),
                row.phone.as_str(),
            ];
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
        students.push(json!({ "id": row.id, "student": profile }));
    }

    Ok(HttpResponse::Ok().json(students))
}

pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let conn = state.conn()?;
    let profile_json: Option<String> = conn
        .query_row(
            "SELECT profile FROM accounts WHERE role = 'student' AND id = ?",
            [&id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(profile_json) = profile_json else {
        return Err(ApiError::not_found("student not found"));
    };
    let profile: serde_json::Value = serde_json::from_str(&profile_json)?;
    Ok(HttpResponse::Ok().json(profile))
}
