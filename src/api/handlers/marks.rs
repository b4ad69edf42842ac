use actix_web::{web, HttpResponse};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{
    coerce_semester, parse_semester, require, AppState, MarksQuery, PerformanceQuery,
};
use crate::model::MarkEntry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksPayload {
    alloted_registration_name: Option<String>,
    branch: Option<String>,
    semester: Option<serde_json::Value>,
    marks: Option<Vec<MarkEntry>>,
}

/// Marks for a student's semester. A record that was never saved reads as an
/// empty list, not as an error.
pub async fn get(
    state: web::Data<AppState>,
    query: web::Query<MarksQuery>,
) -> Result<HttpResponse, ApiError> {
    let registration = require(&query.alloted_registration_name, "allotedRegistrationName")?;
    let branch = require(&query.branch, "branch")?;
    let semester = parse_semester(require(&query.semester, "semester")?)?;

    let conn = state.conn()?;
    let marks_json: Option<String> = conn
        .query_row(
            "SELECT marks FROM marks WHERE registration = ? AND branch = ? AND semester = ?",
            (registration, branch, semester),
            |r| r.get(0),
        )
        .optional()?;

    let marks: Vec<MarkEntry> = match marks_json {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(json!({
        "allotedRegistrationName": registration,
        "branch": branch,
        "semester": semester,
        "marks": marks,
    })))
}

/// Full-document upsert keyed by (registration, branch, semester); the
/// incoming list replaces the stored one wholesale.
pub async fn save(
    state: web::Data<AppState>,
    body: web::Json<MarksPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    let registration = require(&payload.alloted_registration_name, "allotedRegistrationName")?
        .to_string();
    let branch = require(&payload.branch, "branch")?.to_string();
    let semester = match &payload.semester {
        Some(v) => coerce_semester(v)?,
        None => return Err(ApiError::bad_params("semester is required")),
    };
    let Some(marks) = payload.marks else {
        return Err(ApiError::bad_params("marks is required"));
    };

    let conn = state.conn()?;
    conn.execute(
        "INSERT INTO marks(registration, branch, semester, marks) VALUES(?, ?, ?, ?)
         ON CONFLICT(registration, branch, semester) DO UPDATE SET marks = excluded.marks",
        (&registration, &branch, semester, &serde_json::to_string(&marks)?),
    )?;

    tracing::info!(registration = %registration, branch = %branch, semester, "marks saved");
    Ok(HttpResponse::Ok().json(json!({
        "allotedRegistrationName": registration,
        "branch": branch,
        "semester": semester,
        "marks": marks,
    })))
}

/// A student's marks for a semester next to the semester topper's marks.
/// The topper is the record with the highest total of obtained marks; ties
/// go to the lowest registration identifier.
pub async fn performance(
    state: web::Data<AppState>,
    query: web::Query<PerformanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let registration = require(&query.reg, "reg")?;
    let semester = parse_semester(require(&query.sem, "sem")?)?;

    let conn = state.conn()?;
    let student_marks = load_student_marks(&conn, registration, semester)?;
    let records = load_semester_records(&conn, semester)?;
    let topper = pick_topper(&records);

    Ok(HttpResponse::Ok().json(json!({
        "studentMarks": student_marks,
        "topperMarks": topper.map(|(_, marks)| marks.clone()).unwrap_or_default(),
        "topperRegistration": topper.map(|(reg, _)| reg.clone()),
    })))
}

fn load_student_marks(
    conn: &Connection,
    registration: &str,
    semester: i64,
) -> Result<Vec<MarkEntry>, ApiError> {
    let marks_json: Option<String> = conn
        .query_row(
            "SELECT marks FROM marks WHERE registration = ? AND semester = ?
             ORDER BY branch LIMIT 1",
            (registration, semester),
            |r| r.get(0),
        )
        .optional()?;
    Ok(match marks_json {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    })
}

fn load_semester_records(
    conn: &Connection,
    semester: i64,
) -> Result<Vec<(String, Vec<MarkEntry>)>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT registration, marks FROM marks WHERE semester = ? ORDER BY registration",
    )?;
    let raw = stmt
        .query_map([semester], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(raw.len());
    for (registration, marks_json) in raw {
        let marks: Vec<MarkEntry> = serde_json::from_str(&marks_json)?;
        records.push((registration, marks));
    }
    Ok(records)
}

fn total_obtained(marks: &[MarkEntry]) -> f64 {
    marks.iter().map(|m| m.marks_obtained).sum()
}

/// Highest total wins; the input is ordered by registration, and only a
/// strictly larger total displaces the current best, so ties resolve to the
/// lowest registration.
fn pick_topper(records: &[(String, Vec<MarkEntry>)]) -> Option<&(String, Vec<MarkEntry>)> {
    let mut best: Option<&(String, Vec<MarkEntry>)> = None;
    for record in records {
        let better = match best {
            None => true,
            Some(current) => total_obtained(&record.1) > total_obtained(&current.1),
        };
        if better {
            best = Some(record);
        }
    }
    best
}
