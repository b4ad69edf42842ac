use actix_web::{web, HttpResponse};
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AppState, RegQuery};
use crate::model::EventRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    end_date: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    registration_deadline: String,
    #[serde(default)]
    registered_students: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventRegistration {
    reg: Option<String>,
}

struct EventRow {
    id: String,
    title: String,
    date: String,
    end_date: String,
    location: String,
    description: String,
    image: String,
    registration_deadline: String,
    registered_raw: String,
}

const EVENT_COLUMNS: &str =
    "id, title, date, end_date, location, description, image, registration_deadline, registered";

fn row_to_event(row: EventRow) -> Result<EventRecord, ApiError> {
    let registered: Vec<String> = serde_json::from_str(&row.registered_raw)?;
    Ok(EventRecord {
        id: row.id,
        title: row.title,
        date: row.date,
        end_date: row.end_date,
        location: row.location,
        description: row.description,
        image: row.image,
        registration_deadline: row.registration_deadline,
        registered_students: registered,
    })
}

fn read_row(r: &rusqlite::Row) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: r.get(0)?,
        title: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
        date: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
        end_date: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
        location: r.get::<_, Option<String>>(4)?.unwrap_or_default(),
        description: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
        image: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
        registration_deadline: r.get::<_, Option<String>>(7)?.unwrap_or_default(),
        registered_raw: r.get(8)?,
    })
}

fn load_event(conn: &Connection, id: &str) -> Result<Option<EventRecord>, ApiError> {
    use rusqlite::OptionalExtension;
    let row = conn
        .query_row(
            &format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS),
            [id],
            read_row,
        )
        .optional()?;
    match row {
        Some(row) => Ok(Some(row_to_event(row)?)),
        None => Ok(None),
    }
}

fn store_event(conn: &Connection, event: &EventRecord) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO events(
            id, title, date, end_date, location, description, image,
            registration_deadline, registered
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            date = excluded.date,
            end_date = excluded.end_date,
            location = excluded.location,
            description = excluded.description,
            image = excluded.image,
            registration_deadline = excluded.registration_deadline,
            registered = excluded.registered",
        (
            &event.id,
            &event.title,
            &event.date,
            &event.end_date,
            &event.location,
            &event.description,
            &event.image,
            &event.registration_deadline,
            &serde_json::to_string(&event.registered_students)?,
        ),
    )?;
    Ok(())
}

/// Keeps first occurrence order while dropping repeats.
fn dedupe(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Overlays fields present in the patch onto the stored event. Absent keys
/// keep their stored values; a supplied registered list replaces the set.
fn apply_patch(event: &mut EventRecord, patch: &serde_json::Value) {
    fn patch_str(target: &mut String, patch: &serde_json::Value, key: &str) {
        if let Some(v) = patch.get(key).and_then(|v| v.as_str()) {
            *target = v.to_string();
        }
    }
    patch_str(&mut event.title, patch, "title");
    patch_str(&mut event.date, patch, "date");
    patch_str(&mut event.end_date, patch, "endDate");
    patch_str(&mut event.location, patch, "location");
    patch_str(&mut event.description, patch, "description");
    patch_str(&mut event.image, patch, "image");
    patch_str(&mut event.registration_deadline, patch, "registrationDeadline");

    if let Some(arr) = patch.get("registeredStudents").and_then(|v| v.as_array()) {
        event.registered_students = dedupe(
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string)),
        );
    }
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<RegQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = state.conn()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM events ORDER BY rowid",
        EVENT_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row_to_event(row)?);
    }
    if let Some(reg) = query.reg.as_deref() {
        events.retain(|e| e.registered_students.iter().any(|r| r == reg));
    }

    Ok(HttpResponse::Ok().json(events))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<EventPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    let event = EventRecord {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        date: payload.date,
        end_date: payload.end_date,
        location: payload.location,
        description: payload.description,
        image: payload.image,
        registration_deadline: payload.registration_deadline,
        registered_students: dedupe(payload.registered_students),
    };

    let conn = state.conn()?;
    store_event(&conn, &event)?;
    tracing::info!(event = %event.id, "event created");
    Ok(HttpResponse::Created().json(event))
}

pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let conn = state.conn()?;
    let Some(mut event) = load_event(&conn, &id)? else {
        return Err(ApiError::not_found("event not found"));
    };

    apply_patch(&mut event, &body);
    store_event(&conn, &event)?;
    Ok(HttpResponse::Ok().json(event))
}

/// Adds a student's registration identifier to the event's registered set.
/// Registering twice is a no-op; the list never holds duplicates.
pub async fn register(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<EventRegistration>,
) -> Result<HttpResponse, ApiError> {
    let reg = match body.reg.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => return Err(ApiError::bad_params("registration number required")),
    };

    let id = path.into_inner();
    let conn = state.conn()?;
    let Some(mut event) = load_event(&conn, &id)? else {
        return Err(ApiError::not_found("event not found"));
    };

    if !event.registered_students.iter().any(|r| *r == reg) {
        event.registered_students.push(reg);
        store_event(&conn, &event)?;
    }

    Ok(HttpResponse::Ok().json(event))
}
