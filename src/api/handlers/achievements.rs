use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AppState, RegQuery};
use crate::model::Achievement;

/// Description must carry some substance before it is worth listing.
const MIN_DESCRIPTION_LEN: usize = 20;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementPayload {
    #[serde(default)]
    title: String,
    #[serde(default)]
    certification: String,
    #[serde(default)]
    place: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    photo: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    student_name: String,
    #[serde(default)]
    alloted_registration_name: String,
}

fn validate(payload: &AchievementPayload, today: NaiveDate) -> Result<(), ApiError> {
    let required = [
        (payload.title.trim(), "title"),
        (payload.certification.trim(), "certification"),
        (payload.place.trim(), "place"),
        (payload.date.trim(), "date"),
        (payload.category.trim(), "category"),
    ];
    for (value, name) in required {
        if value.is_empty() {
            return Err(ApiError::bad_params(format!("{} is required", name)));
        }
    }
    if payload.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ApiError::bad_params(format!(
            "description must be at least {} characters",
            MIN_DESCRIPTION_LEN
        )));
    }
    let date = NaiveDate::parse_from_str(payload.date.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_params("date must be an ISO date (YYYY-MM-DD)"))?;
    if date > today {
        return Err(ApiError::bad_params("date must not be in the future"));
    }
    Ok(())
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<AchievementPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    validate(&payload, Utc::now().date_naive())?;

    let record = Achievement {
        id: Uuid::new_v4().to_string(),
        title: payload.title.trim().to_string(),
        certification: payload.certification.trim().to_string(),
        place: payload.place.trim().to_string(),
        date: payload.date.trim().to_string(),
        description: payload.description.trim().to_string(),
        photo: payload.photo,
        category: payload.category.trim().to_string(),
        student_name: payload.student_name,
        alloted_registration_name: payload.alloted_registration_name,
    };

    let conn = state.conn()?;
    conn.execute(
        "INSERT INTO achievements(
            id, title, certification, place, date, description, photo,
            category, student_name, registration
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &record.id,
            &record.title,
            &record.certification,
            &record.place,
            &record.date,
            &record.description,
            &record.photo,
            &record.category,
            &record.student_name,
            &record.alloted_registration_name,
        ),
    )?;

    tracing::info!(achievement = %record.id, "achievement posted");
    Ok(HttpResponse::Created().json(record))
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<RegQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = state.conn()?;

    let sql_all = "SELECT id, title, certification, place, date, description, photo,
                          category, student_name, registration
                   FROM achievements ORDER BY rowid";
    let sql_by_reg = "SELECT id, title, certification, place, date, description, photo,
                             category, student_name, registration
                      FROM achievements WHERE registration = ? ORDER BY rowid";

    let achievements = match query.reg.as_deref() {
        Some(reg) => {
            let mut stmt = conn.prepare(sql_by_reg)?;
            let rows = stmt.query_map([reg], read_achievement)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(sql_all)?;
            let rows = stmt.query_map([], read_achievement)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    Ok(HttpResponse::Ok().json(achievements))
}

fn read_achievement(r: &rusqlite::Row) -> rusqlite::Result<Achievement> {
    Ok(Achievement {
        id: r.get(0)?,
        title: r.get(1)?,
        certification: r.get(2)?,
        place: r.get(3)?,
        date: r.get(4)?,
        description: r.get(5)?,
        photo: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
        category: r.get(7)?,
        student_name: r.get::<_, Option<String>>(8)?.unwrap_or_default(),
        alloted_registration_name: r.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}
