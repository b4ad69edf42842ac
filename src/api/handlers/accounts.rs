use actix_web::{web, HttpResponse};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{require, AppState, TokenQuery};
use crate::auth;
use crate::model::{AdminProfile, Role, StudentProfile, TeacherProfile};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRegistration {
    #[serde(flatten)]
    profile: StudentProfile,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRegistration {
    #[serde(flatten)]
    profile: TeacherProfile,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistration {
    #[serde(flatten)]
    profile: AdminProfile,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    email_or_phone: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    token: Option<String>,
}

pub async fn health(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    // Touch the store so health reflects an openable database.
    let conn = state.conn()?;
    let accounts: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))?;
    Ok(HttpResponse::Ok().json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "accounts": accounts,
    })))
}

pub async fn register_student(
    state: web::Data<AppState>,
    body: web::Json<StudentRegistration>,
) -> Result<HttpResponse, ApiError> {
    let reg = body.profile.alloted_registration_name.trim().to_string();
    if reg.is_empty() {
        return Err(ApiError::bad_params("allotedRegistrationName is required"));
    }
    check_credentials(&body.password, body.confirm_password.as_deref())?;

    let conn = state.conn()?;
    let taken: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM accounts WHERE registration = ?",
            [&reg],
            |r| r.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(ApiError::conflict(
            "user is already registered with this registration number",
        ));
    }

    let mut profile = body.profile.clone();
    profile.alloted_registration_name = reg.clone();
    let id = insert_account(
        &conn,
        Role::Student,
        Some(&reg),
        &profile.gmail,
        &profile.phone_number,
        &profile.branch,
        &profile.section,
        &profile.first_name,
        &body.password,
        &serde_json::to_string(&profile)?,
    )?;

    tracing::info!(account = %id, "student registered");
    Ok(HttpResponse::Created().json(json!({ "message": "student registered successfully" })))
}

pub async fn register_teacher(
    state: web::Data<AppState>,
    body: web::Json<TeacherRegistration>,
) -> Result<HttpResponse, ApiError> {
    check_credentials(&body.password, body.confirm_password.as_deref())?;

    let conn = state.conn()?;
    let profile = &body.profile;
    let id = insert_account(
        &conn,
        Role::Teacher,
        None,
        &profile.gmail,
        &profile.phone_number,
        &profile.branch,
        &profile.section,
        &profile.first_name,
        &body.password,
        &serde_json::to_string(profile)?,
    )?;

    tracing::info!(account = %id, "teacher registered");
    Ok(HttpResponse::Created().json(json!({ "message": "teacher registered successfully" })))
}

pub async fn register_admin(
    state: web::Data<AppState>,
    body: web::Json<AdminRegistration>,
) -> Result<HttpResponse, ApiError> {
    check_credentials(&body.password, body.confirm_password.as_deref())?;

    let conn = state.conn()?;
    let profile = &body.profile;
    let id = insert_account(
        &conn,
        Role::Admin,
        None,
        &profile.gmail,
        &profile.phone_number,
        "",
        "",
        &profile.first_name,
        &body.password,
        &serde_json::to_string(profile)?,
    )?;

    tracing::info!(account = %id, "admin registered");
    Ok(HttpResponse::Created().json(json!({ "message": "admin registered successfully" })))
}

/// Tries admin, then student, then teacher; the first account of a role
/// matching the email or phone is the only candidate for that role. On
/// success the response carries a session token plus the profile under its
/// role key, credentials stripped.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let identity = body.email_or_phone.trim();
    if identity.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_params("emailOrPhone and password are required"));
    }

    let conn = state.conn()?;
    for role in Role::login_order() {
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT id, password_salt, password_hash, profile
                 FROM accounts
                 WHERE role = ?1 AND (email = ?2 OR phone = ?2)
                 ORDER BY rowid LIMIT 1",
                (role.as_str(), identity),
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .optional()?;

        let Some((account_id, salt, hash, profile_json)) = row else {
            continue;
        };
        if !auth::verify_password(&salt, &hash, &body.password) {
            continue;
        }

        let now = Utc::now();
        conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?",
            [&now.to_rfc3339()],
        )?;

        let token = auth::new_token();
        conn.execute(
            "INSERT INTO sessions(token, account_id, role, created_at, expires_at)
             VALUES(?, ?, ?, ?, ?)",
            (
                &token,
                &account_id,
                role.as_str(),
                &now.to_rfc3339(),
                &auth::session_expiry(now).to_rfc3339(),
            ),
        )?;

        let profile: serde_json::Value = serde_json::from_str(&profile_json)?;
        let mut response = serde_json::Map::new();
        response.insert("token".to_string(), json!(token));
        response.insert(role.as_str().to_string(), profile);

        tracing::info!(account = %account_id, role = role.as_str(), "login");
        return Ok(HttpResponse::Ok().json(serde_json::Value::Object(response)));
    }

    Err(ApiError::bad_params("user not found or incorrect password"))
}

pub async fn logout(
    state: web::Data<AppState>,
    body: web::Json<LogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = require(&body.token, "token")?;
    let conn = state.conn()?;
    conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
    Ok(HttpResponse::Ok().json(json!({ "message": "logged out" })))
}

/// Resolves a session token back to its role and profile. Expired sessions
/// are dropped on sight and answer like unknown tokens.
pub async fn session(
    state: web::Data<AppState>,
    query: web::Query<TokenQuery>,
) -> Result<HttpResponse, ApiError> {
    let token = require(&query.token, "token")?;
    let conn = state.conn()?;

    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT account_id, role, expires_at FROM sessions WHERE token = ?",
            [token],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((account_id, role_str, expires_at)) = row else {
        return Err(ApiError::not_found("session not found or expired"));
    };

    if auth::session_expired(&expires_at, Utc::now()) {
        conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
        return Err(ApiError::not_found("session not found or expired"));
    }

    let Some(role) = Role::parse(&role_str) else {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "unknown role in session row"
        )));
    };

    let profile_json: String = conn.query_row(
        "SELECT profile FROM accounts WHERE id = ?",
        [&account_id],
        |r| r.get(0),
    )?;
    let profile: serde_json::Value = serde_json::from_str(&profile_json)?;

    let mut response = serde_json::Map::new();
    response.insert("role".to_string(), json!(role.as_str()));
    response.insert(role.as_str().to_string(), profile);
    Ok(HttpResponse::Ok().json(serde_json::Value::Object(response)))
}

fn check_credentials(password: &str, confirm: Option<&str>) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::bad_params("password is required"));
    }
    if let Some(confirm) = confirm {
        if confirm != password {
            return Err(ApiError::bad_params("passwords do not match"));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn insert_account(
    conn: &Connection,
    role: Role,
    registration: Option<&str>,
    email: &str,
    phone: &str,
    branch: &str,
    section: &str,
    first_name: &str,
    password: &str,
    profile_json: &str,
) -> Result<String, ApiError> {
    let id = Uuid::new_v4().to_string();
    let salt = auth::new_salt();
    let hash = auth::hash_password(&salt, password);
    conn.execute(
        "INSERT INTO accounts(
            id, role, registration, email, phone, branch, section, first_name,
            password_salt, password_hash, profile, created_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &id,
            role.as_str(),
            registration,
            email,
            phone,
            branch,
            section,
            first_name,
            &salt,
            &hash,
            profile_json,
            &Utc::now().to_rfc3339(),
        ),
    )?;
    Ok(id)
}
