mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use types::AppState;

use actix_web::{web, HttpResponse};
use serde_json::json;

/// Route table for the whole API surface. Mounted under `/api` to match the
/// paths the dashboards call.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::accounts::health))
            .route("/register", web::post().to(handlers::accounts::register_student))
            .route(
                "/register-teacher",
                web::post().to(handlers::accounts::register_teacher),
            )
            .route(
                "/register-admin",
                web::post().to(handlers::accounts::register_admin),
            )
            .route("/login", web::post().to(handlers::accounts::login))
            .route("/logout", web::post().to(handlers::accounts::logout))
            .route("/session", web::get().to(handlers::accounts::session))
            .route("/students", web::get().to(handlers::students::list))
            .route(
                "/students",
                web::post().to(handlers::accounts::register_student),
            )
            .route("/students/{id}", web::get().to(handlers::students::get))
            .route("/teachers", web::get().to(handlers::teachers::list))
            .route("/teachers/{id}", web::get().to(handlers::teachers::get))
            .route("/events", web::get().to(handlers::events::list))
            .route("/events", web::post().to(handlers::events::create))
            .route("/events/{id}", web::put().to(handlers::events::update))
            .route(
                "/events/{id}/register",
                web::post().to(handlers::events::register),
            )
            .route(
                "/achievements",
                web::get().to(handlers::achievements::list),
            )
            .route(
                "/achievements",
                web::post().to(handlers::achievements::create),
            )
            .route("/subjects", web::get().to(handlers::subjects::get))
            .route("/subjects", web::post().to(handlers::subjects::save))
            .route("/marks", web::get().to(handlers::marks::get))
            .route("/marks", web::post().to(handlers::marks::save))
            .route("/performance", web::get().to(handlers::marks::performance)),
    );
}

/// Body deserialization failures answer with the same `{"error": ...}` shape
/// as handler-level validation.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    })
}
