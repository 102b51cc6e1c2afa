// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, attempt, auth, catalog, reports},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, attempt, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Everything a logged-in user can reach: catalog browsing, the quiz
    // attempt flow, their own scores and summary.
    let user_routes = Router::new()
        .route("/subjects", get(catalog::list_subjects))
        .route("/subjects/{id}/chapters", get(catalog::list_chapters))
        .route("/chapters/{id}/quizzes", get(catalog::list_quizzes))
        .route("/quizzes", get(catalog::quiz_overview))
        .route(
            "/quizzes/{id}/attempt",
            get(attempt::start_attempt).post(attempt::submit_attempt),
        )
        .route("/quizzes/{id}/result", get(attempt::view_result))
        .route("/scores", get(attempt::list_scores))
        .route("/summary", get(reports::user_summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/subjects", post(admin::create_subject))
        .route("/subjects/{id}", delete(admin::delete_subject))
        .route("/subjects/{id}/chapters", post(admin::create_chapter))
        .route("/chapters/{id}", delete(admin::delete_chapter))
        .route("/chapters/{id}/quizzes", post(admin::create_quiz))
        .route("/quizzes/{id}", delete(admin::delete_quiz))
        .route(
            "/quizzes/{id}/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/questions/{id}",
            get(admin::view_question).delete(admin::delete_question),
        )
        .route("/summary", get(reports::admin_summary))
        .route("/search", get(reports::admin_search))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .merge(user_routes);

    Router::new()
        .nest("/api", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
