use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::pkg::internal::{auth::ADMIN_EMAIL_HEADER, form::MAX_UPLOAD_BYTES};

pub fn build_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(ADMIN_EMAIL_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60));

    let admin = from_fn_with_state(state.clone(), authn::require_admin);

    Router::new()
        .route("/exec", get(handlers::exec::query).post(handlers::exec::perform))
        .route(
            "/jobs",
            get(handlers::jobs::list).merge(post(handlers::jobs::create).route_layer(admin.clone())),
        )
        .route(
            "/jobs/{id}",
            get(handlers::jobs::retrieve)
                .merge(delete(handlers::jobs::delete).route_layer(admin.clone())),
        )
        .route("/jobs/{id}/form", get(handlers::jobs::form))
        .route(
            "/jobs/{id}/applications",
            post(handlers::applications::submit)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 4))
                .merge(get(handlers::jobs::applications).route_layer(admin)),
        )
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .layer(cors)
        .with_state(state)
}
