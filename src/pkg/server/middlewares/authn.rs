use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{
    pkg::server::state::AppState,
    prelude::{Error, Result},
};

pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    match state.admin.check(&headers) {
        Some(admin) => {
            tracing::debug!("admin {} authenticated", &admin.email);
            request.extensions_mut().insert(Arc::new(admin));
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("admin credentials missing, request denied");
            Err(Error::Unauthorized)
        }
    }
}
