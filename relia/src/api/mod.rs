mod handlers;
mod state;

pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/reports", post(handlers::create_reports))
        .route("/reviews:parse", post(handlers::parse_reviews));

    Router::new()
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
