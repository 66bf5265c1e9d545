mod communities;

use axum::Router;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

pub use self::communities::{CommunityView, PostView};
use super::SharedState;
use super::error::RequestError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RequestError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

pub fn route_handler(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/communities", communities::router())
        .with_state(state)
}
