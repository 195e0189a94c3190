mod delete_resource;
mod get_health;
mod get_metrics;
mod get_resource;
mod get_service_document;
mod post_resource;
mod put_resource;

use crate::state::ServerState;
use axum::{routing::get, Router};

pub use delete_resource::delete_resource;
pub use get_health::get_health;
pub use get_metrics::get_metrics;
pub use get_resource::get_resource;
pub use get_service_document::get_service_document;
pub use post_resource::post_resource;
pub use put_resource::put_resource;

pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_service_document))
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .route(
            "/:resource",
            get(get_resource)
                .post(post_resource)
                .put(put_resource)
                .patch(put_resource)
                .delete(delete_resource),
        )
        .with_state(state)
}
