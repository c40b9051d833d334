use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::api::handlers;
use crate::model::Collection;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    let mut router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check));

    for collection in Collection::ALL {
        router = router.nest(
            &format!("/{}", collection.name()),
            collection_routes::<S>(collection),
        );
    }

    router
}

/// The one CRUD route group, mounted once per collection. The mounted
/// collection rides along as an extension so the handlers stay generic.
fn collection_routes<S: Store + 'static>(collection: Collection) -> Router<Arc<S>> {
    Router::new()
        .route(
            "/",
            get(handlers::list_documents::<S>).post(handlers::create_document::<S>),
        )
        .route(
            "/:key",
            get(handlers::get_document::<S>)
                .put(handlers::replace_document::<S>)
                .patch(handlers::update_document::<S>)
                .delete(handlers::delete_document::<S>),
        )
        .layer(Extension(collection))
}
