use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{cache::PageCache, invoices, sign_in};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub cache: Arc<PageCache>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
            cache: Arc::new(PageCache::new()),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/dashboard/invoices",
            get(invoices::list).post(invoices::create),
        )
        .route("/dashboard/invoices/{id}", post(invoices::update))
        .route("/dashboard/invoices/{id}/edit", get(invoices::edit_page))
        .route("/dashboard/invoices/{id}/delete", post(invoices::delete))
        .route("/login", post(sign_in::login))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}
