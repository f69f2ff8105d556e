//! JSON REST API for Sirat.
//!
//! Exposes an axum [`Router`] backed by any [`sirat_core::store::ProcedureStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sirat_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod feedback;
pub mod procedures;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use sirat_core::store::ProcedureStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ProcedureStore + 'static,
{
  Router::new()
    // Procedures
    .route(
      "/procedures",
      get(procedures::list::<S>).post(procedures::create::<S>),
    )
    .route("/procedures/popular", get(procedures::popular::<S>))
    .route("/procedures/stats", get(procedures::stats::<S>))
    .route(
      "/procedures/{id}",
      get(procedures::get_one::<S>)
        .patch(procedures::update::<S>)
        .delete(procedures::delete::<S>),
    )
    // Feedback
    .route("/feedback", post(feedback::submit::<S>))
    .route("/feedback/summary", get(feedback::summary::<S>))
    .with_state(store)
}
