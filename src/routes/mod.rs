//! HTTP surface. Every subtree shares the same [`SharedState`].

use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod games;
pub mod health;
pub mod roster;
pub mod teams;

/// Assemble the full API router around `state`.
pub fn router(state: SharedState) -> Router<()> {
    Router::new()
        .merge(health::router())
        .merge(games::router())
        .merge(roster::router())
        .merge(teams::router())
        .merge(docs::router())
        .with_state(state)
}
