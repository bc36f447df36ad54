//! Web-facing layer: the axum JSON API over the shared game store.

pub mod api;
