//! tkino: terminal admin console for a movie catalogue served by a
//! Xano-style REST backend.
//!
//! Every resource (actors, genres, movies and the join tables between them)
//! is described by a declarative entry in an embedded catalogue; one generic
//! [`controller::ResourceController`] drives listing, searching, creating,
//! editing and deleting for all of them.

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod event;
pub mod notification;
pub mod resource;
pub mod ui;

/// Version injected at compile time via TKINO_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TKINO_VERSION") {
    Some(v) => v,
    None => "dev",
};
