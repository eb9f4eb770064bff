//! BagusBlog: a small personal blog served by axum.
//!
//! The public surface lists and renders posts; the admin surface lets a
//! single signed-in operator create, edit and delete them. Persistence,
//! identity and image storage are delegated to a hosted backend reached
//! through [`infra::backend::BackendClient`].

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
