//! Application services layer.

pub mod admin;
pub mod auth;
pub mod editor;
pub mod error;
pub mod feed;
pub mod guard;
pub mod repos;
pub mod share;
pub mod site;
