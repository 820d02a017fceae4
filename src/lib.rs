//! Qishui song page extraction library and server.

pub mod api;
pub mod extract;
pub mod fetch;
pub mod models;
