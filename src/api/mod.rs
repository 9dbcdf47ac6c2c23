//! API module - HTTP routes, handlers, and models

pub mod admin;
pub mod canva_handlers;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod webhooks;
