//! Canva integration - OAuth PKCE helpers, REST client and token cache

pub mod client;
pub mod pkce;
pub mod redirect;
pub mod tokens;
pub mod webhook;

pub use client::{
    CanvaClient, CodeExchange, CreateDesignPayload, HttpCanvaClient, TokenRefresh, TokenResponse,
};
pub use tokens::TokenCache;
