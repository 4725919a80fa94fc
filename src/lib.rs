//! ClothAI API Relay library
//!
//! Modules:
//! - `api`: Axum HTTP handlers, router setup, and the OpenAPI document.
//! - `imgbb`: Thin client for the ImgBB image-hosting API.
//! - `eachlabs`: Thin client for the EachLabs flow API, including the
//!   bounded execution-status polling loop.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `ImgbbClient`, and
//! `EachlabsClient`.
pub mod api;
pub mod config;
pub mod eachlabs;
pub mod error;
pub mod imgbb;

pub use config::Config;
pub use eachlabs::client::EachlabsClient;
pub use imgbb::client::ImgbbClient;
