//! # Core Module
//!
//! Configuration and shared Discord text helpers.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod embeds;
pub mod response;

pub use config::Config;
pub use response::{
    truncate_chars, truncate_for_embed, truncate_for_message, EMBED_LIMIT, MESSAGE_LIMIT,
};
