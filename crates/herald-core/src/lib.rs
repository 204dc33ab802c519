//! # herald-core
//!
//! Core types, traits, configuration, and error handling for the Herald
//! channel-posting assistant.

pub mod access;
pub mod config;
pub mod draft;
pub mod error;
pub mod event;
pub mod keyboard;
pub mod traits;
pub mod wizard;
