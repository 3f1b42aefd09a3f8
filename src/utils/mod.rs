// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;
pub mod url;

pub use self::url::{https_url, resolve_url};
