//! Core library components.
//!
//! This module contains the reusable logic for template detection and
//! rendering, secret resolution and caching, and the batch file driver.

pub mod cache;
pub mod config;
pub mod constants;
pub mod diff;
pub mod driver;
pub mod interrupt;
pub mod resolver;
pub mod secret;
pub mod store;
pub mod template;
pub mod write;
