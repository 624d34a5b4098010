//! Copies job-application confirmation emails from Gmail into a Google Sheet.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod gmail;
pub mod models;
pub mod normalize;
pub mod sheets;
pub mod sync;

pub use error::{Error, Result};
