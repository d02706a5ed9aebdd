//! Collection Gaps Library
//!
//! Finds movies missing from the film collections you partly own, by
//! comparing Plex movie libraries against TMDB collections.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
