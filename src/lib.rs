//! Date-bounded sweep of a news site's search results.
//!
//! See `main.rs` for the run order. Modules are public so the stages can be
//! driven with other [`session::BrowsingSession`] implementations.

pub mod classify;
pub mod cli;
pub mod dates;
pub mod error;
pub mod extract;
pub mod models;
pub mod outputs;
pub mod pagination;
pub mod pipeline;
pub mod run;
pub mod session;
pub mod utils;
