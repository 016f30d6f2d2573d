//! GameFindr Engine library.
//!
//! This crate contains all server-side code for GameFindr profile lookups.
//!
//! ## Structure
//!
//! - `infrastructure/` - Platform adapters, registry, and configuration
//! - `use_cases/` - The profile lookup gateway
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
