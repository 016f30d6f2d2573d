//! Use cases - user story orchestration.

pub mod lookup;

pub use lookup::{LookupError, ProfileGateway};
