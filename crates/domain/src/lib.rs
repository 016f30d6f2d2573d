//! GameFindr domain types.
//!
//! Pure data shared across the engine: the platform enumeration, the
//! normalized [`Profile`] record every adapter produces, and the display
//! formatting helpers the adapters share. No I/O lives here.

pub mod error;
pub mod format;
pub mod platform;
pub mod profile;

pub use error::DomainError;
pub use platform::Platform;
pub use profile::{Profile, ProfileBuilder, StatValue};
