//! The in-memory object graph a build consumes.
//!
//! Everything here is plain data deserialized from the site's TOML files. The
//! only fields a build derives are the `featured` flags on projects and
//! packages, which [`crate::featured`] recomputes in full on every run.

mod identity;
mod content;
mod career;
mod site;

pub use identity::*;
pub use content::*;
pub use career::*;
pub use site::*;
