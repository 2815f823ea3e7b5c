//! Data models for the faculty directory portal.
//!
//! These models match the portal's wire format exactly for seamless
//! interoperability with the remote store and the cached snapshot.

mod aggregate;
mod department;
mod news;
mod professor;
mod user;

pub use aggregate::*;
pub use department::*;
pub use news::*;
pub use professor::*;
pub use user::*;
