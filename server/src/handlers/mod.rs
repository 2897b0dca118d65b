//! Request handlers for admin and live form operations.
//!
//! Handlers are synchronous and take the engine directly; routes run them
//! through [`blocking`](crate::blocking).

mod actions;
mod listing;
mod live;

pub use actions::*;
pub use listing::*;
pub use live::*;
