//! Draft events and the decide/evolve execution helpers.

pub mod event;
pub mod handler;

pub use event::Event;
pub use handler::{execute, replay};
