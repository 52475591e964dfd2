//! cvn-session
//!
//! The session core: command handling, store orchestration, and the state
//! projector that fans consolidated snapshots out to every subscriber.
//!
//! Flow: caller intent → command (eligibility gate) → store mutation → store
//! emits new state → projector recomputes → consolidated [`AppSnapshot`] →
//! all subscribers. Commands are synchronous fire-and-forget; results
//! surface only through the next snapshot and/or a transient [`UiEvent`].

pub mod config;
pub mod snapshot;

mod projector;
mod session;

pub use config::SessionConfig;
pub use session::Session;
pub use snapshot::{AdminView, AppSnapshot, ClientView, ExecutorView, ModeratorView};
