//! Messaging State
//!
//! Local message sequences plus presence and typing sets, all mutated only by
//! relay events.

pub mod presence;
pub mod store;

pub use presence::{PresenceSet, TypingTracker};
pub use store::MessageStore;
