//! Notifications
//!
//! Cached notification list, toasts, and the projector that feeds both.

pub mod cache;
pub mod projector;
pub mod toast;

pub use cache::{QueryCache, NOTIFICATIONS_KEY};
pub use projector::{NotificationProjector, Projection};
pub use toast::{Toast, ToastQueue};
