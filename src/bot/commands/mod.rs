//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Account registration and profile commands
pub mod account;

/// Admin panel commands
pub mod admin;

/// Campaign browsing and owner management commands
pub mod campaign;

/// Donation, history and statistics commands
pub mod donation;

/// General utility commands
pub mod general;

/// Live list commands
pub mod live;

/// Notification commands
pub mod notification;

// Export commands
pub use account::*;
pub use admin::*;
pub use campaign::*;
pub use donation::*;
pub use general::*;
pub use live::*;
pub use notification::*;
