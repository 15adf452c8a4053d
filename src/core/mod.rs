//! Core business logic, independent of the Discord layer.

/// Campaign creation, lifecycle and listing
pub mod campaign;
/// Donation recording, settlement and reversal
pub mod donation;
/// Live list queries driven by a change feed
pub mod live;
/// Notification email service client
pub mod mailer;
/// In-app notifications
pub mod notification;
/// Cursor pagination helpers
pub mod pagination;
/// Display formatting
pub mod report;
/// Donation aggregation
pub mod stats;
/// User accounts, roles and denormalized totals
pub mod user;
/// Form validators
pub mod validation;
