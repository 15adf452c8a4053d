//! Unified error type for the donation tracker.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Variants are
//! struct-like so callers can match on the offending value, and the `Display`
//! text is what the bot shows to users when a command fails.

use crate::entities::campaign::CampaignStatus;
use thiserror::Error;

/// All errors produced by the core, config and bot layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or was invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A form field failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable explanation
        message: String,
    },

    /// A monetary amount was zero, negative, non-finite or out of range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// No user with this id
    #[error("User not found: {id}")]
    UserNotFound {
        /// The user id that was looked up
        id: String,
    },

    /// A user with this id is already registered
    #[error("User already registered: {id}")]
    UserAlreadyExists {
        /// The duplicate user id
        id: String,
    },

    /// No campaign with this id or title
    #[error("Campaign not found: {id}")]
    CampaignNotFound {
        /// Campaign id or title that was looked up
        id: String,
    },

    /// No donation with this id
    #[error("Donation not found: {id}")]
    DonationNotFound {
        /// The donation id that was looked up
        id: i64,
    },

    /// No notification with this id for the requesting user
    #[error("Notification not found: {id}")]
    NotificationNotFound {
        /// The notification id that was looked up
        id: i64,
    },

    /// Campaign lifecycle only moves forward
    #[error("Cannot move campaign from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: CampaignStatus,
        /// Requested status
        to: CampaignStatus,
    },

    /// Donations are only accepted while a campaign is in progress
    #[error("Campaign {id} is {status} and is not accepting donations")]
    CampaignNotAcceptingDonations {
        /// Campaign id
        id: i64,
        /// Current status
        status: CampaignStatus,
    },

    /// Completed or ended campaigns can no longer be edited
    #[error("Campaign {id} is {status} and can no longer be changed")]
    CampaignClosed {
        /// Campaign id
        id: i64,
        /// Current status
        status: CampaignStatus,
    },

    /// A campaign that already received donations cannot be deleted
    #[error("Campaign {id} has {count} donation(s) and cannot be deleted")]
    CampaignHasDonations {
        /// Campaign id
        id: i64,
        /// Number of donation records
        count: u64,
    },

    /// Only pending donations can be completed or failed
    #[error("Donation {id} is no longer pending")]
    DonationNotPending {
        /// Donation id
        id: i64,
    },

    /// Admins cannot delete their own account from the admin panel
    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    /// The caller lacks the role or ownership required
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// What was refused
        message: String,
    },

    /// A live query's background task has stopped
    #[error("Live subscription closed")]
    SubscriptionClosed,

    /// The notification email service rejected the request
    #[error("Mail service error: {message}")]
    Mail {
        /// Status or body returned by the service
        message: String,
    },

    /// HTTP client failure talking to the mail service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting failure while building a reply
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Integer conversion overflowed
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error
    #[error("Discord framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
