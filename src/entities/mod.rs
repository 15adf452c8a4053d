//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod campaign;
pub mod donation;
pub mod notification;
pub mod user;

// Re-export specific types to avoid conflicts
pub use campaign::{
    CampaignStatus, Column as CampaignColumn, Entity as Campaign, Model as CampaignModel,
};
pub use donation::{
    Column as DonationColumn, DonationStatus, Entity as Donation, Model as DonationModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
    NotificationKind,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserRole};
