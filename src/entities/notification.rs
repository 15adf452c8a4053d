//! Notification entity - An in-app message for a user, optionally pointing at
//! the campaign or donation that triggered it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggered a notification
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationKind {
    /// Sent to a campaign owner when a donation settles
    #[sea_orm(string_value = "donation_received")]
    DonationReceived,
    /// Sent to a donor when their donation settles
    #[sea_orm(string_value = "donation_confirmed")]
    DonationConfirmed,
    /// Sent to a campaign owner when the target is reached
    #[sea_orm(string_value = "campaign_completed")]
    CampaignCompleted,
    /// Sent to a campaign owner when an admin changes the status
    #[sea_orm(string_value = "campaign_status_changed")]
    CampaignStatusChanged,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DonationReceived => "donation_received",
            Self::DonationConfirmed => "donation_confirmed",
            Self::CampaignCompleted => "campaign_completed",
            Self::CampaignStatusChanged => "campaign_status_changed",
        })
    }
}

/// Notification database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient user id
    pub user_id: String,
    /// Trigger type
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Message body
    pub body: String,
    /// Whether the recipient has seen it
    pub is_read: bool,
    /// Related campaign, if any
    pub campaign_id: Option<i64>,
    /// Related donation, if any
    pub donation_id: Option<i64>,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each notification belongs to one recipient
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
