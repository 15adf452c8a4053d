//! Campaign entity - A fundraising effort with a target amount and lifecycle status.
//!
//! `donated_amount` and `donor_count` are running totals maintained by the
//! donation workflow, never edited directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Campaign lifecycle. Transitions only move forward:
/// `Draft -> InProgress -> Completed | Ended`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CampaignStatus {
    /// Being prepared by its owner, not visible to donors
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Published and accepting donations
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Reached its target amount
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Closed by its owner or an admin
    #[sea_orm(string_value = "ended")]
    Ended,
}

impl CampaignStatus {
    /// Stored value of this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Ended => "ended",
        }
    }

    /// Whether the campaign can no longer change status
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Ended)
    }

    /// Whether moving from `self` to `next` respects the one-way lifecycle
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::InProgress)
                | (Self::InProgress, Self::Completed | Self::Ended)
        )
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "draft" => Ok(Self::Draft),
            "in_progress" | "active" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "ended" => Ok(Self::Ended),
            other => Err(crate::errors::Error::validation(
                "status",
                format!("'{other}' is not one of: draft, in_progress, completed, ended"),
            )),
        }
    }
}

/// Campaign database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    /// Unique identifier for the campaign
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Headline shown in lists
    pub title: String,
    /// One-line summary
    pub short_description: String,
    /// Full description
    pub description: String,
    /// Amount the campaign is trying to raise
    pub target_amount: f64,
    /// Running sum of completed donations
    pub donated_amount: f64,
    /// Number of completed donations
    pub donor_count: i64,
    /// User id of the owner
    pub owner_id: String,
    /// Lifecycle status
    pub status: CampaignStatus,
    /// Category used for filtering (e.g. "Health", "Education")
    pub category: String,
    /// Cover image hosted elsewhere
    pub image_url: Option<String>,
    /// When the campaign was created
    pub created_at: DateTimeUtc,
    /// When the campaign was last modified
    pub updated_at: DateTimeUtc,
    /// Optional closing date
    pub ends_at: Option<DateTimeUtc>,
}

/// Defines relationships between Campaign and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each campaign belongs to one owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    /// One campaign has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
