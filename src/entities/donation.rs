//! Donation entity - A monetary contribution recorded against a campaign.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement state of a donation
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DonationStatus {
    /// Recorded but not yet settled
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled and counted in campaign and donor totals
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Rejected, never counted
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl DonationStatus {
    /// Stored value of this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::errors::Error::validation(
                "status",
                format!("'{other}' is not one of: pending, completed, failed"),
            )),
        }
    }
}

/// Donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    /// Unique identifier for the donation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Campaign receiving the donation
    pub campaign_id: i64,
    /// User id of the donor
    pub donor_id: String,
    /// Donated amount in dollars
    pub amount: f64,
    /// Optional note from the donor to the campaign owner
    pub message: Option<String>,
    /// Hide the donor's name from everyone but admins
    pub is_anonymous: bool,
    /// Settlement state
    pub status: DonationStatus,
    /// When the donation was recorded
    pub created_at: DateTimeUtc,
    /// When the donation settled
    pub completed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Donation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each donation belongs to one campaign
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id"
    )]
    Campaign,
    /// Each donation is made by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DonorId",
        to = "super::user::Column::Id"
    )]
    Donor,
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
