//! User entity - A registered donor, campaign owner or administrator.
//!
//! The primary key is the external (Discord) user id. Donation totals are
//! denormalized onto the row and kept in step by the donation workflow.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role that decides whether a user may open the admin panel
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    /// Regular donor or campaign owner
    #[sea_orm(string_value = "user")]
    User,
    /// Administrator
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Stored value of this role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(crate::errors::Error::validation(
                "role",
                format!("'{other}' is not one of: user, admin"),
            )),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Discord user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name shown on donations and campaigns
    pub display_name: String,
    /// Contact address for receipts, stored lowercased
    pub email: String,
    /// Access role
    pub role: UserRole,
    /// Sum of all completed donations made by this user
    pub total_donated: f64,
    /// Number of completed donations made by this user
    pub donation_count: i64,
    /// Optional phone number
    pub phone: Option<String>,
    /// Optional short biography
    pub bio: Option<String>,
    /// Soft delete flag - deleted users are hidden but their donations stay on record
    pub is_deleted: bool,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the profile was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many campaigns
    #[sea_orm(has_many = "super::campaign::Entity")]
    Campaigns,
    /// One user makes many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
    /// One user receives many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaigns.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
