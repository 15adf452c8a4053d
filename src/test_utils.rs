//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating users, campaigns and donations with sensible defaults.

use crate::{
    config::settings::Settings,
    core::{
        campaign::{self, NewCampaign},
        donation::{self, NewDonation},
        user,
    },
    entities::{
        CampaignStatus, DonationStatus, UserRole, campaign as campaign_entity,
        donation as donation_entity, user as user_entity,
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The default category list.
pub fn test_categories() -> Vec<String> {
    Settings::default().categories
}

/// Registers a user named `Test User <id>` with email `<id>@example.com`.
pub async fn create_test_user(db: &DatabaseConnection, id: &str) -> Result<user_entity::Model> {
    user::register_user(db, id, &format!("Test User {id}"), &format!("{id}@example.com")).await
}

/// Registers a user and promotes them straight to admin.
pub async fn create_test_admin(db: &DatabaseConnection, id: &str) -> Result<user_entity::Model> {
    let created = create_test_user(db, id).await?;
    let mut active: user_entity::ActiveModel = created.into();
    active.role = Set(UserRole::Admin);
    Ok(active.update(db).await?)
}

/// Campaign form data with sensible defaults.
///
/// # Defaults
/// * `target_amount`: 1000.0
/// * `category`: "Health"
pub fn new_campaign(owner_id: &str, title: &str) -> NewCampaign {
    NewCampaign {
        title: title.to_string(),
        short_description: format!("{title} in brief"),
        description: format!("All about {title}"),
        target_amount: 1000.0,
        owner_id: owner_id.to_string(),
        category: "Health".to_string(),
        image_url: None,
        ends_at: None,
    }
}

/// Creates a draft campaign with [`new_campaign`] defaults.
pub async fn create_test_campaign(
    db: &DatabaseConnection,
    owner_id: &str,
    title: &str,
) -> Result<campaign_entity::Model> {
    campaign::create_campaign(db, new_campaign(owner_id, title), &test_categories()).await
}

/// Registers an owner and publishes a campaign with a 1000.0 target.
/// Returns the owner and the in-progress campaign.
pub async fn setup_with_active_campaign(
    db: &DatabaseConnection,
) -> Result<(user_entity::Model, campaign_entity::Model)> {
    let owner = create_test_user(db, "campaign_owner").await?;
    let draft = create_test_campaign(db, &owner.id, "Community Garden").await?;
    let published = campaign::publish_campaign(db, draft.id).await?;
    Ok((owner, published))
}

/// Records and settles a donation.
pub async fn create_completed_donation(
    db: &DatabaseConnection,
    campaign_id: i64,
    donor_id: &str,
    amount: f64,
) -> Result<donation_entity::Model> {
    let outcome = donation::donate(
        db,
        NewDonation {
            campaign_id,
            donor_id: donor_id.to_string(),
            amount,
            message: None,
            is_anonymous: false,
        },
    )
    .await?;
    Ok(outcome.donation)
}

/// An unsaved user row for pure tests.
pub fn sample_user_model(id: &str, display_name: &str) -> user_entity::Model {
    let now = Utc::now();
    user_entity::Model {
        id: id.to_string(),
        display_name: display_name.to_string(),
        email: format!("{id}@example.com"),
        role: UserRole::User,
        total_donated: 0.0,
        donation_count: 0,
        phone: None,
        bio: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// An unsaved in-progress campaign row for pure tests.
pub fn sample_campaign_model() -> campaign_entity::Model {
    let now = Utc::now();
    campaign_entity::Model {
        id: 1,
        title: "Sample Campaign".to_string(),
        short_description: "Sample".to_string(),
        description: "A sample campaign".to_string(),
        target_amount: 1000.0,
        donated_amount: 0.0,
        donor_count: 0,
        owner_id: "owner".to_string(),
        status: CampaignStatus::InProgress,
        category: "Health".to_string(),
        image_url: None,
        created_at: now,
        updated_at: now,
        ends_at: None,
    }
}

/// An unsaved completed donation row from `donor` to campaign 1.
pub fn sample_donation_model(id: i64, amount: f64) -> donation_entity::Model {
    let now = Utc::now();
    donation_entity::Model {
        id,
        campaign_id: 1,
        donor_id: "donor".to_string(),
        amount,
        message: None,
        is_anonymous: false,
        status: DonationStatus::Completed,
        created_at: now,
        completed_at: Some(now),
    }
}
