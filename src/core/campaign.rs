//! Campaign business logic - creation, editing, lifecycle and listing.
//!
//! Status only moves forward (`draft -> in_progress -> completed | ended`).
//! `donated_amount` and `donor_count` are running totals changed solely by the
//! donation workflow through [`apply_completed_donation`] and
//! [`revert_completed_donation`].

use crate::{
    core::{
        notification::{self, NewNotification},
        pagination::{self, Page, PageRequest},
        report, user, validation,
    },
    entities::{Campaign, CampaignStatus, Donation, NotificationKind, campaign, donation},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::info;

/// Data for a campaign about to be created
#[derive(Debug, Clone)]
pub struct NewCampaign {
    /// Headline
    pub title: String,
    /// One-line summary
    pub short_description: String,
    /// Full description
    pub description: String,
    /// Amount to raise
    pub target_amount: f64,
    /// Owner user id
    pub owner_id: String,
    /// Category, matched against the configured list
    pub category: String,
    /// Cover image URL
    pub image_url: Option<String>,
    /// Optional closing date
    pub ends_at: Option<DateTime<Utc>>,
}

/// Editable campaign fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CampaignUpdate {
    /// New headline
    pub title: Option<String>,
    /// New summary
    pub short_description: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New target amount
    pub target_amount: Option<f64>,
    /// New category
    pub category: Option<String>,
    /// New cover image URL; empty string clears it
    pub image_url: Option<String>,
    /// New closing date
    pub ends_at: Option<DateTime<Utc>>,
}

/// Which campaigns a list or live query returns. Empty filter means all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignFilter {
    /// Only this status
    pub status: Option<CampaignStatus>,
    /// Only campaigns owned by this user
    pub owner_id: Option<String>,
    /// Only this category
    pub category: Option<String>,
}

impl CampaignFilter {
    /// Filter for campaigns currently accepting donations
    #[must_use]
    pub fn active() -> Self {
        Self {
            status: Some(CampaignStatus::InProgress),
            ..Self::default()
        }
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = self.status {
            condition = condition.add(campaign::Column::Status.eq(status));
        }
        if let Some(owner_id) = &self.owner_id {
            condition = condition.add(campaign::Column::OwnerId.eq(owner_id.as_str()));
        }
        if let Some(category) = &self.category {
            condition = condition.add(campaign::Column::Category.eq(category.as_str()));
        }
        condition
    }
}

/// Creates a campaign in `Draft` status after validating its fields.
pub async fn create_campaign(
    db: &DatabaseConnection,
    new: NewCampaign,
    categories: &[String],
) -> Result<campaign::Model> {
    let title = validation::validate_title(&new.title)?;
    let short_description = validation::validate_summary(&new.short_description)?;
    let description = validation::validate_description(&new.description)?;
    let target_amount = validation::validate_target_amount(new.target_amount)?;
    let category = validation::validate_category(&new.category, categories)?;

    user::require_user(db, &new.owner_id).await?;

    let now = Utc::now();
    let model = campaign::ActiveModel {
        title: Set(title),
        short_description: Set(short_description),
        description: Set(description),
        target_amount: Set(target_amount),
        donated_amount: Set(0.0),
        donor_count: Set(0),
        owner_id: Set(new.owner_id),
        status: Set(CampaignStatus::Draft),
        category: Set(category),
        image_url: Set(new.image_url.filter(|url| !url.trim().is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
        ends_at: Set(new.ends_at),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!(campaign_id = result.id, title = %result.title, "Created campaign");
    Ok(result)
}

/// Finds a campaign by its id.
pub async fn get_campaign_by_id(
    db: &DatabaseConnection,
    campaign_id: i64,
) -> Result<Option<campaign::Model>> {
    Campaign::find_by_id(campaign_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a campaign by its id, failing with [`Error::CampaignNotFound`].
pub async fn require_campaign(db: &DatabaseConnection, campaign_id: i64) -> Result<campaign::Model> {
    get_campaign_by_id(db, campaign_id)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: campaign_id.to_string(),
        })
}

/// Finds the most recent campaign with this title, ignoring case.
pub async fn find_campaign_by_title(
    db: &DatabaseConnection,
    title: &str,
) -> Result<Option<campaign::Model>> {
    use sea_orm::sea_query::{Expr, Func};

    Campaign::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(campaign::Column::Title)))
                .eq(title.trim().to_lowercase()),
        )
        .order_by_desc(campaign::Column::CreatedAt)
        .order_by_desc(campaign::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies an edit to a campaign that is still a draft or in progress.
///
/// The write is guarded on the status and, when the target changes, on the
/// amount donated so far, so an edit racing a donation cannot reopen or
/// undercut a campaign.
pub async fn update_campaign(
    db: &DatabaseConnection,
    campaign_id: i64,
    update: CampaignUpdate,
    categories: &[String],
) -> Result<campaign::Model> {
    let existing = require_campaign(db, campaign_id).await?;
    ensure_editable(&existing, None)?;

    let mut active = campaign::ActiveModel {
        ..Default::default()
    };
    let mut new_target = None;

    if let Some(title) = update.title {
        active.title = Set(validation::validate_title(&title)?);
    }
    if let Some(summary) = update.short_description {
        active.short_description = Set(validation::validate_summary(&summary)?);
    }
    if let Some(description) = update.description {
        active.description = Set(validation::validate_description(&description)?);
    }
    if let Some(target) = update.target_amount {
        let target = validation::validate_target_amount(target)?;
        ensure_editable(&existing, Some(target))?;
        active.target_amount = Set(target);
        new_target = Some(target);
    }
    if let Some(category) = update.category {
        active.category = Set(validation::validate_category(&category, categories)?);
    }
    if let Some(url) = update.image_url {
        let url = url.trim().to_string();
        active.image_url = Set(if url.is_empty() { None } else { Some(url) });
    }
    if let Some(ends_at) = update.ends_at {
        active.ends_at = Set(Some(ends_at));
    }
    active.updated_at = Set(Utc::now());

    let mut query = Campaign::update_many()
        .set(active)
        .filter(campaign::Column::Id.eq(campaign_id))
        .filter(
            campaign::Column::Status.is_in([CampaignStatus::Draft, CampaignStatus::InProgress]),
        );
    if let Some(target) = new_target {
        query = query.filter(campaign::Column::DonatedAmount.lte(target));
    }
    let result = query.exec(db).await?;

    let current = require_campaign(db, campaign_id).await?;
    if result.rows_affected == 0 {
        ensure_editable(&current, new_target)?;
    }
    Ok(current)
}

/// Rejects edits to closed campaigns and targets below the amount raised.
fn ensure_editable(existing: &campaign::Model, new_target: Option<f64>) -> Result<()> {
    if existing.status.is_terminal() {
        return Err(Error::CampaignClosed {
            id: existing.id,
            status: existing.status,
        });
    }
    if let Some(target) = new_target {
        if target < existing.donated_amount {
            return Err(Error::validation(
                "target amount",
                format!(
                    "cannot be below the {} already donated",
                    report::format_amount(existing.donated_amount)
                ),
            ));
        }
    }
    Ok(())
}

/// Moves a campaign to a new status if the lifecycle allows it.
pub async fn transition_status(
    db: &DatabaseConnection,
    campaign_id: i64,
    new_status: CampaignStatus,
) -> Result<campaign::Model> {
    let existing = require_campaign(db, campaign_id).await?;
    transition_from(db, campaign_id, existing.status, new_status).await
}

/// Writes the status change only if the row still holds `from`.
///
/// A donation can complete the campaign between the read and this write. The
/// guard turns that race into [`Error::InvalidStatusTransition`] from the
/// status actually stored.
async fn transition_from(
    db: &DatabaseConnection,
    campaign_id: i64,
    from: CampaignStatus,
    to: CampaignStatus,
) -> Result<campaign::Model> {
    use sea_orm::sea_query::Expr;

    if !from.can_transition_to(to) {
        return Err(Error::InvalidStatusTransition { from, to });
    }

    let result = Campaign::update_many()
        .col_expr(campaign::Column::Status, Expr::value(to))
        .col_expr(campaign::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(campaign::Column::Id.eq(campaign_id))
        .filter(campaign::Column::Status.eq(from))
        .exec(db)
        .await?;

    let current = require_campaign(db, campaign_id).await?;
    if result.rows_affected == 0 {
        return Err(Error::InvalidStatusTransition {
            from: current.status,
            to,
        });
    }

    info!(campaign_id, %from, %to, "Campaign status changed");
    Ok(current)
}

/// Publishes a draft so it starts accepting donations.
pub async fn publish_campaign(db: &DatabaseConnection, campaign_id: i64) -> Result<campaign::Model> {
    transition_status(db, campaign_id, CampaignStatus::InProgress).await
}

/// Closes an in-progress campaign before it reaches its target.
pub async fn end_campaign(db: &DatabaseConnection, campaign_id: i64) -> Result<campaign::Model> {
    transition_status(db, campaign_id, CampaignStatus::Ended).await
}

/// Admin status change: transitions the campaign and tells its owner.
pub async fn set_status_by_admin(
    db: &DatabaseConnection,
    campaign_id: i64,
    new_status: CampaignStatus,
) -> Result<campaign::Model> {
    let updated = transition_status(db, campaign_id, new_status).await?;

    notification::create_notification(
        db,
        NewNotification {
            user_id: updated.owner_id.clone(),
            kind: NotificationKind::CampaignStatusChanged,
            title: "Campaign status changed".to_string(),
            body: format!(
                "An administrator set '{}' to {}.",
                updated.title, updated.status
            ),
            campaign_id: Some(updated.id),
            donation_id: None,
        },
    )
    .await?;

    Ok(updated)
}

/// Deletes a campaign that has never received a donation.
pub async fn delete_campaign(db: &DatabaseConnection, campaign_id: i64) -> Result<campaign::Model> {
    let existing = require_campaign(db, campaign_id).await?;

    let count = Donation::find()
        .filter(donation::Column::CampaignId.eq(campaign_id))
        .count(db)
        .await?;
    if count > 0 {
        return Err(Error::CampaignHasDonations {
            id: campaign_id,
            count,
        });
    }

    Campaign::delete_by_id(campaign_id).exec(db).await?;
    info!(campaign_id, "Deleted campaign");
    Ok(existing)
}

/// Lists campaigns matching the filter, newest first.
pub async fn list_campaigns(
    db: &DatabaseConnection,
    filter: &CampaignFilter,
) -> Result<Vec<campaign::Model>> {
    Campaign::find()
        .filter(filter.condition())
        .order_by_desc(campaign::Column::CreatedAt)
        .order_by_desc(campaign::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One page of campaigns matching the filter, newest first.
pub async fn list_campaigns_page(
    db: &DatabaseConnection,
    filter: &CampaignFilter,
    request: &PageRequest<i64>,
) -> Result<Page<campaign::Model, i64>> {
    let limit = request.fetch_limit()?;

    let mut query = Campaign::find().filter(filter.condition());
    if let Some(cursor) = &request.after {
        query = query.filter(pagination::after_cursor(
            campaign::Column::CreatedAt,
            campaign::Column::Id,
            cursor,
        ));
    }

    let rows = query
        .order_by_desc(campaign::Column::CreatedAt)
        .order_by_desc(campaign::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    pagination::finish_page(rows, request.page_size, |c| pagination::Cursor {
        created_at: c.created_at,
        id: c.id,
    })
}

/// Adds a settled donation to the campaign's running totals.
///
/// The increment is a single atomic `UPDATE` that rounds the sum to cents, so
/// donations that add up to the target compare equal to it. If an
/// in-progress campaign reaches its target it moves to `Completed`. Returns
/// the updated campaign and whether this donation completed it.
pub async fn apply_completed_donation<C>(
    conn: &C,
    campaign_id: i64,
    amount: f64,
) -> Result<(campaign::Model, bool)>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::{Expr, Func};

    let result = Campaign::update_many()
        .col_expr(
            campaign::Column::DonatedAmount,
            Func::round_with_precision(
                Expr::col(campaign::Column::DonatedAmount).add(amount),
                2,
            )
            .into(),
        )
        .col_expr(
            campaign::Column::DonorCount,
            Expr::col(campaign::Column::DonorCount).add(1),
        )
        .filter(campaign::Column::Id.eq(campaign_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::CampaignNotFound {
            id: campaign_id.to_string(),
        });
    }

    // Completion is decided by the database so a concurrent status change wins
    let completed = Campaign::update_many()
        .col_expr(campaign::Column::Status, Expr::value(CampaignStatus::Completed))
        .col_expr(campaign::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(campaign::Column::Id.eq(campaign_id))
        .filter(campaign::Column::Status.eq(CampaignStatus::InProgress))
        .filter(
            Expr::col(campaign::Column::DonatedAmount)
                .gte(Expr::col(campaign::Column::TargetAmount)),
        )
        .exec(conn)
        .await?;
    let reached_target = completed.rows_affected > 0;

    let updated = Campaign::find_by_id(campaign_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: campaign_id.to_string(),
        })?;

    if reached_target {
        info!(campaign_id, "Campaign reached its target");
    }
    Ok((updated, reached_target))
}

/// Removes a settled donation from the campaign's running totals.
///
/// Totals never go below zero, and the status is left alone because the
/// lifecycle never moves backwards.
pub async fn revert_completed_donation<C>(
    conn: &C,
    campaign_id: i64,
    amount: f64,
) -> Result<campaign::Model>
where
    C: ConnectionTrait,
{
    let existing = Campaign::find_by_id(campaign_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: campaign_id.to_string(),
        })?;

    let donated = validation::round_to_cents((existing.donated_amount - amount).max(0.0));
    let donors = (existing.donor_count - 1).max(0);

    let mut active: campaign::ActiveModel = existing.into();
    active.donated_amount = Set(donated);
    active.donor_count = Set(donors);
    active.updated_at = Set(Utc::now());
    active.update(conn).await.map_err(Into::into)
}

/// Share of the target raised so far, as a percentage.
#[must_use]
pub fn progress_percent(campaign: &campaign::Model) -> f64 {
    if campaign.target_amount <= 0.0 {
        return 0.0;
    }
    (campaign.donated_amount / campaign.target_amount) * 100.0
}
