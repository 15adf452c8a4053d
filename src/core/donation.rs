//! Donation business logic - recording, settling and reversing donations.
//!
//! A donation is recorded as `pending` and settled by [`complete_donation`],
//! which updates the campaign running sum, the donor's denormalized totals and
//! writes notifications in one database transaction. Failed donations never
//! touch any total. Deleting a settled donation reverses its effect.

use crate::{
    core::{
        campaign,
        notification::{self, NewNotification},
        pagination::{self, Page, PageRequest},
        report, user, validation,
    },
    entities::{
        Campaign, CampaignStatus, Donation, DonationStatus, NotificationKind, User,
        campaign as campaign_entity, donation, notification as notification_entity,
        user as user_entity,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Label shown instead of the donor's name on anonymous donations
pub const ANONYMOUS_LABEL: &str = "Anonymous";

/// Data for a donation about to be recorded
#[derive(Debug, Clone)]
pub struct NewDonation {
    /// Campaign receiving the donation
    pub campaign_id: i64,
    /// Donor user id
    pub donor_id: String,
    /// Amount in dollars
    pub amount: f64,
    /// Optional note to the campaign owner
    pub message: Option<String>,
    /// Hide the donor's name
    pub is_anonymous: bool,
}

/// Which donations a list or live query returns. Empty filter means all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationFilter {
    /// Only donations to this campaign
    pub campaign_id: Option<i64>,
    /// Only donations by this user
    pub donor_id: Option<String>,
    /// Only this status
    pub status: Option<DonationStatus>,
}

impl DonationFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(campaign_id) = self.campaign_id {
            condition = condition.add(donation::Column::CampaignId.eq(campaign_id));
        }
        if let Some(donor_id) = &self.donor_id {
            condition = condition.add(donation::Column::DonorId.eq(donor_id.as_str()));
        }
        if let Some(status) = self.status {
            condition = condition.add(donation::Column::Status.eq(status));
        }
        condition
    }
}

/// Everything that changed when a donation settled
#[derive(Debug, Clone)]
pub struct DonationOutcome {
    /// The settled donation
    pub donation: donation::Model,
    /// The campaign after its totals were updated
    pub campaign: campaign_entity::Model,
    /// The donor after their totals were updated
    pub donor: user_entity::Model,
    /// Whether this donation pushed the campaign over its target
    pub reached_target: bool,
    /// Notifications written for the donor and the owner
    pub notifications: Vec<notification_entity::Model>,
}

/// Records a pending donation against an in-progress campaign.
pub async fn create_donation(db: &DatabaseConnection, new: NewDonation) -> Result<donation::Model> {
    insert_pending(db, new).await
}

async fn insert_pending<C>(conn: &C, new: NewDonation) -> Result<donation::Model>
where
    C: ConnectionTrait,
{
    let amount = validation::validate_amount(new.amount)?;
    let message = validation::validate_message(new.message)?;

    User::find_by_id(new.donor_id.clone())
        .filter(user_entity::Column::IsDeleted.eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: new.donor_id.clone(),
        })?;
    let target = Campaign::find_by_id(new.campaign_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: new.campaign_id.to_string(),
        })?;
    if target.status != CampaignStatus::InProgress {
        return Err(Error::CampaignNotAcceptingDonations {
            id: target.id,
            status: target.status,
        });
    }

    let model = donation::ActiveModel {
        campaign_id: Set(new.campaign_id),
        donor_id: Set(new.donor_id),
        amount: Set(amount),
        message: Set(message),
        is_anonymous: Set(new.is_anonymous),
        status: Set(DonationStatus::Pending),
        created_at: Set(Utc::now()),
        completed_at: Set(None),
        ..Default::default()
    };

    let result = model.insert(conn).await?;
    info!(
        donation_id = result.id,
        campaign_id = result.campaign_id,
        amount = result.amount,
        "Recorded pending donation"
    );
    Ok(result)
}

/// Settles a pending donation and updates every running total atomically.
///
/// If the campaign stopped accepting donations since the donation was
/// recorded, the donation is marked failed and the error is returned.
pub async fn complete_donation(
    db: &DatabaseConnection,
    donation_id: i64,
) -> Result<DonationOutcome> {
    let txn = db.begin().await?;

    match settle(&txn, donation_id).await {
        Ok(outcome) => {
            txn.commit().await?;
            Ok(outcome)
        }
        Err(err @ Error::CampaignNotAcceptingDonations { .. }) => {
            txn.rollback().await?;
            fail_donation(db, donation_id).await?;
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Settles inside the caller's transaction. Nothing is committed here.
async fn settle<C>(conn: &C, donation_id: i64) -> Result<DonationOutcome>
where
    C: ConnectionTrait,
{
    let pending = Donation::find_by_id(donation_id)
        .one(conn)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })?;
    if pending.status != DonationStatus::Pending {
        return Err(Error::DonationNotPending { id: donation_id });
    }

    let target = Campaign::find_by_id(pending.campaign_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: pending.campaign_id.to_string(),
        })?;
    if target.status != CampaignStatus::InProgress {
        return Err(Error::CampaignNotAcceptingDonations {
            id: target.id,
            status: target.status,
        });
    }

    let mut active: donation::ActiveModel = pending.into();
    active.status = Set(DonationStatus::Completed);
    active.completed_at = Set(Some(Utc::now()));
    let settled = active.update(conn).await?;

    let (updated_campaign, reached_target) =
        campaign::apply_completed_donation(conn, settled.campaign_id, settled.amount).await?;
    user::apply_completed_donation(conn, &settled.donor_id, settled.amount).await?;

    let donor = User::find_by_id(settled.donor_id.clone())
        .one(conn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: settled.donor_id.clone(),
        })?;

    let mut notifications = Vec::with_capacity(3);
    let amount_text = report::format_amount(settled.amount);

    notifications.push(
        notification::create_notification(
            conn,
            NewNotification {
                user_id: settled.donor_id.clone(),
                kind: NotificationKind::DonationConfirmed,
                title: "Thank you for your donation".to_string(),
                body: format!(
                    "Your donation of {amount_text} to '{}' has been received.",
                    updated_campaign.title
                ),
                campaign_id: Some(updated_campaign.id),
                donation_id: Some(settled.id),
            },
        )
        .await?,
    );

    notifications.push(
        notification::create_notification(
            conn,
            NewNotification {
                user_id: updated_campaign.owner_id.clone(),
                kind: NotificationKind::DonationReceived,
                title: "New donation".to_string(),
                body: format!(
                    "{} donated {amount_text} to '{}'.",
                    donor_label(&settled, Some(&donor)),
                    updated_campaign.title
                ),
                campaign_id: Some(updated_campaign.id),
                donation_id: Some(settled.id),
            },
        )
        .await?,
    );

    if reached_target {
        notifications.push(
            notification::create_notification(
                conn,
                NewNotification {
                    user_id: updated_campaign.owner_id.clone(),
                    kind: NotificationKind::CampaignCompleted,
                    title: "Campaign completed".to_string(),
                    body: format!(
                        "'{}' reached its target of {}.",
                        updated_campaign.title,
                        report::format_amount(updated_campaign.target_amount)
                    ),
                    campaign_id: Some(updated_campaign.id),
                    donation_id: None,
                },
            )
            .await?,
        );
    }

    info!(
        donation_id,
        campaign_id = updated_campaign.id,
        reached_target,
        "Donation completed"
    );

    Ok(DonationOutcome {
        donation: settled,
        campaign: updated_campaign,
        donor,
        reached_target,
        notifications,
    })
}

/// Marks a pending donation as failed. Totals are not touched.
pub async fn fail_donation(db: &DatabaseConnection, donation_id: i64) -> Result<donation::Model> {
    let pending = require_donation(db, donation_id).await?;
    if pending.status != DonationStatus::Pending {
        return Err(Error::DonationNotPending { id: donation_id });
    }

    let mut active: donation::ActiveModel = pending.into();
    active.status = Set(DonationStatus::Failed);
    let failed = active.update(db).await?;
    info!(donation_id, "Donation failed");
    Ok(failed)
}

/// Records and immediately settles a donation in one transaction.
///
/// Any failure rolls the whole donation back, so no pending row is left.
pub async fn donate(db: &DatabaseConnection, new: NewDonation) -> Result<DonationOutcome> {
    let txn = db.begin().await?;
    let pending = insert_pending(&txn, new).await?;
    let outcome = settle(&txn, pending.id).await?;
    txn.commit().await?;
    Ok(outcome)
}

/// Finds a donation by its id.
pub async fn get_donation_by_id(
    db: &DatabaseConnection,
    donation_id: i64,
) -> Result<Option<donation::Model>> {
    Donation::find_by_id(donation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a donation by its id, failing with [`Error::DonationNotFound`].
pub async fn require_donation(db: &DatabaseConnection, donation_id: i64) -> Result<donation::Model> {
    get_donation_by_id(db, donation_id)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })
}

/// Lists donations matching the filter, newest first.
pub async fn list_donations(
    db: &DatabaseConnection,
    filter: &DonationFilter,
) -> Result<Vec<donation::Model>> {
    Donation::find()
        .filter(filter.condition())
        .order_by_desc(donation::Column::CreatedAt)
        .order_by_desc(donation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A donor's donation history, newest first.
pub async fn donation_history(
    db: &DatabaseConnection,
    donor_id: &str,
) -> Result<Vec<donation::Model>> {
    list_donations(
        db,
        &DonationFilter {
            donor_id: Some(donor_id.to_string()),
            ..Default::default()
        },
    )
    .await
}

/// One page of donations matching the filter, newest first.
pub async fn list_donations_page(
    db: &DatabaseConnection,
    filter: &DonationFilter,
    request: &PageRequest<i64>,
) -> Result<Page<donation::Model, i64>> {
    let limit = request.fetch_limit()?;

    let mut query = Donation::find().filter(filter.condition());
    if let Some(cursor) = &request.after {
        query = query.filter(pagination::after_cursor(
            donation::Column::CreatedAt,
            donation::Column::Id,
            cursor,
        ));
    }

    let rows = query
        .order_by_desc(donation::Column::CreatedAt)
        .order_by_desc(donation::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    pagination::finish_page(rows, request.page_size, |d| pagination::Cursor {
        created_at: d.created_at,
        id: d.id,
    })
}

/// Deletes a donation record, reversing its effect on totals if it had settled.
pub async fn delete_donation(db: &DatabaseConnection, donation_id: i64) -> Result<donation::Model> {
    let txn = db.begin().await?;

    let existing = Donation::find_by_id(donation_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })?;

    if existing.status == DonationStatus::Completed {
        campaign::revert_completed_donation(&txn, existing.campaign_id, existing.amount).await?;
        user::revert_completed_donation(&txn, &existing.donor_id, existing.amount).await?;
    }

    Donation::delete_by_id(donation_id).exec(&txn).await?;
    txn.commit().await?;

    info!(donation_id, status = %existing.status, "Deleted donation");
    Ok(existing)
}

/// Name to show for a donation: the donor's display name, or "Anonymous".
#[must_use]
pub fn donor_label(donation: &donation::Model, donor: Option<&user_entity::Model>) -> String {
    if donation.is_anonymous {
        return ANONYMOUS_LABEL.to_string();
    }
    donor.map_or_else(
        || format!("User {}", donation.donor_id),
        |d| d.display_name.clone(),
    )
}

/// Loads the donors for a set of donations in one query, for labelling lists.
pub async fn load_donors(
    db: &DatabaseConnection,
    donations: &[donation::Model],
) -> Result<Vec<user_entity::Model>> {
    let mut ids: Vec<String> = donations.iter().map(|d| d.donor_id.clone()).collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    User::find()
        .filter(user_entity::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads the campaigns referenced by a set of donations in one query.
pub async fn load_campaigns(
    db: &DatabaseConnection,
    donations: &[donation::Model],
) -> Result<Vec<campaign_entity::Model>> {
    let mut ids: Vec<i64> = donations.iter().map(|d| d.campaign_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Campaign::find()
        .filter(campaign_entity::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_donation(campaign_id: i64, donor_id: &str, amount: f64) -> NewDonation {
        NewDonation {
            campaign_id,
            donor_id: donor_id.to_string(),
            amount,
            message: None,
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_create_donation_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = create_donation(&db, new_donation(1, "donor", amount)).await;
            assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        }

        let mut long_message = new_donation(1, "donor", 5.0);
        long_message.message = Some("x".repeat(validation::MAX_MESSAGE_CHARS + 1));
        let result = create_donation(&db, long_message).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "message",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_donation_requires_in_progress_campaign() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "owner").await?;
        create_test_user(&db, "donor").await?;
        let draft = create_test_campaign(&db, "owner", "Draft Idea").await?;

        let result = create_donation(&db, new_donation(draft.id, "donor", 10.0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CampaignNotAcceptingDonations {
                status: CampaignStatus::Draft,
                ..
            }
        ));

        let missing = create_donation(&db, new_donation(999, "donor", 10.0)).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::CampaignNotFound { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_donate_updates_all_totals_and_notifies() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let outcome = donate(&db, new_donation(campaign.id, "donor", 250.0)).await?;

        assert_eq!(outcome.donation.status, DonationStatus::Completed);
        assert!(outcome.donation.completed_at.is_some());
        assert_eq!(outcome.campaign.donated_amount, 250.0);
        assert_eq!(outcome.campaign.donor_count, 1);
        assert!(!outcome.reached_target);
        assert_eq!(outcome.donor.total_donated, 250.0);
        assert_eq!(outcome.donor.donation_count, 1);

        let kinds: Vec<NotificationKind> = outcome.notifications.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::DonationConfirmed,
                NotificationKind::DonationReceived
            ]
        );
        assert_eq!(outcome.notifications[0].user_id, "donor");
        assert_eq!(outcome.notifications[1].user_id, owner.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_donated_amount_is_running_sum() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "a").await?;
        create_test_user(&db, "b").await?;

        donate(&db, new_donation(campaign.id, "a", 100.0)).await?;
        donate(&db, new_donation(campaign.id, "b", 50.25)).await?;
        donate(&db, new_donation(campaign.id, "a", 19.75)).await?;

        // A failed donation does not count
        let pending = create_donation(&db, new_donation(campaign.id, "b", 500.0)).await?;
        fail_donation(&db, pending.id).await?;

        let campaign = campaign::require_campaign(&db, campaign.id).await?;
        assert_eq!(campaign.donated_amount, 170.0);
        assert_eq!(campaign.donor_count, 3);

        let a = user::require_user(&db, "a").await?;
        assert_eq!(a.total_donated, 119.75);
        assert_eq!(a.donation_count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_reaching_target_completes_campaign() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let outcome = donate(&db, new_donation(campaign.id, "donor", 1000.0)).await?;
        assert!(outcome.reached_target);
        assert_eq!(outcome.campaign.status, CampaignStatus::Completed);
        assert_eq!(outcome.notifications.len(), 3);
        assert_eq!(outcome.notifications[2].kind, NotificationKind::CampaignCompleted);
        assert_eq!(outcome.notifications[2].user_id, owner.id);

        // Completed campaigns stop accepting donations
        let result = donate(&db, new_donation(campaign.id, "donor", 5.0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CampaignNotAcceptingDonations {
                status: CampaignStatus::Completed,
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_cent_donations_reach_exact_target() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "owner").await?;
        create_test_user(&db, "donor").await?;
        let draft = campaign::create_campaign(
            &db,
            campaign::NewCampaign {
                target_amount: 1.0,
                ..new_campaign("owner", "Coffee Fund")
            },
            &test_categories(),
        )
        .await?;
        let active = campaign::publish_campaign(&db, draft.id).await?;

        for _ in 0..9 {
            let outcome = donate(&db, new_donation(active.id, "donor", 0.1)).await?;
            assert!(!outcome.reached_target);
        }
        let last = donate(&db, new_donation(active.id, "donor", 0.1)).await?;
        assert!(last.reached_target);
        assert_eq!(last.campaign.donated_amount, 1.0);
        assert_eq!(last.campaign.status, CampaignStatus::Completed);
        assert_eq!(last.donor.total_donated, 1.0);
        assert_eq!(last.donor.donation_count, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_settling_after_campaign_closed_fails_donation() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let pending = create_donation(&db, new_donation(campaign.id, "donor", 40.0)).await?;
        campaign::end_campaign(&db, campaign.id).await?;

        let result = complete_donation(&db, pending.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CampaignNotAcceptingDonations {
                status: CampaignStatus::Ended,
                ..
            }
        ));

        let stored = require_donation(&db, pending.id).await?;
        assert_eq!(stored.status, DonationStatus::Failed);
        let still_pending = list_donations(
            &db,
            &DonationFilter {
                status: Some(DonationStatus::Pending),
                ..Default::default()
            },
        )
        .await?;
        assert!(still_pending.is_empty());

        let campaign = campaign::require_campaign(&db, campaign.id).await?;
        assert_eq!(campaign.donated_amount, 0.0);
        assert_eq!(campaign.donor_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_donate_leaves_no_record() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;
        campaign::end_campaign(&db, campaign.id).await?;

        let result = donate(&db, new_donation(campaign.id, "donor", 15.0)).await;
        assert!(result.is_err());

        let missing_donor = donate(&db, new_donation(campaign.id, "nobody", 15.0)).await;
        assert!(matches!(
            missing_donor.unwrap_err(),
            Error::UserNotFound { id: _ }
        ));

        assert!(list_donations(&db, &DonationFilter::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_donation_only_once() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let pending = create_donation(&db, new_donation(campaign.id, "donor", 20.0)).await?;
        complete_donation(&db, pending.id).await?;

        let again = complete_donation(&db, pending.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::DonationNotPending { id: _ }
        ));
        let fail = fail_donation(&db, pending.id).await;
        assert!(matches!(fail.unwrap_err(), Error::DonationNotPending { id: _ }));

        let campaign = campaign::require_campaign(&db, campaign.id).await?;
        assert_eq!(campaign.donated_amount, 20.0);

        let missing = complete_donation(&db, 999).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::DonationNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_donation_hides_name_from_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let outcome = donate(
            &db,
            NewDonation {
                is_anonymous: true,
                message: Some("  Keep going ".to_string()),
                ..new_donation(campaign.id, "donor", 15.0)
            },
        )
        .await?;

        assert_eq!(outcome.donation.message.as_deref(), Some("Keep going"));
        let owner_note = &outcome.notifications[1];
        assert!(owner_note.body.starts_with(ANONYMOUS_LABEL));
        assert!(!owner_note.body.contains("Test User donor"));

        Ok(())
    }

    #[tokio::test]
    async fn test_history_and_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "a").await?;
        create_test_user(&db, "b").await?;

        let first = donate(&db, new_donation(campaign.id, "a", 10.0)).await?;
        donate(&db, new_donation(campaign.id, "b", 20.0)).await?;
        let third = donate(&db, new_donation(campaign.id, "a", 30.0)).await?;
        create_donation(&db, new_donation(campaign.id, "a", 40.0)).await?;

        let history = donation_history(&db, "a").await?;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], third.donation);
        assert_eq!(history[2], first.donation);

        let completed = list_donations(
            &db,
            &DonationFilter {
                campaign_id: Some(campaign.id),
                status: Some(DonationStatus::Completed),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(completed.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_donations_page_over_fetch() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;
        for _ in 0..4 {
            donate(&db, new_donation(campaign.id, "donor", 1.0)).await?;
        }

        let filter = DonationFilter::default();
        let first = list_donations_page(&db, &filter, &PageRequest::first(2)).await?;
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more());

        let second =
            list_donations_page(&db, &filter, &PageRequest::after(2, first.next.unwrap())).await?;
        assert_eq!(second.items.len(), 2);
        // Exactly two rows remained, so the over-fetch found nothing extra
        assert!(!second.has_more());
        assert!(second.items[0].id < first.items[1].id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_completed_donation_reverses_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let kept = donate(&db, new_donation(campaign.id, "donor", 60.0)).await?;
        let removed = donate(&db, new_donation(campaign.id, "donor", 40.0)).await?;

        delete_donation(&db, removed.donation.id).await?;

        let campaign = campaign::require_campaign(&db, campaign.id).await?;
        assert_eq!(campaign.donated_amount, 60.0);
        assert_eq!(campaign.donor_count, 1);
        let donor = user::require_user(&db, "donor").await?;
        assert_eq!(donor.total_donated, 60.0);
        assert_eq!(donor.donation_count, 1);

        assert!(get_donation_by_id(&db, removed.donation.id).await?.is_none());
        assert!(get_donation_by_id(&db, kept.donation.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_pending_donation_leaves_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;

        let pending = create_donation(&db, new_donation(campaign.id, "donor", 75.0)).await?;
        delete_donation(&db, pending.id).await?;

        let campaign = campaign::require_campaign(&db, campaign.id).await?;
        assert_eq!(campaign.donated_amount, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_load_donors_and_campaigns() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "a").await?;
        create_test_user(&db, "b").await?;
        donate(&db, new_donation(campaign.id, "a", 1.0)).await?;
        donate(&db, new_donation(campaign.id, "b", 2.0)).await?;
        donate(&db, new_donation(campaign.id, "a", 3.0)).await?;

        let all = list_donations(&db, &DonationFilter::default()).await?;
        assert_eq!(load_donors(&db, &all).await?.len(), 2);
        assert_eq!(load_campaigns(&db, &all).await?.len(), 1);
        assert!(load_donors(&db, &[]).await?.is_empty());

        Ok(())
    }

    #[test]
    fn test_donor_label() {
        let mut donation = sample_donation_model(1, 10.0);
        let donor = sample_user_model("donor", "Sam");

        assert_eq!(donor_label(&donation, Some(&donor)), "Sam");
        assert_eq!(donor_label(&donation, None), "User donor");

        donation.is_anonymous = true;
        assert_eq!(donor_label(&donation, Some(&donor)), ANONYMOUS_LABEL);
    }
}
