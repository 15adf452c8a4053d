//! User business logic - registration, profiles, roles and admin user management.
//!
//! Users are keyed by their Discord id. Deleting a user is a soft delete so the
//! donations they made stay on record and campaign totals remain correct.

use crate::{
    core::{
        notification,
        pagination::{self, Page, PageRequest},
        validation,
    },
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Fields a user may change on their own profile. `None` leaves a field as is;
/// an empty string clears the optional fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name
    pub display_name: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New biography
    pub bio: Option<String>,
}

/// Registers a new user, or restores a previously deleted one under the same id.
pub async fn register_user(
    db: &DatabaseConnection,
    id: &str,
    display_name: &str,
    email: &str,
) -> Result<user::Model> {
    let display_name = validation::validate_display_name(display_name)?;
    let email = validation::validate_email(email)?;
    let now = Utc::now();

    if let Some(existing) = User::find_by_id(id.to_string()).one(db).await? {
        if !existing.is_deleted {
            return Err(Error::UserAlreadyExists { id: id.to_string() });
        }

        info!(user_id = id, "Restoring deleted user");
        let mut restored: user::ActiveModel = existing.into();
        restored.display_name = Set(display_name);
        restored.email = Set(email);
        restored.role = Set(UserRole::User);
        restored.is_deleted = Set(false);
        restored.updated_at = Set(now);
        return restored.update(db).await.map_err(Into::into);
    }

    let new_user = user::ActiveModel {
        id: Set(id.to_string()),
        display_name: Set(display_name),
        email: Set(email),
        role: Set(UserRole::User),
        total_donated: Set(0.0),
        donation_count: Set(0),
        phone: Set(None),
        bio: Set(None),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = new_user.insert(db).await?;
    info!(user_id = id, "Registered user");
    Ok(result)
}

/// Finds an active user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<user::Model>> {
    User::find_by_id(id.to_string())
        .filter(user::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active user by id, failing with [`Error::UserNotFound`].
pub async fn require_user(db: &DatabaseConnection, id: &str) -> Result<user::Model> {
    get_user_by_id(db, id)
        .await?
        .ok_or_else(|| Error::UserNotFound { id: id.to_string() })
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Applies a profile update after validating the changed fields.
pub async fn update_profile(
    db: &DatabaseConnection,
    id: &str,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let existing = require_user(db, id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(name) = update.display_name {
        active.display_name = Set(validation::validate_display_name(&name)?);
    }
    if let Some(email) = update.email {
        active.email = Set(validation::validate_email(&email)?);
    }
    if let Some(phone) = update.phone {
        active.phone = Set(blank_to_none(phone));
    }
    if let Some(bio) = update.bio {
        let bio = blank_to_none(bio);
        if bio.as_ref().is_some_and(|b| b.chars().count() > 280) {
            return Err(Error::validation("bio", "must be at most 280 characters"));
        }
        active.bio = Set(bio);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Returns true if the user holds the admin role or is a bootstrap admin.
pub async fn is_admin(
    db: &DatabaseConnection,
    id: &str,
    bootstrap_admins: &[String],
) -> Result<bool> {
    if bootstrap_admins.iter().any(|admin| admin == id) {
        return Ok(true);
    }
    Ok(get_user_by_id(db, id)
        .await?
        .is_some_and(|u| u.role == UserRole::Admin))
}

/// Changes another user's role. Admins cannot demote themselves.
pub async fn set_role(
    db: &DatabaseConnection,
    acting_admin_id: &str,
    target_id: &str,
    role: UserRole,
) -> Result<user::Model> {
    if acting_admin_id == target_id && role != UserRole::Admin {
        return Err(Error::PermissionDenied {
            message: "admins cannot remove their own admin role".to_string(),
        });
    }

    let target = require_user(db, target_id).await?;
    let mut active: user::ActiveModel = target.into();
    active.role = Set(role);
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!(
        admin = acting_admin_id,
        user_id = target_id,
        role = %role,
        "Changed user role"
    );
    Ok(updated)
}

/// Soft-deletes a user and removes their notifications.
///
/// An admin can never delete their own account from the admin panel.
pub async fn delete_user(
    db: &DatabaseConnection,
    acting_admin_id: &str,
    target_id: &str,
) -> Result<user::Model> {
    if acting_admin_id == target_id {
        return Err(Error::CannotDeleteSelf);
    }

    let txn = db.begin().await?;

    let target = User::find_by_id(target_id.to_string())
        .filter(user::Column::IsDeleted.eq(false))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: target_id.to_string(),
        })?;

    let mut active: user::ActiveModel = target.into();
    active.is_deleted = Set(true);
    active.role = Set(UserRole::User);
    active.updated_at = Set(Utc::now());
    let deleted = active.update(&txn).await?;

    let removed = notification::delete_for_user(&txn, target_id).await?;

    txn.commit().await?;
    info!(
        admin = acting_admin_id,
        user_id = target_id,
        notifications_removed = removed,
        "Deleted user"
    );
    Ok(deleted)
}

/// One page of active users, newest first, optionally filtered by role.
pub async fn list_users_page(
    db: &DatabaseConnection,
    role: Option<UserRole>,
    request: &PageRequest<String>,
) -> Result<Page<user::Model, String>> {
    let limit = request.fetch_limit()?;

    let mut query = User::find().filter(user::Column::IsDeleted.eq(false));
    if let Some(role) = role {
        query = query.filter(user::Column::Role.eq(role));
    }
    if let Some(cursor) = &request.after {
        query = query.filter(pagination::after_cursor(
            user::Column::CreatedAt,
            user::Column::Id,
            cursor,
        ));
    }

    let rows = query
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    pagination::finish_page(rows, request.page_size, |u| pagination::Cursor {
        created_at: u.created_at,
        id: u.id.clone(),
    })
}

/// Adds a settled donation to the donor's running totals.
///
/// Uses a single `UPDATE ... SET total = total + amount` so concurrent
/// donations cannot lose updates.
pub async fn apply_completed_donation<C>(conn: &C, donor_id: &str, amount: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::{Expr, Func};

    let result = User::update_many()
        .col_expr(
            user::Column::TotalDonated,
            Func::round_with_precision(
                Expr::col(user::Column::TotalDonated).add(amount),
                2,
            )
            .into(),
        )
        .col_expr(
            user::Column::DonationCount,
            Expr::col(user::Column::DonationCount).add(1),
        )
        .filter(user::Column::Id.eq(donor_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::UserNotFound {
            id: donor_id.to_string(),
        });
    }
    Ok(())
}

/// Removes a settled donation from the donor's running totals, never going below zero.
///
/// Deleted users are still adjusted so their history stays consistent.
pub async fn revert_completed_donation<C>(conn: &C, donor_id: &str, amount: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some(donor) = User::find_by_id(donor_id.to_string()).one(conn).await? else {
        return Ok(());
    };

    let total = validation::round_to_cents((donor.total_donated - amount).max(0.0));
    let count = (donor.donation_count - 1).max(0);

    let mut active: user::ActiveModel = donor.into();
    active.total_donated = Set(total);
    active.donation_count = Set(count);
    active.update(conn).await?;
    Ok(())
}
