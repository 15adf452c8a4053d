//! Notification business logic - in-app messages and their read state.

use crate::{
    entities::{Notification, NotificationKind, notification},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Data for a notification about to be created
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Recipient user id
    pub user_id: String,
    /// Trigger type
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Message body
    pub body: String,
    /// Related campaign
    pub campaign_id: Option<i64>,
    /// Related donation
    pub donation_id: Option<i64>,
}

/// Which notifications a list or live query returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    /// Recipient user id
    pub user_id: String,
    /// Only return notifications not yet read
    pub unread_only: bool,
}

/// Inserts a notification. Works inside a database transaction.
pub async fn create_notification<C>(conn: &C, new: NewNotification) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let model = notification::ActiveModel {
        user_id: Set(new.user_id),
        kind: Set(new.kind),
        title: Set(new.title),
        body: Set(new.body),
        is_read: Set(false),
        campaign_id: Set(new.campaign_id),
        donation_id: Set(new.donation_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model.insert(conn).await.map_err(Into::into)
}

/// Lists a user's notifications, newest first.
pub async fn list_notifications(
    db: &DatabaseConnection,
    filter: &NotificationFilter,
) -> Result<Vec<notification::Model>> {
    let mut query = Notification::find().filter(notification::Column::UserId.eq(filter.user_id.as_str()));
    if filter.unread_only {
        query = query.filter(notification::Column::IsRead.eq(false));
    }

    query
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of unread notifications for a user.
pub async fn unread_count(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks one of the user's notifications as read. Marking twice is harmless.
pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: &str,
    notification_id: i64,
) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })?;

    if existing.is_read {
        return Ok(existing);
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Marks every unread notification of a user as read and returns how many changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    use sea_orm::sea_query::Expr;

    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Removes all notifications of a user. Works inside a database transaction.
pub async fn delete_for_user<C>(conn: &C, user_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Notification::delete_many()
        .filter(notification::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn note(user_id: &str, title: &str) -> NewNotification {
        NewNotification {
            user_id: user_id.to_string(),
            kind: NotificationKind::DonationReceived,
            title: title.to_string(),
            body: "body".to_string(),
            campaign_id: None,
            donation_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_and_unread_count() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "100").await?;
        create_test_user(&db, "200").await?;

        let first = create_notification(&db, note("100", "first")).await?;
        let second = create_notification(&db, note("100", "second")).await?;
        create_notification(&db, note("200", "other user")).await?;

        let filter = NotificationFilter {
            user_id: "100".to_string(),
            unread_only: false,
        };
        let all = list_notifications(&db, &filter).await?;
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0], second);
        assert_eq!(all[1], first);

        assert_eq!(unread_count(&db, "100").await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_and_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "100").await?;
        create_test_user(&db, "200").await?;
        let n = create_notification(&db, note("100", "hello")).await?;

        // Another user cannot mark it
        let wrong = mark_read(&db, "200", n.id).await;
        assert!(matches!(
            wrong.unwrap_err(),
            Error::NotificationNotFound { id: _ }
        ));

        let read = mark_read(&db, "100", n.id).await?;
        assert!(read.is_read);
        let again = mark_read(&db, "100", n.id).await?;
        assert!(again.is_read);

        assert_eq!(unread_count(&db, "100").await?, 0);
        let unread = list_notifications(
            &db,
            &NotificationFilter {
                user_id: "100".to_string(),
                unread_only: true,
            },
        )
        .await?;
        assert!(unread.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_all_read() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "100").await?;
        for i in 0..3 {
            create_notification(&db, note("100", &format!("n{i}"))).await?;
        }

        assert_eq!(mark_all_read(&db, "100").await?, 3);
        assert_eq!(mark_all_read(&db, "100").await?, 0);
        assert_eq!(unread_count(&db, "100").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<notification::Model>::new()])
            .into_connection();

        let result = mark_read(&db, "100", 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotificationNotFound { id: 999 }
        ));
        Ok(())
    }
}
