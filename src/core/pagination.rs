//! Cursor pagination for list views.
//!
//! Pages are ordered newest first by `created_at`, with the primary key as a
//! tie-breaker. A page query fetches one row more than it returns. If that
//! extra row comes back, another page exists and the last row kept becomes the
//! cursor for the next request.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, Value};
use std::fmt;
use std::str::FromStr;

/// Largest page a caller may ask for
pub const MAX_PAGE_SIZE: u64 = 100;

/// Position of the last row of a previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    /// Timestamp of the last row seen
    pub created_at: DateTime<Utc>,
    /// Primary key of the last row seen
    pub id: K,
}

impl<K: fmt::Display> Cursor<K> {
    /// Opaque token handed to users as the "next page" argument.
    ///
    /// Format is `<unix_nanos>.<id>`, so the full timestamp precision survives.
    #[must_use]
    pub fn encode(&self) -> String {
        let nanos = self
            .created_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.created_at.timestamp_micros().saturating_mul(1000));
        format!("{nanos}.{}", self.id)
    }
}

impl<K: FromStr> Cursor<K> {
    /// Parses a token produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self> {
        let invalid = || Error::validation("cursor", format!("'{token}' is not a page token"));

        let (nanos, id) = token.trim().split_once('.').ok_or_else(invalid)?;
        let nanos: i64 = nanos.parse().map_err(|_| invalid())?;
        if id.is_empty() {
            return Err(invalid());
        }
        let id = id.parse::<K>().map_err(|_| invalid())?;

        Ok(Self {
            created_at: DateTime::<Utc>::from_timestamp_nanos(nanos),
            id,
        })
    }
}

/// A request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<K> {
    /// Rows per page
    pub page_size: u64,
    /// Continue after this row; `None` for the first page
    pub after: Option<Cursor<K>>,
}

impl<K> PageRequest<K> {
    /// Request for the first page.
    #[must_use]
    pub const fn first(page_size: u64) -> Self {
        Self {
            page_size,
            after: None,
        }
    }

    /// Request for the page following `cursor`.
    #[must_use]
    pub const fn after(page_size: u64, cursor: Cursor<K>) -> Self {
        Self {
            page_size,
            after: Some(cursor),
        }
    }

    /// Checks the page size and returns the number of rows to fetch,
    /// which is one more than the page size.
    pub fn fetch_limit(&self) -> Result<u64> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::validation(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(self.page_size + 1)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, K> {
    /// Rows on this page, newest first
    pub items: Vec<T>,
    /// Cursor for the next page, if there is one
    pub next: Option<Cursor<K>>,
}

impl<T, K> Page<T, K> {
    /// Whether another page follows this one
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// Builds the condition selecting rows strictly after `cursor` in
/// `created_at DESC, id DESC` order.
pub fn after_cursor<C, K>(created_at: C, id: C, cursor: &Cursor<K>) -> Condition
where
    C: ColumnTrait,
    K: Clone + Into<Value>,
{
    Condition::any().add(created_at.lt(cursor.created_at)).add(
        Condition::all()
            .add(created_at.eq(cursor.created_at))
            .add(id.lt(cursor.id.clone())),
    )
}

/// Turns the over-fetched rows of a page query into a [`Page`].
///
/// `rows` must already be in page order and hold at most `page_size + 1` rows.
pub fn finish_page<T, K, F>(mut rows: Vec<T>, page_size: u64, cursor_of: F) -> Result<Page<T, K>>
where
    F: Fn(&T) -> Cursor<K>,
{
    let size = usize::try_from(page_size)?;
    let next = if rows.len() > size {
        rows.truncate(size);
        rows.last().map(cursor_of)
    } else {
        None
    };

    Ok(Page { items: rows, next })
}
