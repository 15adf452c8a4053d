//! Donation aggregation: totals per period, top campaigns and summaries.
//!
//! The pure helpers work on slices of donation rows so they can be tested
//! without a database. Only completed donations are counted.

use crate::{
    core::donation::{self, DonationFilter},
    entities::{DonationStatus, donation as donation_entity},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

/// Bucket size for period totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// `YYYY-MM-DD`
    Day,
    /// `YYYY-MM`
    Month,
    /// `YYYY`
    Year,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        })
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(Error::validation(
                "period",
                format!("'{other}' is not one of day, month or year"),
            )),
        }
    }
}

/// Formats the bucket a timestamp falls into.
#[must_use]
pub fn bucket_key(ts: DateTime<Utc>, period: Period) -> String {
    let format = match period {
        Period::Day => "%Y-%m-%d",
        Period::Month => "%Y-%m",
        Period::Year => "%Y",
    };
    ts.format(format).to_string()
}

/// Completed donations summed over one period bucket
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotal {
    /// Bucket label, e.g. `2024-03`
    pub key: String,
    /// Sum of amounts
    pub total: f64,
    /// Number of donations
    pub count: u64,
}

/// Completed donations summed for one campaign
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignTotal {
    /// Campaign id
    pub campaign_id: i64,
    /// Sum of amounts
    pub total: f64,
    /// Number of donations
    pub count: u64,
}

/// Headline numbers for a set of donations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationSummary {
    /// Sum of completed amounts
    pub total: f64,
    /// Number of completed donations
    pub count: u64,
    /// Mean completed amount, zero when there are none
    pub average: f64,
    /// Largest completed amount, zero when there are none
    pub largest: f64,
}

fn completed(donations: &[donation_entity::Model]) -> impl Iterator<Item = &donation_entity::Model> {
    donations
        .iter()
        .filter(|d| d.status == DonationStatus::Completed)
}

fn settled_at(donation: &donation_entity::Model) -> DateTime<Utc> {
    donation.completed_at.unwrap_or(donation.created_at)
}

/// Sums completed donations per period, oldest bucket first.
#[must_use]
pub fn sum_by_period(donations: &[donation_entity::Model], period: Period) -> Vec<PeriodTotal> {
    let mut buckets: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for d in completed(donations) {
        let entry = buckets.entry(bucket_key(settled_at(d), period)).or_default();
        entry.0 += d.amount;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(key, (total, count))| PeriodTotal { key, total, count })
        .collect()
}

/// The `n` campaigns with the largest completed totals.
///
/// Ties are broken by the lower campaign id.
#[must_use]
pub fn top_campaigns(donations: &[donation_entity::Model], n: usize) -> Vec<CampaignTotal> {
    let mut totals: HashMap<i64, (f64, u64)> = HashMap::new();
    for d in completed(donations) {
        let entry = totals.entry(d.campaign_id).or_default();
        entry.0 += d.amount;
        entry.1 += 1;
    }

    let mut ranked: Vec<CampaignTotal> = totals
        .into_iter()
        .map(|(campaign_id, (total, count))| CampaignTotal {
            campaign_id,
            total,
            count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.campaign_id.cmp(&b.campaign_id))
    });
    ranked.truncate(n);
    ranked
}

/// Total, count, mean and largest of the completed donations.
#[must_use]
pub fn summarize(donations: &[donation_entity::Model]) -> DonationSummary {
    let mut summary = DonationSummary::default();
    for d in completed(donations) {
        summary.total += d.amount;
        summary.count += 1;
        summary.largest = summary.largest.max(d.amount);
    }
    if summary.count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let count = summary.count as f64;
        summary.average = summary.total / count;
    }
    summary
}

fn completed_filter() -> DonationFilter {
    DonationFilter {
        status: Some(DonationStatus::Completed),
        ..DonationFilter::default()
    }
}

/// A donor's completed donations bucketed by period.
pub async fn donor_totals_by_period(
    db: &DatabaseConnection,
    donor_id: &str,
    period: Period,
) -> Result<Vec<PeriodTotal>> {
    let filter = DonationFilter {
        donor_id: Some(donor_id.to_string()),
        ..completed_filter()
    };
    let rows = donation::list_donations(db, &filter).await?;
    Ok(sum_by_period(&rows, period))
}

/// A campaign's completed donations bucketed by period.
pub async fn campaign_totals_by_period(
    db: &DatabaseConnection,
    campaign_id: i64,
    period: Period,
) -> Result<Vec<PeriodTotal>> {
    let filter = DonationFilter {
        campaign_id: Some(campaign_id),
        ..completed_filter()
    };
    let rows = donation::list_donations(db, &filter).await?;
    Ok(sum_by_period(&rows, period))
}

/// The `n` campaigns that raised the most across all donations.
pub async fn top_campaigns_overall(
    db: &DatabaseConnection,
    n: usize,
) -> Result<Vec<CampaignTotal>> {
    let rows = donation::list_donations(db, &completed_filter()).await?;
    Ok(top_campaigns(&rows, n))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn settled(id: i64, campaign_id: i64, amount: f64, when: DateTime<Utc>) -> donation_entity::Model {
        let mut d = sample_donation_model(id, amount);
        d.campaign_id = campaign_id;
        d.status = DonationStatus::Completed;
        d.created_at = when;
        d.completed_at = Some(when);
        d
    }

    #[test]
    fn test_bucket_key() {
        let ts = at(2024, 3, 7);
        assert_eq!(bucket_key(ts, Period::Day), "2024-03-07");
        assert_eq!(bucket_key(ts, Period::Month), "2024-03");
        assert_eq!(bucket_key(ts, Period::Year), "2024");
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!("Month".parse::<Period>().unwrap(), Period::Month);
        assert_eq!(" daily ".parse::<Period>().unwrap(), Period::Day);
        assert!(matches!(
            "week".parse::<Period>().unwrap_err(),
            Error::Validation { field: "period", .. }
        ));
    }

    #[test]
    fn test_sum_by_period_buckets_ascending() {
        let donations = vec![
            settled(1, 1, 10.0, at(2024, 5, 1)),
            settled(2, 1, 20.0, at(2024, 3, 15)),
            settled(3, 2, 5.0, at(2024, 3, 2)),
            settled(4, 2, 7.5, at(2023, 12, 31)),
        ];

        let totals = sum_by_period(&donations, Period::Month);
        let keys: Vec<&str> = totals.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-03", "2024-05"]);
        assert_eq!(totals[1].total, 25.0);
        assert_eq!(totals[1].count, 2);

        let yearly = sum_by_period(&donations, Period::Year);
        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly[1].total, 35.0);
    }

    #[test]
    fn test_sum_by_period_skips_unsettled() {
        let mut pending = settled(1, 1, 100.0, at(2024, 1, 1));
        pending.status = DonationStatus::Pending;
        let mut failed = settled(2, 1, 100.0, at(2024, 1, 1));
        failed.status = DonationStatus::Failed;
        let ok = settled(3, 1, 1.0, at(2024, 1, 1));

        let totals = sum_by_period(&[pending, failed, ok], Period::Day);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, 1.0);
        assert!(sum_by_period(&[], Period::Day).is_empty());
    }

    #[test]
    fn test_sum_by_period_uses_completion_time() {
        // Created in January, settled in February
        let mut d = settled(1, 1, 10.0, at(2024, 2, 1));
        d.created_at = at(2024, 1, 31);
        let totals = sum_by_period(&[d], Period::Month);
        assert_eq!(totals[0].key, "2024-02");
    }

    #[test]
    fn test_top_campaigns_order_and_ties() {
        let now = at(2024, 1, 1);
        let donations = vec![
            settled(1, 3, 50.0, now),
            settled(2, 1, 30.0, now),
            settled(3, 1, 20.0, now),
            settled(4, 2, 10.0, now),
            settled(5, 4, 5.0, now),
        ];

        let top = top_campaigns(&donations, 3);
        let ids: Vec<i64> = top.iter().map(|c| c.campaign_id).collect();
        // Campaigns 1 and 3 tie at 50, lower id wins
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(top[0].count, 2);

        assert!(top_campaigns(&donations, 0).is_empty());
        assert_eq!(top_campaigns(&donations, 10).len(), 4);
    }

    #[test]
    fn test_summarize() {
        let now = at(2024, 1, 1);
        let mut failed = settled(4, 1, 999.0, now);
        failed.status = DonationStatus::Failed;
        let summary = summarize(&[
            settled(1, 1, 10.0, now),
            settled(2, 1, 30.0, now),
            settled(3, 2, 20.0, now),
            failed,
        ]);

        assert_eq!(summary.total, 60.0);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, 20.0);
        assert_eq!(summary.largest, 30.0);

        assert_eq!(summarize(&[]), DonationSummary::default());
    }

    #[tokio::test]
    async fn test_totals_from_database() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, campaign) = setup_with_active_campaign(&db).await?;
        create_test_user(&db, "donor").await?;
        create_test_user(&db, "other").await?;
        create_completed_donation(&db, campaign.id, "donor", 25.0).await?;
        create_completed_donation(&db, campaign.id, "donor", 15.0).await?;
        create_completed_donation(&db, campaign.id, "other", 5.0).await?;

        let mine = donor_totals_by_period(&db, "donor", Period::Year).await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].total, 40.0);
        assert_eq!(mine[0].count, 2);

        let all = campaign_totals_by_period(&db, campaign.id, Period::Day).await?;
        assert_eq!(all.iter().map(|t| t.total).sum::<f64>(), 45.0);

        let top = top_campaigns_overall(&db, 5).await?;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].campaign_id, campaign.id);
        assert_eq!(top[0].total, 45.0);

        Ok(())
    }
}
