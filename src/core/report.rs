//! Display formatting for amounts, progress and list lines.
//!
//! These helpers return plain strings so the bot layer can drop them straight
//! into replies. Nothing here touches the database.

use crate::{
    core::campaign::progress_percent,
    entities::{DonationStatus, campaign, donation},
};

/// Formats a dollar amount with thousands separators, e.g. `$1,234.50`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.004 rounds to 0.00 and should not carry a sign
    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`. The bar is
/// clamped to 0-100 but the label shows the real percentage, so an
/// over-funded campaign reads e.g. `[██████████] 120.0%`.
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = if progress_percent.is_finite() {
        progress_percent.clamp(0.0, 100.0)
    } else {
        0.0
    };

    // Cast safety: clamped_progress ∈ [0, 100], length is small (10-20).
    // Result is mathematically in [0, length], truncation/sign loss intentional for display.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// One-line campaign summary for list replies.
///
/// `#12 **Clean Water** [in_progress] $250.00 of $1,000.00 [██░░░░░░░░] 25.0%`
#[must_use]
pub fn format_campaign_line(campaign: &campaign::Model) -> String {
    format!(
        "#{} **{}** [{}] {} of {} {}",
        campaign.id,
        campaign.title,
        campaign.status,
        format_amount(campaign.donated_amount),
        format_amount(campaign.target_amount),
        format_progress_bar(progress_percent(campaign), None),
    )
}

/// One-line donation summary. `label` is the donor or campaign name to show.
#[must_use]
pub fn format_donation_line(donation: &donation::Model, label: &str) -> String {
    let date = donation
        .completed_at
        .unwrap_or(donation.created_at)
        .format("%Y-%m-%d");
    let mut line = format!(
        "#{} {date} {} | {label}",
        donation.id,
        format_amount(donation.amount)
    );
    if donation.status != DonationStatus::Completed {
        line.push_str(&format!(" ({})", donation.status));
    }
    if let Some(message) = &donation.message {
        line.push_str(&format!(" - \"{message}\""));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(5.0), "$5.00");
        assert_eq!(format_amount(999.999), "$1,000.00");
        assert_eq!(format_amount(1234.5), "$1,234.50");
        assert_eq!(format_amount(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_amount(123_456.78), "$123,456.78");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-5.0), "-$5.00");
        assert_eq!(format_amount(-1234.5), "-$1,234.50");
        assert_eq!(format_amount(-0.001), "$0.00");
    }

    #[test]
    fn test_format_progress_bar_full() {
        let bar = format_progress_bar(100.0, Some(10));
        assert_eq!(bar, "[██████████] 100.0%");
    }

    #[test]
    fn test_format_progress_bar_half() {
        let bar = format_progress_bar(50.0, Some(10));
        assert_eq!(bar, "[█████░░░░░] 50.0%");
    }

    #[test]
    fn test_format_progress_bar_overfunded() {
        let bar = format_progress_bar(120.0, Some(5));
        assert_eq!(bar, "[█████] 120.0%");
    }

    #[test]
    fn test_format_progress_bar_zero() {
        let bar = format_progress_bar(0.0, None);
        assert_eq!(bar, "[░░░░░░░░░░] 0.0%");
    }

    #[test]
    fn test_format_campaign_line() {
        let mut campaign = sample_campaign_model();
        campaign.id = 12;
        campaign.title = "Clean Water".to_string();
        campaign.target_amount = 1000.0;
        campaign.donated_amount = 250.0;

        let line = format_campaign_line(&campaign);
        assert_eq!(
            line,
            "#12 **Clean Water** [in_progress] $250.00 of $1,000.00 [███░░░░░░░] 25.0%"
        );
    }

    #[test]
    fn test_format_donation_line() {
        let mut donation = sample_donation_model(7, 1500.0);
        let line = format_donation_line(&donation, "Sam");
        assert!(line.starts_with("#7 "));
        assert!(line.ends_with("$1,500.00 | Sam"));

        donation.status = DonationStatus::Pending;
        donation.message = Some("Good luck".to_string());
        let line = format_donation_line(&donation, "Anonymous");
        assert!(line.ends_with("| Anonymous (pending) - \"Good luck\""));
    }
}
