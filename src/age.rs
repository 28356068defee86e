//! Commit-age filtering.
//!
//! Bounds are given in calendar months and resolved against the local
//! calendar, so "3 months before May 31" is "February 28/29", not a fixed
//! 90-day span.

use chrono::{DateTime, Local, LocalResult, Months, TimeDelta, TimeZone, Utc};
use serde::Serialize;

/// Where a commit timestamp falls relative to an [`AgeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeVerdict {
    /// Inside every active bound.
    Within,
    /// At or after the older-than cutoff.
    TooRecent,
    /// Before the younger-than cutoff.
    TooOld,
}

/// The age bounds of a scan, resolved to absolute cutoffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeWindow {
    older_than_months: Option<u32>,
    younger_than_months: Option<u32>,
    older_cutoff: Option<DateTime<Utc>>,
    younger_cutoff: Option<DateTime<Utc>>,
}

impl AgeWindow {
    /// Resolve month bounds against `now`.
    ///
    /// * `older_than_months` - keep only commits strictly before
    ///   `now - N months`
    /// * `younger_than_months` - keep only commits at or after
    ///   `now - N months`
    pub fn new(
        now: DateTime<Local>,
        older_than_months: Option<u32>,
        younger_than_months: Option<u32>,
    ) -> Self {
        Self {
            older_than_months,
            younger_than_months,
            older_cutoff: older_than_months.map(|months| months_before(now, months)),
            younger_cutoff: younger_than_months.map(|months| months_before(now, months)),
        }
    }

    /// Get the older-than bound in months
    pub fn older_than_months(&self) -> Option<u32> {
        self.older_than_months
    }

    /// Get the younger-than bound in months
    pub fn younger_than_months(&self) -> Option<u32> {
        self.younger_than_months
    }

    /// Get the resolved older-than cutoff
    pub fn older_cutoff(&self) -> Option<DateTime<Utc>> {
        self.older_cutoff
    }

    /// Get the resolved younger-than cutoff
    pub fn younger_cutoff(&self) -> Option<DateTime<Utc>> {
        self.younger_cutoff
    }

    /// Classify a commit timestamp.
    ///
    /// The older bound is checked first, so a commit that violates both
    /// bounds (possible only when the bounds are inverted) counts as too
    /// recent.
    pub fn classify(&self, commit: DateTime<Utc>) -> AgeVerdict {
        if let Some(cutoff) = self.older_cutoff
            && commit >= cutoff
        {
            return AgeVerdict::TooRecent;
        }
        if let Some(cutoff) = self.younger_cutoff
            && commit < cutoff
        {
            return AgeVerdict::TooOld;
        }
        AgeVerdict::Within
    }

    /// Human-readable summary of the active bounds.
    pub fn describe(&self) -> String {
        describe_bounds(self.older_than_months, self.younger_than_months)
    }
}

/// Describe month bounds the way the report header shows them.
pub fn describe_bounds(older: Option<u32>, younger: Option<u32>) -> String {
    match (older, younger) {
        (Some(older), Some(younger)) => format!("{older}-{younger} months old"),
        (Some(older), None) => format!(">{older} months old"),
        (None, Some(younger)) => format!("<{younger} months old"),
        (None, None) => "all projects".to_string(),
    }
}

/// The instant `months` calendar months before `now` on the local calendar.
///
/// Saturates to the earliest representable instant when the subtraction
/// leaves chrono's range. A result that lands in a DST gap keeps the UTC
/// offset of `now`.
pub fn months_before(now: DateTime<Local>, months: u32) -> DateTime<Utc> {
    let Some(naive) = now.naive_local().checked_sub_months(Months::new(months)) else {
        return DateTime::<Utc>::MIN_UTC;
    };

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(time) => time.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let offset = TimeDelta::seconds(i64::from(now.offset().local_minus_utc()));
            Utc.from_utc_datetime(&(naive - offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn local(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_months_are_calendar_months() {
        let now = local(2024, 3, 31);
        assert_eq!(
            months_before(now, 1),
            local(2024, 2, 29).with_timezone(&Utc)
        );
        assert_eq!(
            months_before(now, 13),
            local(2023, 2, 28).with_timezone(&Utc)
        );
        assert_eq!(months_before(now, 0), now.with_timezone(&Utc));
    }

    #[test]
    fn test_huge_month_count_saturates() {
        let now = local(2024, 3, 31);
        assert_eq!(months_before(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_no_bounds_accepts_everything() {
        let window = AgeWindow::new(local(2024, 6, 15), None, None);
        assert_eq!(window.classify(Utc::now()), AgeVerdict::Within);
        assert_eq!(window.classify(DateTime::<Utc>::MIN_UTC), AgeVerdict::Within);
        assert_eq!(window.describe(), "all projects");
    }

    #[test]
    fn test_commit_at_older_cutoff_is_too_recent() {
        let window = AgeWindow::new(local(2024, 6, 15), Some(6), None);
        let cutoff = window.older_cutoff().unwrap();
        assert_eq!(cutoff, local(2023, 12, 15).with_timezone(&Utc));

        assert_eq!(window.classify(cutoff), AgeVerdict::TooRecent);
        assert_eq!(
            window.classify(cutoff - Duration::seconds(1)),
            AgeVerdict::Within
        );
        assert_eq!(
            window.classify(cutoff + Duration::seconds(1)),
            AgeVerdict::TooRecent
        );
    }

    #[test]
    fn test_commit_at_younger_cutoff_is_within() {
        let window = AgeWindow::new(local(2024, 6, 15), None, Some(2));
        let cutoff = window.younger_cutoff().unwrap();

        assert_eq!(window.classify(cutoff), AgeVerdict::Within);
        assert_eq!(
            window.classify(cutoff - Duration::seconds(1)),
            AgeVerdict::TooOld
        );
    }

    #[test]
    fn test_band_between_bounds() {
        let now = local(2024, 6, 15);
        let window = AgeWindow::new(now, Some(1), Some(6));

        let two_months = local(2024, 4, 15).with_timezone(&Utc);
        let two_weeks = (now - Duration::days(14)).with_timezone(&Utc);
        let one_year = local(2023, 6, 15).with_timezone(&Utc);

        assert_eq!(window.classify(two_months), AgeVerdict::Within);
        assert_eq!(window.classify(two_weeks), AgeVerdict::TooRecent);
        assert_eq!(window.classify(one_year), AgeVerdict::TooOld);
        assert_eq!(window.describe(), "1-6 months old");
    }

    #[test]
    fn test_describe_bounds() {
        assert_eq!(describe_bounds(Some(6), None), ">6 months old");
        assert_eq!(describe_bounds(None, Some(3)), "<3 months old");
        assert_eq!(describe_bounds(Some(3), Some(12)), "3-12 months old");
        assert_eq!(describe_bounds(None, None), "all projects");
    }
}
