//! Reset countdowns and localized reset times.
//!
//! The clock samples "now" once, so every record in a run is measured
//! against the same instant.

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::models::{QueryOutcome, ResetInfo, UsageRecord};
use crate::core::timezone::ResolvedTimezone;
use crate::util::time::{format_breakdown, format_local};

/// Computes reset annotations against a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct ResetClock {
    now: DateTime<Utc>,
    timezone: ResolvedTimezone,
}

impl ResetClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>, timezone: ResolvedTimezone) -> Self {
        Self { now, timezone }
    }

    /// Clock pinned to the current instant.
    #[must_use]
    pub fn start(timezone: ResolvedTimezone) -> Self {
        Self::new(Utc::now(), timezone)
    }

    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub const fn timezone(&self) -> ResolvedTimezone {
        self.timezone
    }

    /// Time until `reset`, clamped at zero for instants already passed.
    #[must_use]
    pub fn time_remaining(&self, reset: DateTime<Utc>) -> TimeDelta {
        (reset - self.now).max(TimeDelta::zero())
    }

    /// `reset` rendered in the resolved timezone.
    #[must_use]
    pub fn local_reset_time(&self, reset: DateTime<Utc>) -> String {
        format_local(reset, self.timezone.tz())
    }

    /// Attach countdown and local time to a successful record.
    ///
    /// Failed records pass through unchanged.
    #[must_use]
    pub fn annotate(&self, mut record: UsageRecord) -> UsageRecord {
        if let QueryOutcome::Success(usage) = &mut record.outcome {
            let remaining = self.time_remaining(usage.reset_instant);
            usage.reset = Some(ResetInfo {
                time_remaining_secs: remaining.num_seconds(),
                time_remaining: format_breakdown(remaining),
                local_reset_time: self.local_reset_time(usage.reset_instant),
            });
        }
        record
    }

    /// Annotate every record, keeping order.
    #[must_use]
    pub fn annotate_all(&self, records: Vec<UsageRecord>) -> Vec<UsageRecord> {
        records.into_iter().map(|r| self.annotate(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ModelId, ModelUsage};
    use crate::core::timezone::TimezoneSource;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 2, 20, 0, 0).unwrap()
    }

    fn clock() -> ResetClock {
        ResetClock::new(
            now(),
            ResolvedTimezone::new(chrono_tz::America::Los_Angeles, TimezoneSource::Override),
        )
    }

    fn record(reset: DateTime<Utc>) -> UsageRecord {
        UsageRecord::success(
            ModelId::Claude35Sonnet,
            ModelUsage {
                total_tokens: 100_000,
                remaining_tokens: 25_000,
                reset_instant: reset,
                requests_limit: None,
                requests_remaining: None,
                reset: None,
            },
        )
    }

    #[test]
    fn annotates_successful_records() {
        let annotated = clock().annotate(record(now() + TimeDelta::seconds(3661)));
        let reset = annotated.usage().and_then(|u| u.reset.clone()).unwrap();
        assert_eq!(reset.time_remaining_secs, 3661);
        assert_eq!(reset.time_remaining, "1 hour 1 minute");
        assert_eq!(reset.local_reset_time, "2024-11-02 02:01:01 PM PDT");
    }

    #[test]
    fn past_reset_clamps_to_zero() {
        let annotated = clock().annotate(record(now() - TimeDelta::minutes(5)));
        let reset = annotated.usage().and_then(|u| u.reset.clone()).unwrap();
        assert_eq!(reset.time_remaining_secs, 0);
        assert_eq!(reset.time_remaining, "0 minutes");
    }

    #[test]
    fn failed_records_are_untouched() {
        let failed = UsageRecord::failed(ModelId::Claude3Opus, "HTTP 529");
        assert_eq!(clock().annotate(failed.clone()), failed);
    }

    #[test]
    fn annotate_all_keeps_order() {
        let records = vec![
            UsageRecord::failed(ModelId::Claude3Opus, "HTTP 529"),
            record(now() + TimeDelta::hours(2)),
        ];
        let annotated = clock().annotate_all(records);
        assert_eq!(annotated[0].model, ModelId::Claude3Opus);
        assert_eq!(annotated[1].model, ModelId::Claude35Sonnet);
        assert!(annotated[1].usage().unwrap().reset.is_some());
    }
}
