//! Local timezone used for reset times.
//!
//! Detected once at startup: an explicit override wins, then `TZ`, then the
//! host zone reported by the OS. Detection failure falls back to UTC.

use chrono_tz::Tz;

use crate::error::{Result, UsageError};

/// How the timezone was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimezoneSource {
    /// `--timezone`, `ANTHROPIC_USAGE_TZ` or config file.
    Override,
    /// `TZ` variable or host settings.
    Detected,
    /// Detection failed.
    Fallback,
}

/// Timezone shared read-only by every reset computation in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimezone {
    tz: Tz,
    source: TimezoneSource,
}

impl ResolvedTimezone {
    #[must_use]
    pub const fn new(tz: Tz, source: TimezoneSource) -> Self {
        Self { tz, source }
    }

    /// UTC, used when nothing else is available.
    #[must_use]
    pub const fn utc() -> Self {
        Self::new(Tz::UTC, TimezoneSource::Fallback)
    }

    /// Resolve an override or detect from the host.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidTimezone`] only for a bad override.
    /// Detection itself never fails.
    pub fn resolve(override_name: Option<&str>) -> Result<Self> {
        match override_name {
            Some(name) => Self::from_name(name),
            None => Ok(Self::detect(std::env::var("TZ").ok().as_deref())),
        }
    }

    /// Parse an IANA name given by the user.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidTimezone`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        parse_zone(name)
            .map(|tz| Self::new(tz, TimezoneSource::Override))
            .ok_or_else(|| UsageError::InvalidTimezone(name.trim().to_string()))
    }

    /// Detect the host zone from a `TZ` value, then from the OS.
    #[must_use]
    pub fn detect(tz_env: Option<&str>) -> Self {
        if let Some(tz) = tz_env.and_then(parse_zone) {
            return Self::new(tz, TimezoneSource::Detected);
        }

        match detect_host_zone() {
            Ok(tz) => Self::new(tz, TimezoneSource::Detected),
            Err(e) => {
                tracing::debug!(error = %e, "Falling back to UTC");
                Self::utc()
            }
        }
    }

    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.tz
    }

    /// IANA name, e.g. `Europe/Berlin`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    #[must_use]
    pub const fn source(&self) -> TimezoneSource {
        self.source
    }
}

impl Default for ResolvedTimezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl std::fmt::Display for ResolvedTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `TZ` may carry a leading colon (`:Europe/Berlin`).
fn parse_zone(name: &str) -> Option<Tz> {
    let name = name.trim().trim_start_matches(':');
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok()
}

fn detect_host_zone() -> Result<Tz> {
    let name = iana_time_zone::get_timezone()
        .map_err(|e| UsageError::TimezoneDetection(e.to_string()))?;
    parse_zone(&name)
        .ok_or_else(|| UsageError::TimezoneDetection(format!("unrecognized zone '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_parses_iana_names() {
        let tz = ResolvedTimezone::from_name("America/Los_Angeles").unwrap();
        assert_eq!(tz.name(), "America/Los_Angeles");
        assert_eq!(tz.source(), TimezoneSource::Override);
    }

    #[test]
    fn bad_override_is_an_error() {
        assert!(matches!(
            ResolvedTimezone::from_name("Mars/Olympus_Mons"),
            Err(UsageError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn tz_env_is_used_first() {
        let tz = ResolvedTimezone::detect(Some(":Asia/Tokyo"));
        assert_eq!(tz.tz(), Tz::Asia__Tokyo);
        assert_eq!(tz.source(), TimezoneSource::Detected);
    }

    #[test]
    fn unknown_tz_env_still_resolves() {
        let tz = ResolvedTimezone::detect(Some("Nowhere/Special"));
        assert!(matches!(
            tz.source(),
            TimezoneSource::Detected | TimezoneSource::Fallback
        ));
    }

    #[test]
    fn default_is_utc_fallback() {
        let tz = ResolvedTimezone::default();
        assert_eq!(tz.name(), "UTC");
        assert_eq!(tz.source(), TimezoneSource::Fallback);
    }
}
