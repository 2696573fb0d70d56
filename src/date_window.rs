use crate::error::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use chrono_english::Dialect;
use tracing::{debug, warn};

pub type Timestamp = DateTime<FixedOffset>;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Optional extra checks on the window. Both are off by default.
#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    pub enforce_to_in_past: bool,
    pub enforce_min_age: bool,
    pub min_age_days: i64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            enforce_to_in_past: false,
            enforce_min_age: false,
            min_age_days: 90,
        }
    }
}

pub fn fixed_offset(utc_offset_hours: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
        Error::Argument(format!("UTC offset of {} hours is out of range", utc_offset_hours))
    })
}

pub fn now_in(offset: &FixedOffset) -> Timestamp {
    Utc::now().with_timezone(offset)
}

/// Parse a free-form date string in the offset of `now`.
///
/// Absolute dates go through `dateparser` (date-only inputs resolve to
/// midnight); relative phrases such as "90 days ago" or "yesterday" are
/// resolved against `now`.
pub fn parse(input: &str, now: &Timestamp) -> Result<Timestamp> {
    let input = input.trim();
    let offset = now.offset();

    let absolute = match dateparser::parse_with(input, offset, NaiveTime::MIN) {
        Ok(utc) => return Ok(utc.with_timezone(offset)),
        Err(err) => err,
    };

    chrono_english::parse_date_string(input, *now, Dialect::Uk).map_err(|relative| {
        debug!("'{}' is neither absolute ({}) nor relative ({})", input, absolute, relative);
        Error::Parse {
            input: input.to_string(),
            reason: absolute.to_string(),
        }
    })
}

/// Whole days in `later - earlier`, floored toward negative infinity.
pub fn whole_days(later: &Timestamp, earlier: &Timestamp) -> i64 {
    let delta: Duration = *later - *earlier;
    delta.num_seconds().div_euclid(SECONDS_PER_DAY)
}

#[derive(Debug, Clone)]
pub struct DateWindow {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl DateWindow {
    /// Resolve `--from`/`--to`; a missing `--from` falls back to `default_from`.
    pub fn resolve(
        from: Option<&str>,
        to: &str,
        default_from: &str,
        now: &Timestamp,
    ) -> Result<Self> {
        let from = parse(from.unwrap_or(default_from), now)?;
        let to = parse(to, now)?;
        Ok(Self { from, to })
    }

    pub fn validate(&self, now: &Timestamp, policy: &WindowPolicy) -> Result<()> {
        let (from, to) = (&self.from, &self.to);

        if from.date_naive() >= now.date_naive() {
            return Err(Error::Argument(format!(
                "'--from' argument should present a date in the past: --from {}",
                from
            )));
        }

        if to.date_naive() >= now.date_naive() {
            if policy.enforce_to_in_past {
                return Err(Error::Argument(format!(
                    "'--to' argument should present a date in the past: --to {}",
                    to
                )));
            }
            warn!("'--to' ({}) is not in the past; continuing", to);
            return Ok(());
        }

        if to <= from {
            return Err(Error::Argument(
                "'--from' argument should present a date older than '--to' argument.".to_string(),
            ));
        }

        if whole_days(now, to) < policy.min_age_days || whole_days(now, from) < policy.min_age_days
        {
            if policy.enforce_min_age {
                return Err(Error::Argument(format!(
                    "'--from' and '--to' arguments should present dates older than {} days from now.",
                    policy.min_age_days
                )));
            }
            debug!(
                "Window {} .. {} is within {} days of now; continuing",
                from, to, policy.min_age_days
            );
        }

        Ok(())
    }

    /// `find` clauses selecting files modified inside the window, relative to `now`.
    pub fn mtime_clauses(&self, now: &Timestamp) -> String {
        let from_days = whole_days(now, &self.from);
        let to_days = whole_days(now, &self.to);

        let mut clauses = String::new();
        if from_days != 0 {
            clauses.push_str(&format!(" -mtime -{}", from_days + 1));
        }
        if to_days != 0 {
            clauses.push_str(&format!(" -mtime +{}", to_days - 1));
        }
        clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn offset() -> FixedOffset {
        fixed_offset(3).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        offset().with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_date_only_is_midnight_in_offset() {
        let ts = parse("2024-01-01", &at(2024, 6, 1)).unwrap();
        assert_eq!(ts, at(2024, 1, 1));
        assert_eq!(ts.offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse("not a date at all", &at(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.is_argument());
    }

    #[test]
    fn test_resolve_uses_default_from() {
        let window =
            DateWindow::resolve(None, "2024-01-01", "2010-01-01", &at(2024, 6, 1)).unwrap();
        assert_eq!(window.from, at(2010, 1, 1));
        assert_eq!(window.to, at(2024, 1, 1));
    }

    #[test]
    fn test_parse_relative_days_ago() {
        let now = offset().with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let ts = parse("90 days ago", &now).unwrap();
        assert_eq!(whole_days(&now, &ts), 90);
        assert_eq!(ts.offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_parse_yesterday() {
        let now = offset().with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let ts = parse("yesterday", &now).unwrap();
        assert_eq!(ts.date_naive(), at(2024, 5, 31).date_naive());
    }

    #[test]
    fn test_relative_window_validates() {
        let now = offset().with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let window =
            DateWindow::resolve(Some("200 days ago"), "90 days ago", "2010-01-01", &now).unwrap();
        assert!(window.from < window.to);
        assert!(window.validate(&now, &WindowPolicy::default()).is_ok());
        assert_eq!(window.mtime_clauses(&now), " -mtime -201 -mtime +89");
    }

    #[test]
    fn test_validate_accepts_ordered_past_window() {
        let now = at(2024, 6, 1);
        let window = DateWindow { from: at(2020, 1, 1), to: at(2023, 1, 1) };
        assert!(window.validate(&now, &WindowPolicy::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_from_today_or_later() {
        let now = at(2024, 6, 1);
        let window = DateWindow { from: at(2024, 6, 1), to: at(2024, 7, 1) };
        let err = window.validate(&now, &WindowPolicy::default()).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let now = at(2024, 6, 1);
        let window = DateWindow { from: at(2023, 1, 1), to: at(2022, 1, 1) };
        assert!(window.validate(&now, &WindowPolicy::default()).is_err());

        let equal = DateWindow { from: at(2023, 1, 1), to: at(2023, 1, 1) };
        assert!(equal.validate(&now, &WindowPolicy::default()).is_err());
    }

    #[test]
    fn test_future_to_is_inert_unless_enforced() {
        let now = at(2024, 6, 1);
        let window = DateWindow { from: at(2024, 1, 1), to: at(2024, 6, 10) };
        assert!(window.validate(&now, &WindowPolicy::default()).is_ok());

        let policy = WindowPolicy { enforce_to_in_past: true, ..WindowPolicy::default() };
        assert!(window.validate(&now, &policy).is_err());
    }

    #[test]
    fn test_min_age_is_inert_unless_enforced() {
        let now = at(2024, 6, 1);
        let window = DateWindow { from: at(2024, 1, 1), to: at(2024, 5, 1) };
        assert!(window.validate(&now, &WindowPolicy::default()).is_ok());

        let policy = WindowPolicy { enforce_min_age: true, ..WindowPolicy::default() };
        assert!(window.validate(&now, &policy).is_err());
    }

    #[test]
    fn test_whole_days_floors_negative_deltas() {
        let now = at(2024, 6, 1);
        let later_today = offset().with_ymd_and_hms(2024, 6, 1, 5, 0, 0).unwrap();
        assert_eq!(whole_days(&now, &at(2024, 5, 21)), 11);
        assert_eq!(whole_days(&now, &later_today), -1);
    }

    #[test]
    fn test_mtime_clauses() {
        let now = at(2024, 6, 1);
        let window = DateWindow { from: at(2024, 5, 1), to: at(2024, 5, 21) };
        assert_eq!(window.mtime_clauses(&now), " -mtime -32 -mtime +10");
    }

    #[test]
    fn test_mtime_clause_omitted_for_zero_delta() {
        let now = offset().with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let window = DateWindow { from: at(2024, 5, 1), to: at(2024, 6, 1) };
        assert_eq!(window.mtime_clauses(&now), " -mtime -32");
    }
}
