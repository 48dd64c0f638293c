//! Resolution of `--newer-than` style time expressions.
//!
//! Accepted grammar, in precedence order:
//! - empty string: defer to the caller's default window
//! - `all_time`: no lower bound
//! - `N_unit_ago` with unit `minute(s)`, `hour(s)`, `day(s)`, `week(s)`,
//!   `month(s)` or `year(s)`
//! - `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (both UTC) or an RFC 3339 timestamp
//!
//! `all_time` and unit names match ASCII case-insensitively.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::error::FilterError;

const ALL_TIME: &str = "all_time";
const AGO_SUFFIX: &str = "_ago";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of resolving a time expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBoundary {
    /// The expression was empty; the caller applies its own default.
    UseDefault,
    /// No lower bound on creation time.
    Unbounded,
    /// Items must have been created at or after this instant.
    At(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minute" | "minutes" => Some(Self::Minute),
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            "week" | "weeks" => Some(Self::Week),
            "month" | "months" => Some(Self::Month),
            "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Self::Minute => "minutes",
            Self::Hour => "hours",
            Self::Day => "days",
            Self::Week => "weeks",
            Self::Month => "months",
            Self::Year => "years",
        }
    }
}

/// A relative distance back in time, e.g. "6 months".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub count: u32,
    pub unit: TimeUnit,
}

impl Span {
    pub const fn new(count: u32, unit: TimeUnit) -> Self {
        Self { count, unit }
    }

    /// Subtract this span from `now`.
    ///
    /// Months and years use calendar arithmetic, clamping to the last valid
    /// day of the target month (March 31 minus one month is the end of
    /// February). Returns `None` when the result is not representable.
    pub fn before(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let n = i64::from(self.count);
        match self.unit {
            TimeUnit::Minute => now.checked_sub_signed(TimeDelta::try_minutes(n)?),
            TimeUnit::Hour => now.checked_sub_signed(TimeDelta::try_hours(n)?),
            TimeUnit::Day => now.checked_sub_signed(TimeDelta::try_days(n)?),
            TimeUnit::Week => now.checked_sub_signed(TimeDelta::try_weeks(n)?),
            TimeUnit::Month => now.checked_sub_months(Months::new(self.count)),
            TimeUnit::Year => now.checked_sub_months(Months::new(self.count.checked_mul(12)?)),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}{AGO_SUFFIX}", self.count, self.unit.plural())
    }
}

/// Where a resource's creation-time window starts when the user gives no
/// `--newer-than` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultWindow {
    Unbounded,
    Relative(Span),
    At(DateTime<Utc>),
}

impl DefaultWindow {
    /// The concrete lower bound at `now`, or `None` for no bound.
    ///
    /// A relative window reaching past the representable range is an
    /// `InvalidTimeExpression`, as it is when given on the command line.
    pub fn boundary_at(self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, FilterError> {
        match self {
            Self::Unbounded => Ok(None),
            Self::Relative(span) => span
                .before(now)
                .map(Some)
                .ok_or_else(|| FilterError::invalid_time(&span.to_string())),
            Self::At(at) => Ok(Some(at)),
        }
    }
}

impl FromStr for DefaultWindow {
    type Err = FilterError;

    /// Parse a configured default window using the time expression grammar.
    /// An empty string is rejected: a default cannot defer to itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.eq_ignore_ascii_case(ALL_TIME) {
            return Ok(Self::Unbounded);
        }
        if let Some(span) = parse_span(expr) {
            return Ok(Self::Relative(span));
        }
        parse_absolute(expr)
            .map(Self::At)
            .ok_or_else(|| FilterError::invalid_time(s))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve `expression` against the current wall-clock time.
pub fn resolve(expression: &str) -> Result<ResolvedBoundary, FilterError> {
    resolve_at(expression, Utc::now())
}

/// Resolve `expression` against an explicit `now`.
pub fn resolve_at(expression: &str, now: DateTime<Utc>) -> Result<ResolvedBoundary, FilterError> {
    let expr = expression.trim();
    if expr.is_empty() {
        return Ok(ResolvedBoundary::UseDefault);
    }
    if expr.eq_ignore_ascii_case(ALL_TIME) {
        return Ok(ResolvedBoundary::Unbounded);
    }
    if let Some(span) = parse_span(expr) {
        return span
            .before(now)
            .map(ResolvedBoundary::At)
            .ok_or_else(|| FilterError::invalid_time(expression));
    }
    parse_absolute(expr)
        .map(ResolvedBoundary::At)
        .ok_or_else(|| FilterError::invalid_time(expression))
}

/// Parse `N_unit_ago`. `N` must be plain ASCII digits: no sign, no spaces.
fn parse_span(expr: &str) -> Option<Span> {
    let lower = expr.to_ascii_lowercase();
    let rest = lower.strip_suffix(AGO_SUFFIX)?;
    let (count, unit) = rest.split_once('_')?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count = count.parse().ok()?;
    Some(Span::new(count, TimeUnit::parse(unit)?))
}

fn parse_absolute(expr: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(expr, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
