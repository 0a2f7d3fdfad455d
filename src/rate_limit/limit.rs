//! Parsing of `"N/unit"` rate limit strings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid rate limit '{input}': {reason}")]
pub struct RateLimitParseError {
    input: String,
    reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Second,
    Minute,
    Hour,
    Day,
}

impl Period {
    pub fn seconds(&self) -> u64 {
        match self {
            Period::Second => 1,
            Period::Minute => 60,
            Period::Hour => 3600,
            Period::Day => 86_400,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Period::Second => "second",
            Period::Minute => "minute",
            Period::Hour => "hour",
            Period::Day => "day",
        }
    }
}

/// A request quota over a fixed window, e.g. 5 requests per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateLimit {
    pub count: u64,
    pub period: Period,
}

impl RateLimit {
    pub fn new(count: u64, period: Period) -> Self {
        Self { count, period }
    }

    pub fn window_seconds(&self) -> u64 {
        self.period.seconds()
    }

    /// Index of the fixed window containing `now` (unix seconds).
    pub fn window_index(&self, now: u64) -> u64 {
        now / self.window_seconds()
    }

    /// Seconds from `now` until the current window closes, at least 1.
    pub fn reset_after(&self, now: u64) -> u64 {
        let end = (self.window_index(now) + 1) * self.window_seconds();
        end.saturating_sub(now).max(1)
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.period.as_str())
    }
}

impl FromStr for RateLimit {
    type Err = RateLimitParseError;

    /// Accepts `5/minute`, `5 per minute`, `100/hours`, `2/Second`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| RateLimitParseError {
            input: s.to_string(),
            reason,
        };

        let normalized = s.trim().to_lowercase();
        let (count, unit) = normalized
            .split_once('/')
            .or_else(|| normalized.split_once(" per "))
            .ok_or_else(|| err("expected '<count>/<unit>'"))?;

        let count: u64 = count
            .trim()
            .parse()
            .map_err(|_| err("count must be a positive integer"))?;
        if count == 0 {
            return Err(err("count must be a positive integer"));
        }

        let period = match unit.trim().trim_end_matches('s') {
            "second" | "sec" => Period::Second,
            "minute" | "min" => Period::Minute,
            "hour" => Period::Hour,
            "day" => Period::Day,
            _ => return Err(err("unit must be second, minute, hour or day")),
        };

        Ok(RateLimit { count, period })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parses_common_forms() {
        assert_eq!("5/minute".parse(), Ok(RateLimit::new(5, Period::Minute)));
        assert_eq!("100 per hour".parse(), Ok(RateLimit::new(100, Period::Hour)));
        assert_eq!("2/Seconds".parse(), Ok(RateLimit::new(2, Period::Second)));
        assert_eq!(" 1000/day ".parse(), Ok(RateLimit::new(1000, Period::Day)));
    }

    #[test]
    fn test_rejects_malformed_limits() {
        assert!("".parse::<RateLimit>().is_err());
        assert!("five/minute".parse::<RateLimit>().is_err());
        assert!("0/minute".parse::<RateLimit>().is_err());
        assert!("5/fortnight".parse::<RateLimit>().is_err());
        assert!("5 minute".parse::<RateLimit>().is_err());
    }

    #[test]
    fn test_window_arithmetic() {
        let limit = RateLimit::new(5, Period::Minute);
        assert_eq!(limit.window_index(119), 1);
        assert_eq!(limit.window_index(120), 2);
        assert_eq!(limit.reset_after(119), 1);
        assert_eq!(limit.reset_after(120), 60);
        assert_eq!(limit.reset_after(150), 30);
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(count in 1u64..100_000, unit in 0usize..4) {
            let period = [Period::Second, Period::Minute, Period::Hour, Period::Day][unit];
            let limit = RateLimit::new(count, period);
            prop_assert_eq!(limit.to_string().parse::<RateLimit>(), Ok(limit));
        }

        #[test]
        fn prop_reset_after_within_window(now in 0u64..10_000_000, unit in 0usize..4) {
            let period = [Period::Second, Period::Minute, Period::Hour, Period::Day][unit];
            let limit = RateLimit::new(1, period);
            let reset = limit.reset_after(now);
            prop_assert!(reset >= 1 && reset <= limit.window_seconds());
        }
    }
}
