use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

use crate::service::natural_date::extract_datetime;

/// Turns message text into an absolute timestamp, or nothing.
pub trait DateTimeParser: Send + Sync {
    fn parse(&self, text: &str) -> Option<DateTime<FixedOffset>>;
}

#[derive(Debug, Clone, Copy)]
enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

/// Resolves relative expressions ("tomorrow at 4pm") against the current
/// time in the configured timezone.
#[derive(Debug, Clone)]
pub struct NaturalDateParser {
    timezone: Tz,
    clock: Clock,
}

impl NaturalDateParser {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            clock: Clock::System,
        }
    }

    /// Pins "now", so the same text always resolves to the same instant.
    pub fn with_fixed_now(timezone: Tz, now: DateTime<Utc>) -> Self {
        Self {
            timezone,
            clock: Clock::Fixed(now),
        }
    }

    fn now(&self) -> DateTime<Tz> {
        let utc = match self.clock {
            Clock::System => Utc::now(),
            Clock::Fixed(now) => now,
        };
        utc.with_timezone(&self.timezone)
    }
}

impl DateTimeParser for NaturalDateParser {
    fn parse(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        extract_datetime(text, &self.now()).map(|dt| dt.fixed_offset())
    }
}
