//! The look back windows used to filter the transaction history.

use std::{fmt::Display, str::FromStr};

use time::{Duration, Month, OffsetDateTime};

use crate::Error;

/// A relative window of time ending now, selected with a period tag such as
/// "last30".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    /// The last seven days.
    Last7Days,
    /// The last thirty days.
    #[default]
    Last30Days,
    /// The last ninety days.
    Last90Days,
    /// The last year.
    Last365Days,
}

impl Period {
    /// All periods, shortest first.
    pub const ALL: [Period; 4] = [
        Period::Last7Days,
        Period::Last30Days,
        Period::Last90Days,
        Period::Last365Days,
    ];

    /// The period tag used in URLs and forms.
    pub fn tag(&self) -> &'static str {
        match self {
            Period::Last7Days => "last7",
            Period::Last30Days => "last30",
            Period::Last90Days => "last90",
            Period::Last365Days => "last365",
        }
    }

    /// A human readable label for the period.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Last7Days => "Last 7 days",
            Period::Last30Days => "Last 30 days",
            Period::Last90Days => "Last 90 days",
            Period::Last365Days => "Last 365 days",
        }
    }

    /// The earliest point in time that falls within the period ending at `now`.
    ///
    /// The yearly period goes back one calendar year. 29 February has no
    /// counterpart in the previous year, so its cutoff rolls over to 1 March.
    pub fn cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            Period::Last7Days => now - Duration::days(7),
            Period::Last30Days => now - Duration::days(30),
            Period::Last90Days => now - Duration::days(90),
            Period::Last365Days => {
                let last_year = now.year() - 1;

                now.replace_year(last_year)
                    .or_else(|_| {
                        now.replace_day(1)
                            .and_then(|date| date.replace_month(Month::March))
                            .and_then(|date| date.replace_year(last_year))
                    })
                    .unwrap_or(now - Duration::days(365))
            }
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.tag() == s)
            .ok_or_else(|| Error::InvalidPeriod(s.to_owned()))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
