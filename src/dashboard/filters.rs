//! List filters applied client-side over the full order list.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Duration, Months, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::order::{OperatingSystem, Order, OrderStatus};

/// How far back `updatedAt` may lie for an order to be listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl DateRange {
    /// Earliest accepted `updatedAt`, or `None` when the range is unbounded.
    ///
    /// `Today` starts at midnight in the timezone of `now`; `Month` steps
    /// back one calendar month.
    pub fn cutoff<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let cutoff = match self {
            Self::All => return None,
            Self::Today => start_of_day(now)?,
            Self::Week => now.clone().checked_sub_days(Days::new(7))?,
            Self::Month => now.clone().checked_sub_months(Months::new(1))?,
        };
        Some(cutoff.with_timezone(&Utc))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// First instant of the local day containing `now`.
///
/// When local midnight falls in a gap (clocks jumping forward), the day
/// starts where the gap ends: midnight read with the offset in force
/// before the jump.
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0)?;
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return Some(start);
    }
    let before = tz
        .offset_from_local_datetime(&(midnight - Duration::days(1)))
        .earliest()?
        .fix();
    let utc = midnight - Duration::seconds(i64::from(before.local_minus_utc()));
    Some(tz.from_utc_datetime(&utc))
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("Unknown date range \"{other}\"")),
        }
    }
}

/// Filter criteria for the order table. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub os: Option<OperatingSystem>,
    pub search: String,
    pub date_range: DateRange,
}

impl OrderFilters {
    /// Orders passing every active criterion, in their original order.
    pub fn apply<'a, Tz: TimeZone>(
        &self,
        orders: &'a [Order],
        now: &DateTime<Tz>,
    ) -> Vec<&'a Order> {
        let cutoff = self.date_range.cutoff(now);
        let needle = self.search.to_lowercase();
        orders
            .iter()
            .filter(|order| self.matches(order, &needle, cutoff))
            .collect()
    }

    fn matches(&self, order: &Order, needle: &str, cutoff: Option<DateTime<Utc>>) -> bool {
        if self.status.is_some() && order.status != self.status {
            return false;
        }
        if self.os.is_some() && order.os != self.os {
            return false;
        }
        if !needle.is_empty() && !matches_search(order, needle) {
            return false;
        }
        match cutoff {
            Some(cutoff) => order.updated_at.is_some_and(|at| at >= cutoff),
            None => true,
        }
    }
}

/// Case-insensitive substring match over the searchable columns.
fn matches_search(order: &Order, needle: &str) -> bool {
    [
        &order.transaction_id,
        &order.product_name,
        &order.ip_address,
        &order.username,
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
