//! Core types for the optimizer

use aifi_corridors::{Country, ProviderKind};
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Time of day and week a transfer is priced at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeContext {
    /// 0-23
    pub hour_of_day: u32,

    /// Monday = 0 ... Sunday = 6
    pub day_of_week: u32,
}

impl TimeContext {
    pub fn new(hour_of_day: u32, day_of_week: u32) -> Self {
        Self {
            hour_of_day: hour_of_day % 24,
            day_of_week: day_of_week % 7,
        }
    }

    /// Current local time
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        Self::new(datetime.hour(), datetime.weekday().num_days_from_monday())
    }

    pub fn is_weekend(&self) -> bool {
        self.day_of_week >= 5
    }
}

/// A priced path through the corridor graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Countries in transfer order, no repeats
    pub path: Vec<Country>,

    /// Fee charged on each hop
    pub fees: Vec<f64>,

    pub total_fee: f64,

    /// Total fee as a percentage of the original amount
    pub fee_percent: f64,

    /// Sum of hop settlement times in hours
    pub estimated_time: f64,

    /// Product of hop reliabilities, 0-100
    pub reliability: f64,

    /// Provider used on each hop
    pub providers: Vec<ProviderKind>,
}

impl Route {
    /// Number of corridors traversed
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_direct(&self) -> bool {
        self.hop_count() == 1
    }

    /// Intermediate countries, excluding source and destination
    pub fn intermediaries(&self) -> &[Country] {
        if self.path.len() <= 2 {
            &[]
        } else {
            &self.path[1..self.path.len() - 1]
        }
    }

    /// Path rendered as `A -> B -> C`
    pub fn path_display(&self) -> String {
        self.path
            .iter()
            .map(Country::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Outcome of a successful route search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub source_country: Country,
    pub destination_country: Country,
    pub original_amount: f64,

    /// `original_amount - best_route.total_fee`, not floored at zero
    pub amount_received: f64,

    pub best_route: Route,

    /// Next-cheapest routes, cheapest first
    pub alternative_routes: Vec<Route>,
}

impl std::fmt::Display for RoutePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let best = &self.best_route;
        writeln!(f, "Best route: {}", best.path_display())?;
        writeln!(
            f,
            "Total fee: ${:.2} ({:.2}%)",
            best.total_fee, best.fee_percent
        )?;
        writeln!(f, "Amount received: ${:.2}", self.amount_received)?;
        writeln!(f, "Estimated time: {:.1} hours", best.estimated_time)?;
        write!(f, "Reliability: {:.2}%", best.reliability)?;

        if !self.alternative_routes.is_empty() {
            write!(f, "\nAlternatives:")?;
            for route in &self.alternative_routes {
                write!(
                    f,
                    "\n  {}: fee ${:.2} ({:.2}%), {:.1} hours, {:.2}% reliable",
                    route.path_display(),
                    route.total_fee,
                    route.fee_percent,
                    route.estimated_time,
                    route.reliability
                )?;
            }
        }
        Ok(())
    }
}
