use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::utils::constants::MONTH_COLUMNS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Three-letter upper-case label, matching the rainfall table's columns
    pub fn label(&self) -> &'static str {
        MONTH_COLUMNS[self.index()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Month {
    type Err = ProcessingError;

    /// Accepts the three-letter label or the full name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|month| upper == month.label() || upper == month.name().to_uppercase())
            .ok_or_else(|| ProcessingError::InvalidFormat(format!("Unknown month: '{}'", s)))
    }
}
