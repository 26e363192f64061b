//! The twelve fixed calendar months a ledger is bucketed by.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Calendar month without a year. Declaration order is calendar order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Januari,
    Februari,
    Mars,
    April,
    Maj,
    Juni,
    Juli,
    Augusti,
    September,
    Oktober,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Januari,
        Month::Februari,
        Month::Mars,
        Month::April,
        Month::Maj,
        Month::Juni,
        Month::Juli,
        Month::Augusti,
        Month::September,
        Month::Oktober,
        Month::November,
        Month::December,
    ];

    /// Swedish display name, also used as the serialized key.
    pub fn name(self) -> &'static str {
        match self {
            Month::Januari => "Januari",
            Month::Februari => "Februari",
            Month::Mars => "Mars",
            Month::April => "April",
            Month::Maj => "Maj",
            Month::Juni => "Juni",
            Month::Juli => "Juli",
            Month::Augusti => "Augusti",
            Month::September => "September",
            Month::Oktober => "Oktober",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Month::Januari => "January",
            Month::Februari => "February",
            Month::Mars => "March",
            Month::April => "April",
            Month::Maj => "May",
            Month::Juni => "June",
            Month::Juli => "July",
            Month::Augusti => "August",
            Month::September => "September",
            Month::Oktober => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// One-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when a string names none of the twelve months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(pub String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a month", self.0)
    }
}

impl std::error::Error for MonthParseError {}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Month::from_number(number).ok_or_else(|| MonthParseError(value.to_string()));
        }
        let lowered = trimmed.to_lowercase();
        Month::ALL
            .iter()
            .copied()
            .find(|month| {
                month.name().to_lowercase() == lowered
                    || month.english_name().to_lowercase() == lowered
            })
            .ok_or_else(|| MonthParseError(value.to_string()))
    }
}
