//! Operating-day parsing for the portal's weekday notation.
//!
//! The portal prints a free-text string containing single-character Korean
//! day tokens (월화수목금토일). A token appearing anywhere in the string
//! marks that weekday as operating. An absent token leaves the day false —
//! the source system does not distinguish "no information" from "does not
//! operate", so neither do we.

use serde::{Deserialize, Serialize};

/// Days of the week in the portal's fixed ordering (Monday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All seven days, Monday first — the column order used everywhere
    /// (JSON keys, CSV marker columns, tests).
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// The single-character token the portal prints for this day.
    pub fn portal_token(self) -> char {
        match self {
            Weekday::Mon => '월',
            Weekday::Tue => '화',
            Weekday::Wed => '수',
            Weekday::Thu => '목',
            Weekday::Fri => '금',
            Weekday::Sat => '토',
            Weekday::Sun => '일',
        }
    }
}

/// Per-weekday operating flags for one flight. All seven keys are always
/// present in the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperatingDays {
    /// Operates on Mondays.
    pub mon: bool,
    /// Operates on Tuesdays.
    pub tue: bool,
    /// Operates on Wednesdays.
    pub wed: bool,
    /// Operates on Thursdays.
    pub thu: bool,
    /// Operates on Fridays.
    pub fri: bool,
    /// Operates on Saturdays.
    pub sat: bool,
    /// Operates on Sundays.
    pub sun: bool,
}

impl OperatingDays {
    /// Parses the portal's day string. Pure, never fails: unknown input
    /// simply leaves every flag false.
    pub fn parse(text: &str) -> Self {
        let mut days = Self::default();
        for day in Weekday::ALL {
            if text.contains(day.portal_token()) {
                days.set(day, true);
            }
        }
        days
    }

    /// A schedule that operates every day of the week.
    pub fn every_day() -> Self {
        Self {
            mon: true,
            tue: true,
            wed: true,
            thu: true,
            fri: true,
            sat: true,
            sun: true,
        }
    }

    /// Reads the flag for one weekday.
    pub fn get(self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.mon,
            Weekday::Tue => self.tue,
            Weekday::Wed => self.wed,
            Weekday::Thu => self.thu,
            Weekday::Fri => self.fri,
            Weekday::Sat => self.sat,
            Weekday::Sun => self.sun,
        }
    }

    /// Sets the flag for one weekday.
    pub fn set(&mut self, day: Weekday, operates: bool) {
        match day {
            Weekday::Mon => self.mon = operates,
            Weekday::Tue => self.tue = operates,
            Weekday::Wed => self.wed = operates,
            Weekday::Thu => self.thu = operates,
            Weekday::Fri => self.fri = operates,
            Weekday::Sat => self.sat = operates,
            Weekday::Sun => self.sun = operates,
        }
    }

    /// The seven flags in fixed weekday order.
    pub fn flags(self) -> [(Weekday, bool); 7] {
        Weekday::ALL.map(|d| (d, self.get(d)))
    }
}
