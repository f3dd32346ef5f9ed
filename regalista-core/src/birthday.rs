//! Year-agnostic birthdays in the `"<day> de <Mes>"` format.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::RegalistaError;

pub const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const SEPARATOR: &str = " de ";

/// A day + month pair. The day is only checked against 1..=31; a day past
/// the end of its month rolls over into the next one when it is placed on a
/// calendar year (`29 de Febrero` lands on 1 March in non-leap years).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Birthday {
    pub day: u32,
    /// 1-based month number.
    pub month: u32,
}

/// 1-based month number for a month name, case-insensitive.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// Number of days offered when entering a birthday for `month`.
/// February allows 29 so leap-day birthdays can be recorded.
pub fn days_in_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl Birthday {
    pub fn new(day: u32, month: u32) -> Option<Self> {
        if (1..=31).contains(&day) && (1..=12).contains(&month) {
            Some(Birthday { day, month })
        } else {
            None
        }
    }

    /// Parse `"15 de Mayo"`. Commas are ignored and the month is matched
    /// case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.to_lowercase().replace(',', "");
        let parts: Vec<&str> = normalized.split(SEPARATOR).collect();
        let [day, month] = parts.as_slice() else {
            return None;
        };

        let day: u32 = day.trim().parse().ok()?;
        let month = month_number(month)?;
        Birthday::new(day, month)
    }

    /// Canonical month name, `None` when `month` is outside 1..=12.
    pub fn month_name(&self) -> Option<&'static str> {
        let index = self.month.checked_sub(1)?;
        MONTHS.get(index as usize).copied()
    }

    /// The date this birthday falls on in `year`.
    pub fn occurrence_in(&self, year: i32) -> Option<NaiveDate> {
        let offset = self.day.checked_sub(1)?;
        NaiveDate::from_ymd_opt(year, self.month, 1)?.checked_add_days(Days::new(u64::from(offset)))
    }

    /// Next occurrence on or after `today`.
    pub fn next_occurrence(&self, today: NaiveDate) -> Option<NaiveDate> {
        let this_year = self.occurrence_in(today.year())?;
        if this_year < today {
            self.occurrence_in(today.year() + 1)
        } else {
            Some(this_year)
        }
    }

    pub fn days_until(&self, today: NaiveDate) -> Option<u32> {
        let next = self.next_occurrence(today)?;
        u32::try_from((next - today).num_days()).ok()
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.month_name() {
            Some(month) => write!(f, "{}{}{}", self.day, SEPARATOR, month),
            None => write!(f, "{}{}{}", self.day, SEPARATOR, self.month),
        }
    }
}

impl FromStr for Birthday {
    type Err = RegalistaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Birthday::parse(s).ok_or_else(|| RegalistaError::InvalidBirthday(s.to_string()))
    }
}

/// Days from `today` until the birthday described by `birthday`, or `None`
/// when the string is not a recognizable birthday.
pub fn days_until_birthday(birthday: &str, today: NaiveDate) -> Option<u32> {
    Birthday::parse(birthday)?.days_until(today)
}

/// Lenient parse used by edit forms: anything unreadable becomes `1 de Enero`.
pub fn parse_birthday_or_default(birthday: &str) -> Birthday {
    Birthday::parse(birthday).unwrap_or(Birthday { day: 1, month: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        let b = Birthday::parse("15 de Mayo").unwrap();
        assert_eq!(b, Birthday { day: 15, month: 5 });
        assert_eq!(b.to_string(), "15 de Mayo");
    }

    #[test]
    fn test_parse_is_case_insensitive_and_ignores_commas() {
        assert_eq!(
            Birthday::parse("3 DE septiembre,"),
            Some(Birthday { day: 3, month: 9 })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in [
            "",
            "15 Mayo",
            "de Mayo",
            "quince de Mayo",
            "15 de Mayoo",
            "15 de Mayo de 1990",
            "0 de Enero",
            "32 de Enero",
        ] {
            assert_eq!(Birthday::parse(input), None, "{input:?}");
        }
    }

    #[test]
    fn test_days_until_is_none_for_unparseable() {
        assert_eq!(days_until_birthday("tomorrow", date(2025, 6, 1)), None);
    }

    #[test]
    fn test_days_until_today_is_zero() {
        assert_eq!(days_until_birthday("14 de Octubre", date(2026, 10, 14)), Some(0));
    }

    #[test]
    fn test_days_until_later_this_year() {
        assert_eq!(days_until_birthday("20 de Octubre", date(2026, 10, 14)), Some(6));
    }

    #[test]
    fn test_days_until_wraps_year_boundary() {
        assert_eq!(days_until_birthday("1 de Enero", date(2025, 12, 31)), Some(1));
    }

    #[test]
    fn test_days_until_passed_this_year() {
        // 13 Oct 2026 -> 13 Oct 2027
        assert_eq!(days_until_birthday("13 de Octubre", date(2026, 10, 14)), Some(364));
    }

    #[test]
    fn test_leap_day_rolls_over_in_common_years() {
        let b = Birthday::parse("29 de Febrero").unwrap();
        assert_eq!(b.occurrence_in(2025), Some(date(2025, 3, 1)));
        assert_eq!(b.occurrence_in(2028), Some(date(2028, 2, 29)));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2), 29);
        assert_eq!(days_in_month(4), 30);
        assert_eq!(days_in_month(12), 31);
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_birthday_or_default("nope").to_string(), "1 de Enero");
        assert_eq!(parse_birthday_or_default("2 de Julio").to_string(), "2 de Julio");
    }

    #[test]
    fn test_out_of_range_literal_does_not_panic() {
        let b = Birthday { day: 0, month: 0 };
        assert_eq!(b.month_name(), None);
        assert_eq!(b.occurrence_in(2026), None);
        assert_eq!(b.days_until(date(2026, 10, 14)), None);
        assert_eq!(b.to_string(), "0 de 0");

        let b = Birthday { day: 5, month: 13 };
        assert_eq!(b.next_occurrence(date(2026, 10, 14)), None);
    }
}
