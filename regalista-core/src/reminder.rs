//! Calendar reminder links for birthdays.

use chrono::{Days, NaiveDate};
use url::Url;

use crate::person::Person;

const CALENDAR_TEMPLATE_URL: &str = "https://calendar.google.com/calendar/render";

pub fn reminder_title(person: &Person) -> String {
    format!("Cumpleaños de {}", person.name)
}

/// A Google Calendar "add event" link for a yearly all-day event on the
/// next occurrence of the person's birthday. `None` when the birthday
/// cannot be parsed.
pub fn calendar_reminder_url(person: &Person, today: NaiveDate) -> Option<Url> {
    let start = person.parsed_birthday()?.next_occurrence(today)?;
    let end = start.checked_add_days(Days::new(1))?;
    let dates = format!("{}/{}", start.format("%Y%m%d"), end.format("%Y%m%d"));

    Url::parse_with_params(
        CALENDAR_TEMPLATE_URL,
        &[
            ("action", "TEMPLATE"),
            ("text", reminder_title(person).as_str()),
            ("dates", dates.as_str()),
            ("recur", "RRULE:FREQ=YEARLY"),
        ],
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::birthday::Birthday;
    use crate::person::PersonColor;

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_url_targets_next_occurrence() {
        let person = Person::new("Ana", Birthday::new(15, 5).unwrap(), PersonColor::Rose);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let url = calendar_reminder_url(&person, today).unwrap();

        assert_eq!(url.host_str(), Some("calendar.google.com"));
        assert_eq!(query(&url, "action").as_deref(), Some("TEMPLATE"));
        assert_eq!(query(&url, "dates").as_deref(), Some("20260515/20260516"));
        assert_eq!(query(&url, "recur").as_deref(), Some("RRULE:FREQ=YEARLY"));
        assert_eq!(query(&url, "text").as_deref(), Some("Cumpleaños de Ana"));
    }

    #[test]
    fn test_birthday_today_is_this_year() {
        let person = Person::new("Luis", Birthday::new(31, 12).unwrap(), PersonColor::Blue);
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let url = calendar_reminder_url(&person, today).unwrap();
        assert_eq!(query(&url, "dates").as_deref(), Some("20251231/20260101"));
    }

    #[test]
    fn test_unparseable_birthday_has_no_link() {
        let mut person = Person::new("Eva", Birthday::new(1, 1).unwrap(), PersonColor::Slate);
        person.birthday = "pronto".into();
        assert!(calendar_reminder_url(&person, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).is_none());
    }
}
