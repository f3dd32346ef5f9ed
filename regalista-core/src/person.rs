//! People and the gift ideas attached to them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::birthday::{self, Birthday};
use crate::error::RegalistaError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonColor {
    #[default]
    Slate,
    Rose,
    Orange,
    Emerald,
    Blue,
    Violet,
}

impl PersonColor {
    pub const ALL: [PersonColor; 6] = [
        PersonColor::Slate,
        PersonColor::Rose,
        PersonColor::Orange,
        PersonColor::Emerald,
        PersonColor::Blue,
        PersonColor::Violet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PersonColor::Slate => "slate",
            PersonColor::Rose => "rose",
            PersonColor::Orange => "orange",
            PersonColor::Emerald => "emerald",
            PersonColor::Blue => "blue",
            PersonColor::Violet => "violet",
        }
    }
}

impl fmt::Display for PersonColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PersonColor {
    type Err = RegalistaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegalistaError::InvalidInput(format!("Unknown color '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl GiftPriority {
    /// Sort weight, higher first.
    pub fn weight(&self) -> u8 {
        match self {
            GiftPriority::High => 3,
            GiftPriority::Medium => 2,
            GiftPriority::Low => 1,
        }
    }
}

impl FromStr for GiftPriority {
    type Err = RegalistaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "alta" => Ok(GiftPriority::High),
            "medium" | "media" => Ok(GiftPriority::Medium),
            "low" | "baja" => Ok(GiftPriority::Low),
            other => Err(RegalistaError::InvalidInput(format!(
                "Unknown priority '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftStatus {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "comprado")]
    Purchased,
}

impl GiftStatus {
    pub fn toggled(self) -> Self {
        match self {
            GiftStatus::Pending => GiftStatus::Purchased,
            GiftStatus::Purchased => GiftStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub priority: GiftPriority,
    #[serde(default)]
    pub status: GiftStatus,
}

impl Gift {
    pub fn new(name: &str) -> Self {
        Gift {
            id: new_id(),
            name: name.trim().to_string(),
            description: String::new(),
            price: None,
            link: None,
            priority: GiftPriority::default(),
            status: GiftStatus::default(),
        }
    }

    pub fn is_purchased(&self) -> bool {
        self.status == GiftStatus::Purchased
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    /// `"<day> de <Mes>"`, see [`Birthday`].
    pub birthday: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub color: PersonColor,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub reminder_set: bool,
    #[serde(default)]
    pub gifts: Vec<Gift>,
}

impl Person {
    pub fn new(name: &str, birthday: Birthday, color: PersonColor) -> Self {
        Person {
            id: new_id(),
            name: name.trim().to_string(),
            birthday: birthday.to_string(),
            birth_year: None,
            color,
            is_favorite: false,
            reminder_set: false,
            gifts: Vec::new(),
        }
    }

    pub fn parsed_birthday(&self) -> Option<Birthday> {
        Birthday::parse(&self.birthday)
    }

    pub fn days_until_birthday(&self, today: NaiveDate) -> Option<u32> {
        birthday::days_until_birthday(&self.birthday, today)
    }

    pub fn gift(&self, gift_id: &str) -> Option<&Gift> {
        self.gifts.iter().find(|g| g.id == gift_id)
    }

    /// Pending gifts, highest priority first.
    pub fn pending_gifts(&self) -> Vec<&Gift> {
        let mut pending: Vec<&Gift> = self.gifts.iter().filter(|g| !g.is_purchased()).collect();
        pending.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));
        pending
    }

    pub fn purchased_gifts(&self) -> Vec<&Gift> {
        self.gifts.iter().filter(|g| g.is_purchased()).collect()
    }

    /// Sum of all known gift prices.
    pub fn budget(&self) -> f64 {
        self.gifts.iter().filter_map(|g| g.price).sum()
    }

    /// One-line digest of the gift list, e.g. `"Libro (20) [high]; Bufanda ✓"`.
    pub fn gift_summary(&self) -> String {
        self.gifts
            .iter()
            .map(|g| {
                let mut s = g.name.clone();
                if let Some(price) = g.price {
                    s.push_str(&format!(" ({price})"));
                }
                if g.is_purchased() {
                    s.push_str(" ✓");
                } else if g.priority != GiftPriority::Medium {
                    s.push_str(&format!(" [{:?}]", g.priority).to_lowercase());
                }
                s
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.birthday)
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// People ordered by how soon their birthday comes up; unreadable birthdays last.
pub fn sort_by_upcoming(people: &[Person], today: NaiveDate) -> Vec<&Person> {
    let mut sorted: Vec<&Person> = people.iter().collect();
    sorted.sort_by_key(|p| p.days_until_birthday(today).unwrap_or(u32::MAX));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, birthday: &str) -> Person {
        Person {
            birthday: birthday.to_string(),
            ..Person::new(name, Birthday { day: 1, month: 1 }, PersonColor::Rose)
        }
    }

    #[test]
    fn test_person_json_uses_camel_case() {
        let mut p = person("Ana", "15 de Mayo");
        p.is_favorite = true;
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["reminderSet"], false);
        assert_eq!(json["color"], "rose");
        assert!(json.get("birthYear").is_none());
    }

    #[test]
    fn test_legacy_gift_status_is_accepted() {
        let gift: Gift =
            serde_json::from_str(r#"{"id":"g1","name":"Libro","description":"","status":"comprado"}"#)
                .unwrap();
        assert_eq!(gift.status, GiftStatus::Purchased);
        assert_eq!(gift.priority, GiftPriority::Medium);
    }

    #[test]
    fn test_pending_gifts_sorted_by_priority() {
        let mut p = person("Ana", "15 de Mayo");
        for (name, priority) in [
            ("low", GiftPriority::Low),
            ("high", GiftPriority::High),
            ("medium", GiftPriority::Medium),
        ] {
            let mut g = Gift::new(name);
            g.priority = priority;
            p.gifts.push(g);
        }
        let mut bought = Gift::new("bought");
        bought.status = GiftStatus::Purchased;
        p.gifts.push(bought);

        let names: Vec<&str> = p.pending_gifts().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["high", "medium", "low"]);
        assert_eq!(p.purchased_gifts().len(), 1);
    }

    #[test]
    fn test_budget_ignores_missing_prices() {
        let mut p = person("Ana", "15 de Mayo");
        let mut a = Gift::new("a");
        a.price = Some(12.5);
        let b = Gift::new("b");
        let mut c = Gift::new("c");
        c.price = Some(7.5);
        p.gifts = vec![a, b, c];
        assert_eq!(p.budget(), 20.0);
    }

    #[test]
    fn test_sort_by_upcoming_puts_unknown_last() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let people = vec![
            person("Broken", "someday"),
            person("Later", "1 de Enero"),
            person("Soon", "20 de Octubre"),
        ];
        let names: Vec<&str> = sort_by_upcoming(&people, today)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Soon", "Later", "Broken"]);
    }

    #[test]
    fn test_color_from_str() {
        assert_eq!("Emerald".parse::<PersonColor>().unwrap(), PersonColor::Emerald);
        assert!("pink".parse::<PersonColor>().is_err());
    }
}
