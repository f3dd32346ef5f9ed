pub mod doctor;
pub mod gift;
pub mod link;
pub mod list;
pub mod person;
pub mod shell;
pub mod status;

use anyhow::Result;
use regalista_core::birthday::{self, Birthday};
use regalista_core::{Gift, Person, RegalistaError};

/// Find a person by id prefix or case-insensitive name.
pub fn find_person<'a>(people: &'a [Person], query: &str) -> Result<&'a Person> {
    let query = non_empty(query, "person")?;
    let lowered = query.to_lowercase();
    if let Some(person) = people.iter().find(|p| p.name.to_lowercase() == lowered) {
        return Ok(person);
    }

    let matches: Vec<&Person> = people.iter().filter(|p| p.id.starts_with(query)).collect();
    match matches.as_slice() {
        [person] => Ok(*person),
        [] => Err(RegalistaError::PersonNotFound(query.to_string()).into()),
        _ => anyhow::bail!("'{}' matches more than one person, use a longer id", query),
    }
}

/// Find one of `person`'s gifts by id prefix or case-insensitive name.
pub fn find_gift<'a>(person: &'a Person, query: &str) -> Result<&'a Gift> {
    let query = non_empty(query, "gift")?;
    let lowered = query.to_lowercase();
    if let Some(gift) = person.gifts.iter().find(|g| g.name.to_lowercase() == lowered) {
        return Ok(gift);
    }

    let matches: Vec<&Gift> = person.gifts.iter().filter(|g| g.id.starts_with(query)).collect();
    match matches.as_slice() {
        [gift] => Ok(*gift),
        [] => Err(RegalistaError::GiftNotFound(query.to_string()).into()),
        _ => anyhow::bail!("'{}' matches more than one gift, use a longer id", query),
    }
}

fn non_empty<'q>(query: &'q str, what: &str) -> Result<&'q str> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Give a {} name or id", what);
    }
    Ok(query)
}

/// Month by number (`5`) or name (`mayo`).
pub fn parse_month(value: &str) -> Result<u32> {
    if let Ok(n) = value.trim().parse::<u32>() {
        if (1..=12).contains(&n) {
            return Ok(n);
        }
    }
    birthday::month_number(value).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown month '{}'. Use a number or one of: {}",
            value,
            birthday::MONTHS.join(", ")
        )
    })
}

/// Build a birthday for entry, clamping the day to what the month allows.
pub fn birthday_from_args(day: u32, month: &str) -> Result<Birthday> {
    let month = parse_month(month)?;
    let day = day.clamp(1, birthday::days_in_month(month));
    Birthday::new(day, month).ok_or_else(|| anyhow::anyhow!("Invalid birthday"))
}
