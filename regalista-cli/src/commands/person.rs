use anyhow::Result;
use chrono::Local;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use regalista_core::birthday::parse_birthday_or_default;
use regalista_core::intent::{Intent, PersonEdit};
use regalista_core::reminder::calendar_reminder_url;
use regalista_core::{Person, PersonColor};

use super::{birthday_from_args, find_person};
use crate::app::App;
use crate::render::render_person;

pub async fn add(
    app: &mut App,
    name: String,
    day: u32,
    month: &str,
    year: Option<i32>,
    color: &str,
) -> Result<()> {
    let birthday = birthday_from_args(day, month)?;
    let color: PersonColor = color.parse()?;

    let mut person = Person::new(&name, birthday, color);
    person.birth_year = year;
    let today = Local::now().date_naive();
    let line = render_person(&person, today);

    app.commit(Intent::AddPerson(person)).await?;
    println!("{} {}", "Added".green(), line);
    Ok(())
}

/// Raw `edit` flags, before they are checked against the current person.
#[derive(Debug, Default)]
pub struct EditArgs {
    pub name: Option<String>,
    pub day: Option<u32>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
}

/// Build the edit. A lone `--day` or `--month` keeps the other half of the
/// current birthday.
pub fn edit_from_args(current_birthday: &str, args: EditArgs) -> Result<PersonEdit> {
    let birthday = if args.day.is_some() || args.month.is_some() {
        let current = parse_birthday_or_default(current_birthday);
        let day = args.day.unwrap_or(current.day);
        let month = args.month.unwrap_or_else(|| current.month.to_string());
        Some(birthday_from_args(day, &month)?)
    } else {
        None
    };
    let color = args.color.as_deref().map(str::parse::<PersonColor>).transpose()?;

    Ok(PersonEdit {
        name: args.name,
        birthday,
        birth_year: args.year,
        color,
    })
}

pub async fn edit(app: &mut App, query: &str, args: EditArgs) -> Result<()> {
    let person = find_person(app.sync.people(), query)?;
    let person_id = person.id.clone();
    let edit = edit_from_args(&person.birthday, args)?;

    app.commit(Intent::UpdatePerson {
        person_id: person_id.clone(),
        edit,
    })
    .await?;

    print_person(app, &person_id);
    Ok(())
}

pub async fn remove(app: &mut App, query: &str, force: bool) -> Result<()> {
    let person = find_person(app.sync.people(), query)?;
    let person_id = person.id.clone();
    let name = person.name.clone();
    let gift_count = person.gifts.len();

    // Prompts would fight the shell for stdin.
    if !force && !app.interactive {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove {} and {} {}?",
                name,
                gift_count,
                if gift_count == 1 { "gift" } else { "gifts" }
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    app.commit(Intent::DeletePerson { person_id }).await?;
    println!("{} {}", "Removed".red(), name);
    Ok(())
}

pub async fn toggle_favorite(app: &mut App, query: &str) -> Result<()> {
    let person_id = find_person(app.sync.people(), query)?.id.clone();
    app.commit(Intent::ToggleFavorite {
        person_id: person_id.clone(),
    })
    .await?;

    print_person(app, &person_id);
    Ok(())
}

pub async fn remind(app: &mut App, query: &str) -> Result<()> {
    let person = find_person(app.sync.people(), query)?;
    let today = Local::now().date_naive();
    let url = calendar_reminder_url(person, today).ok_or_else(|| {
        anyhow::anyhow!("Cannot read the birthday of {} ({})", person.name, person.birthday)
    })?;
    let person_id = person.id.clone();

    println!("Open this URL to add the reminder:\n");
    println!("{}\n", url);

    if open::that(url.as_str()).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
        return Ok(());
    }

    app.commit(Intent::MarkReminderSet { person_id }).await
}

fn print_person(app: &App, person_id: &str) {
    if let Some(person) = app.sync.people().iter().find(|p| p.id == person_id) {
        println!("{}", render_person(person, Local::now().date_naive()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lone_day_keeps_current_month() {
        let args = EditArgs {
            day: Some(3),
            ..Default::default()
        };
        let edit = edit_from_args("15 de Mayo", args).unwrap();
        assert_eq!(edit.birthday.unwrap().to_string(), "3 de Mayo");
    }

    #[test]
    fn test_lone_month_on_unreadable_birthday() {
        let args = EditArgs {
            month: Some("abril".into()),
            ..Default::default()
        };
        let edit = edit_from_args("someday", args).unwrap();
        assert_eq!(edit.birthday.unwrap().to_string(), "1 de Abril");
    }

    #[test]
    fn test_no_date_flags_leave_birthday() {
        let args = EditArgs {
            color: Some("blue".into()),
            ..Default::default()
        };
        let edit = edit_from_args("15 de Mayo", args).unwrap();
        assert!(edit.birthday.is_none());
        assert_eq!(edit.color, Some(PersonColor::Blue));
    }
}
