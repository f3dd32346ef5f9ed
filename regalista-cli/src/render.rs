//! TUI rendering traits for regalista types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to regalista-core types using owo_colors.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use regalista_core::sync::{SyncState, SyncStatus};
use regalista_core::{Gift, GiftPriority, Person, PersonColor};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for PersonColor {
    fn render(&self) -> String {
        let dot = "●";
        match self {
            PersonColor::Slate => dot.bright_black().to_string(),
            PersonColor::Rose => dot.magenta().to_string(),
            PersonColor::Orange => dot.yellow().to_string(),
            PersonColor::Emerald => dot.green().to_string(),
            PersonColor::Blue => dot.blue().to_string(),
            PersonColor::Violet => dot.purple().to_string(),
        }
    }
}

impl Render for GiftPriority {
    fn render(&self) -> String {
        match self {
            GiftPriority::High => "alta".red().to_string(),
            GiftPriority::Medium => "media".yellow().to_string(),
            GiftPriority::Low => "baja".dimmed().to_string(),
        }
    }
}

impl Render for Gift {
    fn render(&self) -> String {
        let mut line = if self.is_purchased() {
            format!("✅ {}", self.name.strikethrough())
        } else {
            format!("⬜ {} {}", self.name, self.priority.render())
        };
        if let Some(price) = self.price {
            line.push_str(&format!(" {}", format_price(price).dimmed()));
        }
        if !self.description.is_empty() {
            line.push_str(&format!(" {}", self.description.dimmed()));
        }
        if let Some(link) = &self.link {
            line.push_str(&format!(" {}", link.underline()));
        }
        line
    }
}

impl Render for SyncState {
    fn render(&self) -> String {
        let label = self.to_string();
        match self {
            SyncState::Unlinked => label.dimmed().to_string(),
            SyncState::Linking | SyncState::LinkedSyncing => label.yellow().to_string(),
            SyncState::LinkedIdle => label.green().to_string(),
            SyncState::LinkedError => label.red().to_string(),
        }
    }
}

impl Render for SyncStatus {
    fn render(&self) -> String {
        let mut lines = vec![format!("Sync: {}", self.state.render())];

        if let Some(mode) = self.mode {
            let mode = format!("{:?}", mode).to_lowercase();
            lines.push(format!("   Mode: {}", mode));
        }
        if let Some(id) = &self.document_id {
            lines.push(format!("   Document: {}", id.dimmed()));
        }
        if self.push_pending {
            lines.push(format!("   {}", "Changes waiting to be pushed".yellow()));
        }
        if let Some(err) = &self.last_error {
            lines.push(format!("   {}", err.user_message().red()));
        }
        if self.reauth_required {
            lines.push(format!(
                "   Run {} to sign in again.",
                "regalista link".bold()
            ));
        }
        lines.join("\n")
    }
}

pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}€", price)
    } else {
        format!("{:.2}€", price)
    }
}

pub fn days_left_text(days: Option<u32>) -> String {
    match days {
        None => "fecha desconocida".dimmed().to_string(),
        Some(0) => "¡Es hoy!".green().bold().to_string(),
        Some(1) => "Falta 1 día".yellow().to_string(),
        Some(n) => format!("Faltan {} días", n),
    }
}

/// Short id used to pick people and gifts in commands.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// One summary line for a person plus their gifts, pending first.
pub fn render_person(person: &Person, today: NaiveDate) -> String {
    let star = if person.is_favorite { "★ " } else { "" };
    let year = person
        .birth_year
        .map(|y| format!(" {}", y))
        .unwrap_or_default();
    let reminder = if person.reminder_set { " 🔔" } else { "" };

    let mut lines = vec![format!(
        "{} {}{} {}{} · {}{}",
        person.color.render(),
        star.yellow(),
        person.name.bold(),
        person.birthday,
        year.dimmed(),
        days_left_text(person.days_until_birthday(today)),
        reminder,
    )];

    let budget = person.budget();
    if budget > 0.0 {
        lines.push(format!("   Presupuesto: {}", format_price(budget)));
    }
    for gift in person
        .pending_gifts()
        .into_iter()
        .chain(person.purchased_gifts())
    {
        lines.push(format!("   {} {}", short_id(&gift.id).dimmed(), gift.render()));
    }
    lines.push(format!("   {}", short_id(&person.id).dimmed()));

    lines.join("\n")
}
