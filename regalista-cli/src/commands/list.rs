use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use regalista_core::person::sort_by_upcoming;

use crate::app::App;
use crate::render::render_person;

pub fn run(app: &App) -> Result<()> {
    let people = app.sync.people();
    if people.is_empty() {
        println!(
            "{}",
            "No people yet. Add one with: regalista add <name> --day <d> --month <m>".dimmed()
        );
        return Ok(());
    }

    let today = Local::now().date_naive();
    let sorted = sort_by_upcoming(people, today);
    let (favorites, others): (Vec<_>, Vec<_>) = sorted.into_iter().partition(|p| p.is_favorite);

    if !favorites.is_empty() {
        println!("{}", "Favoritos".bold());
        for person in &favorites {
            println!("{}", render_person(person, today));
        }
        if !others.is_empty() {
            println!();
        }
    }

    for person in &others {
        println!("{}", render_person(person, today));
    }

    Ok(())
}
