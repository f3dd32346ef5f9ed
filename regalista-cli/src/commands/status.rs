use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

pub fn run(app: &App) -> Result<()> {
    let people = app.sync.people();
    let gifts: usize = people.iter().map(|p| p.gifts.len()).sum();

    println!("{}", app.sync.status().render());
    println!(
        "   {}",
        format!("{} people, {} gift ideas", people.len(), gifts).dimmed()
    );
    Ok(())
}
