use anyhow::Result;
use chrono::Local;
use regalista_core::intent::{GiftEdit, Intent};
use regalista_core::{Gift, GiftPriority};

use super::{find_gift, find_person};
use crate::GiftCommands;
use crate::app::App;
use crate::render::render_person;

pub async fn run(app: &mut App, command: GiftCommands) -> Result<()> {
    let person_query = match &command {
        GiftCommands::Add { person, .. }
        | GiftCommands::Edit { person, .. }
        | GiftCommands::Rm { person, .. }
        | GiftCommands::Toggle { person, .. } => person.clone(),
    };
    let person = find_person(app.sync.people(), &person_query)?;
    let person_id = person.id.clone();

    let intent = match command {
        GiftCommands::Add {
            name,
            price,
            description,
            link,
            priority,
            ..
        } => {
            let mut gift = Gift::new(&name);
            gift.price = price;
            gift.description = description.unwrap_or_default();
            gift.link = link.filter(|l| !l.trim().is_empty());
            gift.priority = priority.parse::<GiftPriority>()?;
            Intent::AddGift {
                person_id: person_id.clone(),
                gift,
            }
        }
        GiftCommands::Edit {
            gift,
            name,
            price,
            description,
            link,
            priority,
            ..
        } => Intent::EditGift {
            person_id: person_id.clone(),
            gift_id: find_gift(person, &gift)?.id.clone(),
            edit: GiftEdit {
                name,
                description,
                price,
                link,
                priority: priority.map(|p| p.parse::<GiftPriority>()).transpose()?,
            },
        },
        GiftCommands::Rm { gift, .. } => Intent::DeleteGift {
            person_id: person_id.clone(),
            gift_id: find_gift(person, &gift)?.id.clone(),
        },
        GiftCommands::Toggle { gift, .. } => Intent::ToggleGiftStatus {
            person_id: person_id.clone(),
            gift_id: find_gift(person, &gift)?.id.clone(),
        },
    };

    app.commit(intent).await?;

    if let Some(person) = app.sync.people().iter().find(|p| p.id == person_id) {
        println!("{}", render_person(person, Local::now().date_naive()));
    }
    Ok(())
}
