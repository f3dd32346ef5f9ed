//! User intents and how they transform the person list.
//!
//! Every intent produces a brand new list: the touched `Person` is rebuilt
//! and swapped in whole, so a failed intent never leaves a half-edited list
//! behind.

use crate::birthday::Birthday;
use crate::error::{RegalistaError, RegalistaResult};
use crate::person::{Gift, GiftPriority, Person, PersonColor};

/// Editable fields of a person. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct PersonEdit {
    pub name: Option<String>,
    pub birthday: Option<Birthday>,
    pub birth_year: Option<i32>,
    pub color: Option<PersonColor>,
}

/// Editable fields of a gift. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct GiftEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub priority: Option<GiftPriority>,
}

#[derive(Debug, Clone)]
pub enum Intent {
    AddPerson(Person),
    UpdatePerson { person_id: String, edit: PersonEdit },
    DeletePerson { person_id: String },
    ToggleFavorite { person_id: String },
    MarkReminderSet { person_id: String },
    AddGift { person_id: String, gift: Gift },
    EditGift { person_id: String, gift_id: String, edit: GiftEdit },
    DeleteGift { person_id: String, gift_id: String },
    ToggleGiftStatus { person_id: String, gift_id: String },
}

impl Intent {
    /// Apply the intent to `people`, returning the new list.
    pub fn apply(&self, people: &[Person]) -> RegalistaResult<Vec<Person>> {
        match self {
            Intent::AddPerson(person) => {
                validate_name(&person.name)?;
                if people.iter().any(|p| p.id == person.id) {
                    return Err(RegalistaError::DuplicateId(person.id.clone()));
                }
                let mut next = Vec::with_capacity(people.len() + 1);
                next.push(person.clone());
                next.extend_from_slice(people);
                Ok(next)
            }
            Intent::UpdatePerson { person_id, edit } => replace_person(people, person_id, |p| {
                if let Some(name) = &edit.name {
                    validate_name(name)?;
                    p.name = name.trim().to_string();
                }
                if let Some(birthday) = edit.birthday {
                    p.birthday = birthday.to_string();
                }
                if edit.birth_year.is_some() {
                    p.birth_year = edit.birth_year;
                }
                if let Some(color) = edit.color {
                    p.color = color;
                }
                Ok(())
            }),
            Intent::DeletePerson { person_id } => {
                find_person(people, person_id)?;
                Ok(people.iter().filter(|p| &p.id != person_id).cloned().collect())
            }
            Intent::ToggleFavorite { person_id } => replace_person(people, person_id, |p| {
                p.is_favorite = !p.is_favorite;
                Ok(())
            }),
            Intent::MarkReminderSet { person_id } => replace_person(people, person_id, |p| {
                p.reminder_set = true;
                Ok(())
            }),
            Intent::AddGift { person_id, gift } => replace_person(people, person_id, |p| {
                validate_name(&gift.name)?;
                validate_price(gift.price)?;
                if p.gift(&gift.id).is_some() {
                    return Err(RegalistaError::DuplicateId(gift.id.clone()));
                }
                p.gifts.push(gift.clone());
                Ok(())
            }),
            Intent::EditGift {
                person_id,
                gift_id,
                edit,
            } => replace_person(people, person_id, |p| {
                let gift = find_gift_mut(p, gift_id)?;
                if let Some(name) = &edit.name {
                    validate_name(name)?;
                    gift.name = name.trim().to_string();
                }
                if let Some(description) = &edit.description {
                    gift.description = description.clone();
                }
                if edit.price.is_some() {
                    validate_price(edit.price)?;
                    gift.price = edit.price;
                }
                if let Some(link) = &edit.link {
                    gift.link = (!link.trim().is_empty()).then(|| link.trim().to_string());
                }
                if let Some(priority) = edit.priority {
                    gift.priority = priority;
                }
                Ok(())
            }),
            Intent::DeleteGift { person_id, gift_id } => replace_person(people, person_id, |p| {
                find_gift_mut(p, gift_id)?;
                p.gifts.retain(|g| &g.id != gift_id);
                Ok(())
            }),
            Intent::ToggleGiftStatus { person_id, gift_id } => {
                replace_person(people, person_id, |p| {
                    let gift = find_gift_mut(p, gift_id)?;
                    gift.status = gift.status.toggled();
                    Ok(())
                })
            }
        }
    }
}

fn validate_name(name: &str) -> RegalistaResult<()> {
    if name.trim().is_empty() {
        return Err(RegalistaError::InvalidInput("Name must not be empty".into()));
    }
    Ok(())
}

fn validate_price(price: Option<f64>) -> RegalistaResult<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(RegalistaError::InvalidInput(format!(
            "Price must be a non-negative number, got {p}"
        ))),
        _ => Ok(()),
    }
}

fn find_person<'a>(people: &'a [Person], person_id: &str) -> RegalistaResult<&'a Person> {
    people
        .iter()
        .find(|p| p.id == person_id)
        .ok_or_else(|| RegalistaError::PersonNotFound(person_id.to_string()))
}

fn find_gift_mut<'a>(person: &'a mut Person, gift_id: &str) -> RegalistaResult<&'a mut Gift> {
    person
        .gifts
        .iter_mut()
        .find(|g| g.id == gift_id)
        .ok_or_else(|| RegalistaError::GiftNotFound(gift_id.to_string()))
}

/// Rebuild the person with `person_id` through `edit` and swap it in whole.
fn replace_person<F>(people: &[Person], person_id: &str, edit: F) -> RegalistaResult<Vec<Person>>
where
    F: FnOnce(&mut Person) -> RegalistaResult<()>,
{
    let mut updated = find_person(people, person_id)?.clone();
    edit(&mut updated)?;

    Ok(people
        .iter()
        .map(|p| {
            if p.id == person_id {
                updated.clone()
            } else {
                p.clone()
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Person {
        Person::new("Ana", Birthday { day: 15, month: 5 }, PersonColor::Rose)
    }

    fn with_gifts(mut person: Person, n: usize) -> Person {
        for i in 0..n {
            person.gifts.push(Gift::new(&format!("gift {i}")));
        }
        person
    }

    #[test]
    fn test_add_person_prepends() {
        let first = ana();
        let second = Person::new("Luis", Birthday { day: 1, month: 2 }, PersonColor::Blue);
        let list = Intent::AddPerson(first.clone()).apply(&[]).unwrap();
        let list = Intent::AddPerson(second.clone()).apply(&list).unwrap();
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[test]
    fn test_add_person_rejects_empty_name_and_duplicates() {
        let mut nameless = ana();
        nameless.name = "   ".into();
        assert!(matches!(
            Intent::AddPerson(nameless).apply(&[]),
            Err(RegalistaError::InvalidInput(_))
        ));

        let p = ana();
        let list = vec![p.clone()];
        assert!(matches!(
            Intent::AddPerson(p).apply(&list),
            Err(RegalistaError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_delete_person_removes_their_gifts() {
        let p = with_gifts(ana(), 3);
        let other = with_gifts(Person::new("Luis", Birthday { day: 1, month: 2 }, PersonColor::Blue), 1);
        let gift_ids: Vec<String> = p.gifts.iter().map(|g| g.id.clone()).collect();

        let list = Intent::DeletePerson {
            person_id: p.id.clone(),
        }
        .apply(&[p.clone(), other.clone()])
        .unwrap();

        assert_eq!(list, vec![other]);
        let remaining: Vec<&Gift> = list.iter().flat_map(|p| p.gifts.iter()).collect();
        assert!(remaining.iter().all(|g| !gift_ids.contains(&g.id)));
    }

    #[test]
    fn test_unknown_person_leaves_list_untouched() {
        let list = vec![ana()];
        let result = Intent::ToggleFavorite {
            person_id: "nope".into(),
        }
        .apply(&list);
        assert!(matches!(result, Err(RegalistaError::PersonNotFound(_))));
    }

    #[test]
    fn test_update_person_fields() {
        let p = ana();
        let list = Intent::UpdatePerson {
            person_id: p.id.clone(),
            edit: PersonEdit {
                name: Some("  Ana María ".into()),
                birthday: Some(Birthday { day: 2, month: 7 }),
                color: Some(PersonColor::Violet),
                ..Default::default()
            },
        }
        .apply(&[p])
        .unwrap();
        assert_eq!(list[0].name, "Ana María");
        assert_eq!(list[0].birthday, "2 de Julio");
        assert_eq!(list[0].color, PersonColor::Violet);
    }

    #[test]
    fn test_gift_lifecycle() {
        let p = ana();
        let pid = p.id.clone();
        let gift = Gift::new("Libro");
        let gid = gift.id.clone();

        let list = Intent::AddGift {
            person_id: pid.clone(),
            gift,
        }
        .apply(&[p])
        .unwrap();

        let list = Intent::EditGift {
            person_id: pid.clone(),
            gift_id: gid.clone(),
            edit: GiftEdit {
                price: Some(19.9),
                priority: Some(GiftPriority::High),
                link: Some("https://example.com/libro".into()),
                ..Default::default()
            },
        }
        .apply(&list)
        .unwrap();
        let g = list[0].gift(&gid).unwrap();
        assert_eq!(g.price, Some(19.9));
        assert_eq!(g.priority, GiftPriority::High);

        let list = Intent::ToggleGiftStatus {
            person_id: pid.clone(),
            gift_id: gid.clone(),
        }
        .apply(&list)
        .unwrap();
        assert!(list[0].gift(&gid).unwrap().is_purchased());

        let list = Intent::DeleteGift {
            person_id: pid,
            gift_id: gid,
        }
        .apply(&list)
        .unwrap();
        assert!(list[0].gifts.is_empty());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let p = ana();
        let mut gift = Gift::new("Libro");
        gift.price = Some(-1.0);
        let result = Intent::AddGift {
            person_id: p.id.clone(),
            gift,
        }
        .apply(&[p]);
        assert!(matches!(result, Err(RegalistaError::InvalidInput(_))));
    }
}
