//! Row layout of the remote spreadsheet.
//!
//! Row 1 is a fixed header, every following row is one person. `FULL_JSON`
//! holds the authoritative serialized `Person`; the other columns are
//! human-readable projections that are only read back when the JSON cell is
//! missing or corrupt.

use crate::error::SyncError;
use crate::person::{Person, PersonColor};

/// Well-known name the document is searched for and created under.
pub const DOCUMENT_TITLE: &str = "RegalistaDB_AppData";

pub const DEFAULT_SHEET_NAME: &str = "Personas";

pub const HEADER: [&str; 8] = [
    "ID",
    "NAME",
    "BIRTHDAY",
    "YEAR",
    "COLOR",
    "FAVORITE",
    "GIFT_SUMMARY",
    "FULL_JSON",
];

const COL_ID: usize = 0;
const COL_NAME: usize = 1;
const COL_BIRTHDAY: usize = 2;
const COL_YEAR: usize = 3;
const COL_COLOR: usize = 4;
const COL_FAVORITE: usize = 5;
const COL_FULL_JSON: usize = 7;

/// A1 range covering every column, e.g. `'Personas'!A1:H`.
pub fn full_range(sheet_name: &str) -> String {
    format!("'{}'!A1:H", sheet_name.replace('\'', "''"))
}

/// A1 range covering the data rows only.
pub fn data_range(sheet_name: &str) -> String {
    format!("'{}'!A2:H", sheet_name.replace('\'', "''"))
}

pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|h| h.to_string()).collect()
}

pub fn person_to_row(person: &Person) -> Result<Vec<String>, SyncError> {
    let full_json = serde_json::to_string(person)
        .map_err(|e| SyncError::provider(format!("Failed to serialize {}: {e}", person.name)))?;

    Ok(vec![
        person.id.clone(),
        person.name.clone(),
        person.birthday.clone(),
        person.birth_year.map(|y| y.to_string()).unwrap_or_default(),
        person.color.to_string(),
        if person.is_favorite { "TRUE" } else { "FALSE" }.to_string(),
        person.gift_summary(),
        full_json,
    ])
}

/// Header followed by one row per person.
pub fn people_to_rows(people: &[Person]) -> Result<Vec<Vec<String>>, SyncError> {
    let mut rows = Vec::with_capacity(people.len() + 1);
    rows.push(header_row());
    for person in people {
        rows.push(person_to_row(person)?);
    }
    Ok(rows)
}

/// Outcome of reading one spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowRead {
    /// The `FULL_JSON` cell parsed.
    Full(Person),
    /// Rebuilt from the projected columns, gifts lost.
    Reconstructed(Person),
    /// Nothing usable in the row.
    Skipped,
}

pub fn row_to_person(row: &[String]) -> RowRead {
    let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");

    let json = cell(COL_FULL_JSON);
    if !json.is_empty() {
        if let Ok(person) = serde_json::from_str::<Person>(json) {
            return RowRead::Full(person);
        }
    }

    let id = cell(COL_ID);
    let name = cell(COL_NAME);
    if id.is_empty() || name.is_empty() {
        return RowRead::Skipped;
    }

    RowRead::Reconstructed(Person {
        id: id.to_string(),
        name: name.to_string(),
        birthday: cell(COL_BIRTHDAY).to_string(),
        birth_year: cell(COL_YEAR).parse().ok(),
        color: cell(COL_COLOR).parse::<PersonColor>().unwrap_or_default(),
        is_favorite: cell(COL_FAVORITE).eq_ignore_ascii_case("true"),
        reminder_set: false,
        gifts: Vec::new(),
    })
}

/// Decode the values of a sheet (header included or not) into people.
/// Never fails: malformed rows are rebuilt from their columns or skipped.
pub fn rows_to_people(rows: &[Vec<String>]) -> Vec<Person> {
    let mut people = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if row.first().is_some_and(|c| c == HEADER[0]) && row.get(1).is_some_and(|c| c == HEADER[1]) {
            continue;
        }

        match row_to_person(row) {
            RowRead::Full(person) => people.push(person),
            RowRead::Reconstructed(person) => {
                let err = SyncError::malformed_row(i + 1, "unreadable FULL_JSON, gifts dropped");
                tracing::debug!(id = %person.id, %err, "rebuilt person from summary columns");
                people.push(person);
            }
            RowRead::Skipped => {
                if row.iter().any(|c| !c.trim().is_empty()) {
                    let err = SyncError::malformed_row(i + 1, "no id or name");
                    tracing::debug!(%err, "skipping row");
                }
            }
        }
    }

    people
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::birthday::Birthday;
    use crate::person::{Gift, GiftStatus};

    fn ana() -> Person {
        let mut p = Person::new("Ana", Birthday { day: 15, month: 5 }, PersonColor::Rose);
        p.is_favorite = true;
        p.birth_year = Some(1990);
        let mut libro = Gift::new("Libro");
        libro.price = Some(20.0);
        let mut bufanda = Gift::new("Bufanda");
        bufanda.status = GiftStatus::Purchased;
        p.gifts = vec![libro, bufanda];
        p
    }

    #[test]
    fn test_person_to_row_layout() {
        let p = ana();
        let row = person_to_row(&p).unwrap();
        assert_eq!(row.len(), HEADER.len());
        assert_eq!(row[COL_NAME], "Ana");
        assert_eq!(row[COL_BIRTHDAY], "15 de Mayo");
        assert_eq!(row[COL_YEAR], "1990");
        assert_eq!(row[COL_COLOR], "rose");
        assert_eq!(row[COL_FAVORITE], "TRUE");
        assert_eq!(row[6], "Libro (20); Bufanda ✓");
    }

    #[test]
    fn test_rows_skip_header_and_keep_gifts() {
        let people = vec![ana()];
        let rows = people_to_rows(&people).unwrap();
        assert_eq!(rows[0], header_row());
        assert_eq!(rows_to_people(&rows), people);
    }

    #[test]
    fn test_corrupt_json_falls_back_to_columns() {
        let p = ana();
        let mut row = person_to_row(&p).unwrap();
        row[COL_FULL_JSON] = "{\"id\": truncated".to_string();

        match row_to_person(&row) {
            RowRead::Reconstructed(rebuilt) => {
                assert_eq!(rebuilt.id, p.id);
                assert_eq!(rebuilt.name, "Ana");
                assert_eq!(rebuilt.birthday, "15 de Mayo");
                assert_eq!(rebuilt.color, PersonColor::Rose);
                assert!(rebuilt.is_favorite);
                assert!(rebuilt.gifts.is_empty());
            }
            other => panic!("expected reconstruction, got {other:?}"),
        }
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let rows = vec![
            vec!["p1".to_string(), "Luis".to_string()],
            vec![],
            vec!["".to_string(), "".to_string(), "3 de Marzo".to_string()],
        ];
        let people = rows_to_people(&rows);
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Luis");
        assert_eq!(people[0].color, PersonColor::Slate);
    }

    #[test]
    fn test_ranges_quote_sheet_name() {
        assert_eq!(full_range("Personas"), "'Personas'!A1:H");
        assert_eq!(data_range("Ana's"), "'Ana''s'!A2:H");
    }
}
