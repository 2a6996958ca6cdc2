use super::domain::SponsorRecord;
use super::normalizer::{extract_rating, normalize_text, optional_text};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Streams register rows, yielding `None` for rows without an organisation name.
pub(crate) fn parse_records<R: Read>(
    reader: R,
) -> impl Iterator<Item = Result<Option<SponsorRecord>, csv::Error>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
        .into_deserialize::<RegisterRow>()
        .map(|row| row.map(RegisterRow::into_record))
}

#[derive(Debug, Deserialize)]
struct RegisterRow {
    #[serde(
        rename = "Organisation Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    name: Option<String>,
    #[serde(rename = "Town/City", default, deserialize_with = "empty_string_as_none")]
    town: Option<String>,
    #[serde(
        rename = "Type & Rating",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    type_and_rating: Option<String>,
    #[serde(rename = "Route", default, deserialize_with = "empty_string_as_none")]
    route: Option<String>,
}

impl RegisterRow {
    fn into_record(self) -> Option<SponsorRecord> {
        let name = normalize_text(self.name.as_deref()?);
        if name.is_empty() {
            return None;
        }

        Some(SponsorRecord {
            name,
            town: optional_text(self.town.as_deref()),
            route: optional_text(self.route.as_deref()),
            rating: extract_rating(self.type_and_rating.as_deref()),
            full_rating: self.type_and_rating,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
