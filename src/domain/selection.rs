// Selection domain model - launches the user has saved
use super::launch::{LaunchRecord, RecordKey};
use serde::Serialize;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Pad coordinates of one saved launch, for map plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinate {
    pub key: RecordKey,
    pub latitude: f64,
    pub longitude: f64,
}

/// Saved launches, unique by [`RecordKey`] and kept sorted by country.
///
/// Ties on country are ordered by key, so the order depends only on which
/// records are members and never on the order they were toggled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    members: Vec<LaunchRecord>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the record if it is saved, otherwise saves it.
    /// Returns whether the record is a member afterwards.
    pub fn toggle(&mut self, record: &LaunchRecord) -> bool {
        let key = record.key();
        let saved = match self.position(&key) {
            Some(index) => {
                self.members.remove(index);
                false
            }
            None => {
                self.members.push(record.clone());
                true
            }
        };
        sort_by_country(&mut self.members);
        saved
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&LaunchRecord> {
        self.position(key).map(|index| &self.members[index])
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaunchRecord> {
        self.members.iter()
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.members
            .iter()
            .map(|record| Coordinate {
                key: record.key(),
                latitude: record.latitude(),
                longitude: record.longitude(),
            })
            .collect()
    }

    fn position(&self, key: &RecordKey) -> Option<usize> {
        self.members
            .iter()
            .position(|member| member.origin() == key.origin && member.id() == key.id)
    }
}

/// Sorts launches by country (see [`compare_countries`]), then by key.
/// Stable, so equal records keep their relative order.
pub fn sort_by_country(records: &mut [LaunchRecord]) {
    records.sort_by(|a, b| {
        compare_countries(a.country(), b.country()).then_with(|| {
            a.origin()
                .cmp(&b.origin())
                .then_with(|| a.id().cmp(b.id()))
        })
    });
}

/// Locale-style comparison: base letters first (accents and case ignored),
/// then accents, then exact text.
pub fn compare_countries(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| lowercase(a).cmp(lowercase(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn lowercase(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase)
}
