// Launch domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counter bumped every time the feed starts a fresh initial load.
/// Records carry the generation they were ingested in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a record: its id plus the generation it was loaded in.
/// Ids are only unique inside one window's result set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub origin: Generation,
    pub id: String,
}

impl RecordKey {
    pub fn new(origin: Generation, id: impl Into<String>) -> Self {
        Self {
            origin,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    id: String,
    origin: Generation,
    name: String,
    location: String,
    country: String,
    window_start: String,
    window_end: String,
    rocket_name: String,
    latitude: f64,
    longitude: f64,
}

impl LaunchRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        name: String,
        location: String,
        window_start: String,
        window_end: String,
        rocket_name: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let country = derive_country(&location).to_string();
        Self {
            id,
            origin: Generation::default(),
            name,
            location,
            country,
            window_start,
            window_end,
            rocket_name,
            latitude,
            longitude,
        }
    }

    /// Stamp the record with the generation it is being ingested into.
    pub fn ingested(mut self, origin: Generation) -> Self {
        self.origin = origin;
        self
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.origin, self.id.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Generation {
        self.origin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn window_start(&self) -> &str {
        &self.window_start
    }

    pub fn window_end(&self) -> &str {
        &self.window_end
    }

    pub fn rocket_name(&self) -> &str {
        &self.rocket_name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Country part of a pad location: the text after the last comma, trimmed.
/// A location without a comma is its own country.
pub fn derive_country(location: &str) -> &str {
    location.rsplit(',').next().unwrap_or(location).trim()
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str, location: &str) -> LaunchRecord {
    LaunchRecord::new(
        id.to_string(),
        format!("Launch {id}"),
        location.to_string(),
        "9:07 • 5 January, 2024".to_string(),
        "10:07 • 5 January, 2024".to_string(),
        "Falcon 9 Block 5".to_string(),
        28.5,
        -80.5,
    )
}
