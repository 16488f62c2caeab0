// Launch Library gateway implementation
use crate::application::launch_gateway::{
    FetchError, FormatError, LaunchGateway, LaunchPage, TransportError,
};
use crate::domain::launch::LaunchRecord;
use crate::domain::window::{wire_timestamp, ClockZone, DateWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpLaunchGateway {
    client: reqwest::Client,
    endpoint: String,
    page_size: usize,
    zone: ClockZone,
}

#[derive(Debug, Deserialize)]
struct RawLaunchPage {
    count: Option<Value>,
    results: Option<Vec<RawLaunch>>,
}

#[derive(Debug, Deserialize)]
struct RawLaunch {
    id: Option<Value>,
    name: Option<Value>,
    pad: Option<RawPad>,
    window_start: Option<Value>,
    window_end: Option<Value>,
    rocket: Option<RawRocket>,
}

#[derive(Debug, Deserialize)]
struct RawPad {
    location: Option<RawNamed>,
    latitude: Option<Value>,
    longitude: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRocket {
    configuration: Option<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    name: Option<Value>,
}

impl HttpLaunchGateway {
    pub fn new(endpoint: String, page_size: usize, zone: ClockZone) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            page_size,
            zone,
        }
    }

    fn build_page_url(&self, window: &DateWindow, offset: usize) -> Result<String, FetchError> {
        let (lower, upper) = window.bounds(&self.zone)?;
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{}limit={}&offset={}&window_start__gte={}&window_end__lte={}",
            self.endpoint,
            separator,
            self.page_size,
            offset,
            urlencoding::encode(&wire_timestamp(lower)),
            urlencoding::encode(&wire_timestamp(upper)),
        ))
    }

    async fn execute_query(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        Ok(response.text().await?)
    }

    fn normalize(&self, body: &str, offset: usize) -> Result<LaunchPage, FormatError> {
        let raw: RawLaunchPage = serde_json::from_str(body)?;

        let count = require(raw.count, "response", "count")?;
        let count = count
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| invalid("response", "count", "expected a non-negative integer"))?;
        let results = require(raw.results, "response", "results")?;

        if offset + results.len() > count {
            return Err(FormatError::PageOverrun {
                offset,
                returned: results.len(),
                count,
            });
        }

        let records = results
            .into_iter()
            .enumerate()
            .map(|(index, launch)| self.normalize_launch(launch, &format!("results[{}]", index)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LaunchPage {
            records,
            total_count: count,
        })
    }

    fn normalize_launch(&self, launch: RawLaunch, at: &str) -> Result<LaunchRecord, FormatError> {
        let id = identifier(require(launch.id, at, "id")?, at)?;
        let name = text(require(launch.name, at, "name")?, at, "name")?;

        let pad = require(launch.pad, at, "pad")?;
        let location = require(pad.location, at, "pad.location")?;
        let location = text(require(location.name, at, "pad.location.name")?, at, "pad.location.name")?;
        if location.trim().is_empty() {
            return Err(invalid(at, "pad.location.name", "location is blank"));
        }
        let latitude = coordinate(require(pad.latitude, at, "pad.latitude")?, at, "pad.latitude")?;
        let longitude = coordinate(require(pad.longitude, at, "pad.longitude")?, at, "pad.longitude")?;

        let window_start = instant(require(launch.window_start, at, "window_start")?, at, "window_start")?;
        let window_end = instant(require(launch.window_end, at, "window_end")?, at, "window_end")?;

        let rocket = require(launch.rocket, at, "rocket")?;
        let configuration = require(rocket.configuration, at, "rocket.configuration")?;
        let rocket_name = text(
            require(configuration.name, at, "rocket.configuration.name")?,
            at,
            "rocket.configuration.name",
        )?;

        Ok(LaunchRecord::new(
            id,
            name,
            location,
            self.zone.readable(window_start),
            self.zone.readable(window_end),
            rocket_name,
            latitude,
            longitude,
        ))
    }
}

#[async_trait]
impl LaunchGateway for HttpLaunchGateway {
    async fn fetch_page(&self, window: &DateWindow, offset: usize) -> Result<LaunchPage, FetchError> {
        let url = self.build_page_url(window, offset)?;
        tracing::debug!("Requesting launches: {}", url);

        let body = self.execute_query(&url).await.map_err(|e| {
            tracing::warn!("Launch API request for {} failed: {}", window, e);
            e
        })?;

        let page = self.normalize(&body, offset).map_err(|e| {
            tracing::warn!("Launch API returned an unusable page for {}: {}", window, e);
            e
        })?;

        tracing::debug!(
            "Received {} launches at offset {} of {} for {}",
            page.records.len(),
            offset,
            page.total_count,
            window
        );
        Ok(page)
    }
}

fn require<T>(value: Option<T>, at: &str, field: &str) -> Result<T, FormatError> {
    match value {
        // JSON null counts as missing
        Some(value) => Ok(value),
        None => Err(FormatError::MissingField {
            location: at.to_string(),
            field: field.to_string(),
        }),
    }
}

fn invalid(at: &str, field: &str, reason: &str) -> FormatError {
    FormatError::InvalidField {
        location: at.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn text(value: Value, at: &str, field: &str) -> Result<String, FormatError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(invalid(at, field, "expected a string")),
    }
}

/// Ids are opaque; numeric ids are kept as their decimal text.
fn identifier(value: Value, at: &str) -> Result<String, FormatError> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(at, "id", "expected a non-empty string or a number")),
    }
}

/// Pads report coordinates as strings; plain numbers are accepted too.
fn coordinate(value: Value, at: &str, field: &str) -> Result<f64, FormatError> {
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|degrees| degrees.is_finite())
        .ok_or_else(|| invalid(at, field, &format!("{} is not a coordinate", value)))
}

fn instant(value: Value, at: &str, field: &str) -> Result<DateTime<Utc>, FormatError> {
    let raw = text(value, at, field)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(at, field, &format!("{:?} is not an RFC 3339 timestamp: {}", raw, e)))
}
