use crate::domain::window::ClockZone;
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://lldev.thespacedevs.com/2.2.0/launch/";
pub const DEFAULT_PAGE_SIZE: usize = 9999;

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub api: ApiSettings,
    pub server: ServerSettings,
    #[serde(default)]
    pub clock: ClockSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub endpoint: String,
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClockSettings {
    /// Offset such as `+02:00`; the system zone is used when absent.
    pub utc_offset: Option<String>,
}

impl ClockSettings {
    pub fn zone(&self) -> anyhow::Result<ClockZone> {
        match self.utc_offset.as_deref() {
            None => Ok(ClockZone::Local),
            Some(raw) => {
                let offset = raw
                    .parse::<FixedOffset>()
                    .with_context(|| format!("Invalid clock.utc_offset {:?}", raw))?;
                Ok(ClockZone::Fixed(offset))
            }
        }
    }
}

/// Defaults, then `config/feed.*`, then `LAUNCH_FEED__SECTION__KEY` variables.
pub fn load_feed_config() -> anyhow::Result<FeedConfig> {
    load_feed_config_from("config/feed")
}

pub fn load_feed_config_from(path: &str) -> anyhow::Result<FeedConfig> {
    let settings = config::Config::builder()
        .set_default("api.endpoint", DEFAULT_ENDPOINT)?
        .set_default("api.page_size", DEFAULT_PAGE_SIZE as u64)?
        .set_default("server.bind", "0.0.0.0:8080")?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("LAUNCH_FEED")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
