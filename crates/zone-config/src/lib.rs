use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::{env, fmt};

pub const DEFAULT_HOME_RADIUS_M: f64 = 100.0;
pub const DEFAULT_HOME_ICON: &str = "mdi:home";
pub const DEFAULT_BUS_CAPACITY: usize = 1024;
pub const STATIC_ZONES_KEY: &str = "ZONE_STATIC_ZONES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_env(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "test" | "testing" => Self::Test,
            "staging" => Self::Staging,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub environment: Environment,
    pub region: Option<String>,
    pub bind_addr: String,
    pub metrics_addr: Option<String>,
    pub log_level: String,
    pub data_dir: String,
    pub bus_capacity: usize,
}

impl ServiceConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_source(default_service_name, &EnvSource)
    }

    pub fn from_source(default_service_name: &str, source: &dyn ConfigSource) -> Self {
        Self {
            service_name: source.string("ZONE_SERVICE_NAME", default_service_name),
            environment: Environment::from_env(&source.string("ZONE_ENV", "local")),
            region: source.get("ZONE_REGION"),
            bind_addr: source.string("ZONE_BIND_ADDR", "0.0.0.0:8080"),
            metrics_addr: source.get("ZONE_METRICS_ADDR"),
            log_level: source.string("ZONE_LOG_LEVEL", "info"),
            data_dir: source.string("ZONE_DATA_DIR", "/var/lib/zones"),
            bus_capacity: parsed::<usize>(source, "ZONE_BUS_CAPACITY")
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_BUS_CAPACITY),
        }
    }
}

/// Static circular home zone. Only present when both coordinates are configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeZoneConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub icon: String,
    pub passive: bool,
}

impl HomeZoneConfig {
    pub fn from_env() -> Option<Self> {
        Self::from_source(&EnvSource)
    }

    pub fn from_source(source: &dyn ConfigSource) -> Option<Self> {
        let latitude = parsed::<f64>(source, "ZONE_HOME_LATITUDE")?;
        let longitude = parsed::<f64>(source, "ZONE_HOME_LONGITUDE")?;
        Some(Self {
            name: source.string("ZONE_HOME_NAME", "Home"),
            latitude,
            longitude,
            radius_m: parsed::<f64>(source, "ZONE_HOME_RADIUS").unwrap_or(DEFAULT_HOME_RADIUS_M),
            icon: source.string("ZONE_HOME_ICON", DEFAULT_HOME_ICON),
            passive: flag(source, "ZONE_HOME_PASSIVE", false),
        })
    }
}

/// Additional static circular zone, read from a JSON list under
/// `ZONE_STATIC_ZONES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticZoneConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_static_radius")]
    pub radius: f64,
    #[serde(default)]
    pub passive: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_static_radius() -> f64 {
    DEFAULT_HOME_RADIUS_M
}

impl StaticZoneConfig {
    pub fn list_from_env() -> Result<Vec<Self>, serde_json::Error> {
        Self::list_from_source(&EnvSource)
    }

    /// An unset or blank value means no static zones; anything else must be
    /// a JSON array.
    pub fn list_from_source(source: &dyn ConfigSource) -> Result<Vec<Self>, serde_json::Error> {
        match source.get(STATIC_ZONES_KEY) {
            Some(value) if !value.trim().is_empty() => serde_json::from_str(&value),
            _ => Ok(Vec::new()),
        }
    }
}

/// Zone entered trigger: one watched zone, many tracked entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub zone: String,
    pub trackers: Vec<String>,
}

impl TriggerConfig {
    pub fn from_env() -> Option<Self> {
        Self::from_source(&EnvSource)
    }

    pub fn from_source(source: &dyn ConfigSource) -> Option<Self> {
        let zone = source.get("ZONE_TRIGGER_ZONE")?;
        let trackers = split_list(&source.get("ZONE_TRIGGER_TRACKERS").unwrap_or_default());
        if zone.trim().is_empty() || trackers.is_empty() {
            return None;
        }
        Some(Self {
            zone: zone.trim().to_string(),
            trackers,
        })
    }
}

/// Key/value lookup behind the `from_env` constructors.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

fn parsed<T: FromStr>(source: &dyn ConfigSource, key: &str) -> Option<T> {
    source.get(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn flag(source: &dyn ConfigSource, key: &str, default: bool) -> bool {
    match source.get(key) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
