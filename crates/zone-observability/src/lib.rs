//! Log subscriber and Prometheus exporter setup for the zone services, and
//! the counters they record.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zone_config::ServiceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneMetric {
    Resolutions,
    LocationUpdates,
    EntryEvents,
    Mutations,
}

impl ZoneMetric {
    pub const ALL: [Self; 4] = [
        Self::Resolutions,
        Self::LocationUpdates,
        Self::EntryEvents,
        Self::Mutations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Resolutions => "zone_resolutions_total",
            Self::LocationUpdates => "zone_location_updates_total",
            Self::EntryEvents => "zone_entry_events_total",
            Self::Mutations => "zone_mutations_total",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Resolutions => "Active zone resolutions performed",
            Self::LocationUpdates => "Tracked entity location updates",
            Self::EntryEvents => "Zone entered events emitted",
            Self::Mutations => "Zone create, update and delete operations",
        }
    }
}

/// Label value of `zone_mutations_total{op}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Create,
    Update,
    Delete,
    Import,
}

impl MutationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        }
    }
}

pub fn record_resolution() {
    metrics::counter!(ZoneMetric::Resolutions.name()).increment(1);
}

pub fn record_location_update() {
    metrics::counter!(ZoneMetric::LocationUpdates.name()).increment(1);
}

pub fn record_zone_entered() {
    metrics::counter!(ZoneMetric::EntryEvents.name()).increment(1);
}

pub fn record_mutation(op: MutationOp) {
    metrics::counter!(ZoneMetric::Mutations.name(), "op" => op.as_str()).increment(1);
}

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("invalid metrics address {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
    #[error("failed to install prometheus exporter: {0}")]
    Install(#[from] BuildError),
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub metrics_addr: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_service(config: &ServiceConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            environment: config.environment.to_string(),
            log_level: config.log_level.clone(),
            metrics_addr: config.metrics_addr.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityHandle {
    pub service_name: String,
    pub environment: String,
    pub metrics_addr: Option<SocketAddr>,
}

impl ObservabilityHandle {
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_addr.is_some()
    }
}

/// Installs the global subscriber and, when an address is configured, the
/// Prometheus listener. Exporter failures only disable metrics.
pub fn init(config: &ObservabilityConfig) -> ObservabilityHandle {
    install_subscriber(&config.log_level);

    let metrics_addr = match install_exporter(config) {
        Ok(addr) => addr,
        Err(err) => {
            warn!(service = %config.service_name, error = %err, "metrics disabled");
            None
        }
    };
    if metrics_addr.is_some() {
        for metric in ZoneMetric::ALL {
            metrics::describe_counter!(metric.name(), metric.description());
        }
    }

    ObservabilityHandle {
        service_name: config.service_name.clone(),
        environment: config.environment.clone(),
        metrics_addr,
    }
}

pub fn log_startup(handle: &ObservabilityHandle) {
    info!(
        service = %handle.service_name,
        environment = %handle.environment,
        metrics_addr = ?handle.metrics_addr,
        "zone service starting"
    );
}

fn install_subscriber(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn install_exporter(config: &ObservabilityConfig) -> Result<Option<SocketAddr>, ExporterError> {
    let Some(raw) = config.metrics_addr.as_deref() else {
        return Ok(None);
    };
    let addr: SocketAddr = raw.trim().parse().map_err(|source| ExporterError::InvalidAddr {
        addr: raw.to_string(),
        source,
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", config.service_name.clone())
        .add_global_label("environment", config.environment.clone())
        .install()?;
    Ok(Some(addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn config(metrics_addr: Option<&str>) -> ObservabilityConfig {
        ObservabilityConfig {
            service_name: "zone-test".to_string(),
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            metrics_addr: metrics_addr.map(str::to_string),
        }
    }

    #[test]
    fn exporter_is_skipped_without_address() {
        assert!(matches!(install_exporter(&config(None)), Ok(None)));
    }

    #[test]
    fn invalid_metrics_address_is_reported() {
        let err = install_exporter(&config(Some("not-an-address"))).unwrap_err();
        assert!(matches!(err, ExporterError::InvalidAddr { ref addr, .. } if addr == "not-an-address"));
    }

    #[test]
    fn metric_names_are_unique() {
        let names: HashSet<_> = ZoneMetric::ALL.iter().map(|metric| metric.name()).collect();
        assert_eq!(names.len(), ZoneMetric::ALL.len());
    }

    #[test]
    fn config_follows_service_config() {
        let pairs: HashMap<String, String> = [
            ("ZONE_ENV".to_string(), "staging".to_string()),
            ("ZONE_METRICS_ADDR".to_string(), "127.0.0.1:9100".to_string()),
        ]
        .into_iter()
        .collect();
        let service = ServiceConfig::from_source("zone-api", &pairs);
        let config = ObservabilityConfig::from_service(&service);
        assert_eq!(config.service_name, "zone-api");
        assert_eq!(config.environment, "staging");
        assert_eq!(config.metrics_addr.as_deref(), Some("127.0.0.1:9100"));
    }

    #[test]
    fn recording_without_exporter_is_a_no_op() {
        record_resolution();
        record_location_update();
        record_zone_entered();
        record_mutation(MutationOp::Create);
    }
}
