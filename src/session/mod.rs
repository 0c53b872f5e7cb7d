//! Session layer owning the live map state for a hosted cluster view.
//!
//! The map itself is a pure value; `MapSession` is the mutable owner: it
//! holds the current snapshot behind an `Arc`, applies removals, and swaps
//! in the next version so renderers mid-pass keep a consistent view.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::geometry::GridDims;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::map::{ClusterTableMap, Extracted, Locator};
use crate::metrics::MapMetrics;

/// Contract a host component satisfies to embed the cluster map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterContainerProps {
    pub cluster_id: String,
    pub display_name: String,
    pub dims: GridDims,
}

/// Configuration knobs for a map session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Optional structured logger used by the session.
    pub logger: Option<Logger>,
    /// Metrics accumulator shared with diagnostics code.
    pub metrics: Option<Arc<Mutex<MapMetrics>>>,
    /// Target field used when emitting log events.
    pub log_target: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            log_target: "cluster::session".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(MapMetrics::new())));
        }
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<MapMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Owner of the current map version for one hosted cluster view.
pub struct MapSession {
    props: ClusterContainerProps,
    current: Arc<ClusterTableMap>,
    version: u64,
    config: SessionConfig,
}

impl MapSession {
    pub fn new(props: ClusterContainerProps, map: ClusterTableMap, config: SessionConfig) -> Self {
        let session = Self {
            props,
            current: Arc::new(map),
            version: 0,
            config,
        };
        session.log_session_event(
            LogLevel::Info,
            "session_started",
            [
                json_kv("cluster", json!(session.props.cluster_id)),
                json_kv("dims", json!(session.current.dims().to_string())),
                json_kv("occupied", json!(session.current.occupied_count())),
            ],
        );
        if session.props.dims != session.current.dims() {
            session.log_session_event(
                LogLevel::Warn,
                "container_dims_mismatch",
                [
                    json_kv("container", json!(session.props.dims.to_string())),
                    json_kv("map", json!(session.current.dims().to_string())),
                ],
            );
        }
        session
    }

    pub fn props(&self) -> &ClusterContainerProps {
        &self.props
    }

    /// Snapshot handed to renderers. Stays valid across later removals.
    pub fn snapshot(&self) -> Arc<ClusterTableMap> {
        Arc::clone(&self.current)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Read-only lookup against the current snapshot.
    pub fn lookup(&self, locator: &Locator) -> Result<Extracted> {
        match self.current.extract_node(locator) {
            Ok(extracted) => {
                self.record_lookup(!extracted.is_empty());
                Ok(extracted)
            }
            Err(err) => {
                self.record_lookup(false);
                self.log_session_event(
                    LogLevel::Warn,
                    "stale_locator",
                    [json_kv("error", json!(err.to_string()))],
                );
                Err(err)
            }
        }
    }

    /// Remove the addressed node from the current snapshot. The swap to
    /// the next version happens only when the grid actually changed, so
    /// duplicate events leave the version untouched.
    pub fn remove(&mut self, locator: &Locator) -> Result<Extracted> {
        let (extracted, next) = match self.current.extract_and_remove_node(locator) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.log_session_event(
                    LogLevel::Warn,
                    "stale_locator",
                    [json_kv("error", json!(err.to_string()))],
                );
                return Err(err);
            }
        };

        let effective = next.fingerprint() != self.current.fingerprint();
        self.record_removal(effective);
        if effective {
            let node = extracted.node();
            let fields = [
                json_kv(
                    "node",
                    json!(node.map(|n| n.id().clone()).unwrap_or_default()),
                ),
                json_kv(
                    "kind",
                    json!(node.map(|n| n.kind().as_str()).unwrap_or("")),
                ),
                json_kv("version", json!(self.version + 1)),
            ];
            self.current = Arc::new(next);
            self.version += 1;
            self.log_session_event(LogLevel::Debug, "node_removed", fields);
        }
        Ok(extracted)
    }

    /// Wholesale replacement on refetch. The old snapshot stays alive for
    /// any renderer still holding it.
    pub fn replace(&mut self, map: ClusterTableMap) {
        self.current = Arc::new(map);
        self.version += 1;
        self.record_replacement();
        self.log_session_event(
            LogLevel::Info,
            "map_replaced",
            [
                json_kv("version", json!(self.version)),
                json_kv("occupied", json!(self.current.occupied_count())),
            ],
        );
    }

    /// Emit the current metric counters through the configured logger.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = format!("{}.metrics", self.config.log_target);
                let _ = logger.log_event(guard.snapshot().to_log_event(&target));
            }
        }
    }

    fn log_session_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, &self.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_lookup(&self, hit: bool) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_lookup(hit);
            }
        }
    }

    fn record_removal(&self, effective: bool) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_removal(effective);
            }
        }
    }

    fn record_replacement(&self) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_replacement();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MapLocation;
    use crate::logging::MemorySink;
    use crate::node::{ClusterNode, Workspace};

    fn ws(id: &str) -> ClusterNode {
        ClusterNode::Workspace(Workspace {
            id: id.into(),
            hostname: format!("{id}.cluster.local"),
        })
    }

    fn sample_map() -> ClusterTableMap {
        let mut builder = ClusterTableMap::builder(GridDims::new(2, 2)).unwrap();
        builder.place(ws("w1"), MapLocation::new(0, 0)).unwrap();
        builder.place(ws("w2"), MapLocation::new(0, 1)).unwrap();
        builder.build()
    }

    fn session_with_sink() -> (MapSession, MemorySink) {
        let sink = MemorySink::new();
        let mut config = SessionConfig::new();
        config.logger = Some(Logger::new(sink.clone()));
        config.enable_metrics();

        let props = ClusterContainerProps {
            cluster_id: "e1".into(),
            display_name: "Cluster E1".into(),
            dims: GridDims::new(2, 2),
        };
        (MapSession::new(props, sample_map(), config), sink)
    }

    #[test]
    fn remove_swaps_snapshot_and_bumps_version() {
        let (mut session, _sink) = session_with_sink();
        let before = session.snapshot();
        let locator = Locator::from(MapLocation::new(0, 1));

        let extracted = session.remove(&locator).unwrap();
        assert_eq!(extracted.node().unwrap().id(), "w2");
        assert_eq!(session.version(), 1);

        // The snapshot handed out before the removal is untouched.
        assert_eq!(
            before.extract_node(&locator).unwrap().node().unwrap().id(),
            "w2"
        );
        assert!(session.snapshot().extract_node(&locator).unwrap().is_empty());
    }

    #[test]
    fn duplicate_removal_keeps_version_and_counts_noop() {
        let (mut session, _sink) = session_with_sink();
        let locator = Locator::identity("w2");

        session.remove(&locator).unwrap();
        let again = session.remove(&locator).unwrap();
        assert!(again.is_empty());
        assert_eq!(session.version(), 1);

        let snap = session
            .config_mut()
            .metrics_handle()
            .unwrap()
            .lock()
            .unwrap()
            .snapshot();
        assert_eq!(snap.removals, 1);
        assert_eq!(snap.noop_removals, 1);
    }

    #[test]
    fn lookup_records_hits_and_misses() {
        let (session, _sink) = session_with_sink();

        session.lookup(&Locator::identity("w1")).unwrap();
        session.lookup(&Locator::identity("missing")).unwrap();
        let err = session.lookup(&MapLocation::new(9, 9).into());
        assert!(err.is_err());

        let snap = session
            .config
            .metrics_handle()
            .unwrap()
            .lock()
            .unwrap()
            .snapshot();
        assert_eq!(snap.lookups, 3);
        assert_eq!(snap.misses, 2);
    }

    #[test]
    fn replace_bumps_version_and_logs() {
        let (mut session, sink) = session_with_sink();
        session.replace(sample_map());
        assert_eq!(session.version(), 1);

        let messages: Vec<_> = sink.events().iter().map(|e| e.message.clone()).collect();
        assert!(messages.contains(&"session_started".to_string()));
        assert!(messages.contains(&"map_replaced".to_string()));
    }

    #[test]
    fn removal_emits_a_structured_event() {
        let (mut session, sink) = session_with_sink();
        session.remove(&Locator::identity("w1")).unwrap();

        let events = sink.events();
        let removed = events
            .iter()
            .find(|e| e.message == "node_removed")
            .expect("node_removed event");
        assert_eq!(removed.fields.get("node"), Some(&json!("w1")));
        assert_eq!(removed.fields.get("kind"), Some(&json!("workspace")));
    }

    #[test]
    fn container_dims_mismatch_is_logged() {
        let sink = MemorySink::new();
        let mut config = SessionConfig::new();
        config.logger = Some(Logger::new(sink.clone()));

        let props = ClusterContainerProps {
            cluster_id: "e2".into(),
            display_name: "Cluster E2".into(),
            dims: GridDims::new(5, 5),
        };
        let _session = MapSession::new(props, sample_map(), config);

        assert!(
            sink.events()
                .iter()
                .any(|e| e.message == "container_dims_mismatch")
        );
    }

    #[test]
    fn emit_metrics_logs_a_snapshot_event() {
        let (mut session, sink) = session_with_sink();
        session.remove(&Locator::identity("w1")).unwrap();
        session.emit_metrics();

        let events = sink.events();
        let metrics_event = events
            .iter()
            .find(|e| e.message == "session_metrics")
            .expect("metrics event");
        assert_eq!(metrics_event.target, "cluster::session.metrics");
        assert_eq!(metrics_event.fields.get("removals"), Some(&json!(1)));
    }
}
