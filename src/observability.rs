use std::net::SocketAddr;

// ── Mutations ───────────────────────────────────────────────────

/// Counter: blocks inserted or updated.
pub const BLOCKS_SAVED_TOTAL: &str = "timetable_blocks_saved_total";

/// Counter: blocks removed after confirmation.
pub const BLOCKS_DELETED_TOTAL: &str = "timetable_blocks_deleted_total";

/// Counter: categories registered or updated.
pub const CATEGORIES_SAVED_TOTAL: &str = "timetable_categories_saved_total";

/// Counter: categories removed after confirmation.
pub const CATEGORIES_DELETED_TOTAL: &str = "timetable_categories_deleted_total";

// ── Interaction & storage ───────────────────────────────────────

/// Counter: finished drag gestures. Labels: outcome (committed, discarded).
pub const GESTURES_TOTAL: &str = "timetable_gestures_total";

/// Counter: swallowed storage failures. Labels: op (load, decode, encode, store).
pub const STORE_ERRORS_TOTAL: &str = "timetable_store_errors_total";

/// Histogram: full week layout recompute in seconds.
pub const LAYOUT_DURATION_SECONDS: &str = "timetable_layout_duration_seconds";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
