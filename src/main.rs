use std::io;

use tracing::info;

use timetable::console;
use timetable::engine::{Surface, Timetable};
use timetable::model::GridConfig;
use timetable::store::FileStore;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries command replies; logs go to stderr.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let metrics_port: Option<u16> = std::env::var("TIMETABLE_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    timetable::observability::init(metrics_port);

    let data_dir = std::env::var("TIMETABLE_DATA_DIR").unwrap_or_else(|_| "./data".into());
    let start_hour: u8 = env_or("TIMETABLE_START_HOUR", 9);
    let end_hour: u8 = env_or("TIMETABLE_END_HOUR", 23);
    let slot_minutes: u8 = env_or("TIMETABLE_SLOT_MINUTES", 10);
    let cell_width: f64 = env_or("TIMETABLE_CELL_WIDTH", 120.0);
    let cell_height: f64 = env_or("TIMETABLE_CELL_HEIGHT", 12.0);

    let grid = GridConfig::new(start_hour, end_hour, slot_minutes)?;
    let store = FileStore::open(&data_dir)?;

    info!("timetable starting");
    info!("  data_dir: {data_dir}");
    info!(
        "  grid: {start_hour:02}:00-{end_hour:02}:00, {slot_minutes} min slots ({} per day)",
        grid.total_slots()
    );
    info!("  cell: {cell_width}x{cell_height} px");
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let mut engine = Timetable::open(store, grid, Surface::new(cell_width, cell_height));
    console::run(&mut engine, io::stdin().lock(), io::stdout().lock())?;

    info!("timetable stopped");
    Ok(())
}
