// Dashboard service binary entry point

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use aqm_backend::aqi::{aqi_range_label, aqi_status};
use aqm_backend::config::DashboardConfig;
use aqm_backend::dashboard::{DashboardController, DashboardTask};
use aqm_backend::domain::RawReading;
use aqm_backend::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("dashboard service starting");

    let config = DashboardConfig::from_env()?;
    let store = Arc::new(MemoryStore::new());

    // Optional replay feed: seed the store from a JSON document dump and
    // trickle the newest documents in through the live path, so the full
    // fetch, subscription, and fallback behavior can all be observed locally.
    if let Ok(path) = std::env::var("AQM_READINGS_FILE") {
        let interval_ms: u64 = std::env::var("AQM_REPLAY_INTERVAL_MS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(2000);

        let contents =
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
        let mut documents: Vec<RawReading> =
            serde_json::from_str(&contents).with_context(|| format!("parsing {path}"))?;

        let replay_count = documents.len().min(5);
        let live = documents.split_off(documents.len() - replay_count);
        info!(
            seeded = documents.len(),
            replayed = live.len(),
            interval_ms,
            "replay feed ready"
        );
        store.seed(documents).await;

        let feed_store = store.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            for document in live {
                ticker.tick().await;
                feed_store.push(document).await;
            }
        });
    }

    let controller = Arc::new(DashboardController::new(config));
    let mut updates = controller.subscribe();
    let task = DashboardTask::spawn(controller.clone(), store.clone());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let status = aqi_status(state.current.aqi);
                info!(
                    aqi = state.current.aqi,
                    status = status.status,
                    band = aqi_range_label(state.current.aqi),
                    pm25 = state.current.pm25,
                    latitude = state.current.latitude,
                    longitude = state.current.longitude,
                    stations = state.location_groups.len(),
                    history = state.effective_history().len(),
                    loading = state.loading,
                    "dashboard state updated"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    task.shutdown();
    Ok(())
}
