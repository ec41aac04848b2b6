use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::domain::{LocationGroup, RawReading, Reading};
use crate::proximity::group_by_proximity;
use crate::store::ReadingStore;
use crate::validation::filter_valid_readings;

/// Observable dashboard state.
///
/// Snapshots are delivered to the presentation layer through a watch channel;
/// consumers read, they never mutate. `current` is always a renderable
/// reading, the configured fallback station until real data arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    /// Latest valid reading, or the fallback station reading.
    pub current: Reading,
    /// The readings after `current` in recency order, for the history panel.
    pub history: Vec<Reading>,
    /// Distinct stations, most recently active first. Rebuilt only on the
    /// full fetch path.
    pub location_groups: Vec<LocationGroup>,
    /// Index into `location_groups` of the marker the user selected, if any.
    pub selected_group: Option<usize>,
    /// History panel contents while a marker is selected.
    pub location_history: Vec<Reading>,
    /// True until the initial load cycle reaches a terminal state.
    pub loading: bool,
}

impl DashboardState {
    /// History the panel should render: the selected station's readings
    /// while a marker is selected, the global history otherwise.
    pub fn effective_history(&self) -> &[Reading] {
        if self.selected_group.is_some() {
            &self.location_history
        } else {
            &self.history
        }
    }
}

/// Owns the dashboard state and applies every transition to it.
///
/// Mutations go through the watch sender, so each one is a serialized
/// reducer-style step over the previous snapshot; the presentation layer
/// observes via [`subscribe`](Self::subscribe).
pub struct DashboardController {
    config: DashboardConfig,
    state_tx: watch::Sender<DashboardState>,
}

impl DashboardController {
    pub fn new(config: DashboardConfig) -> Self {
        let initial = DashboardState {
            current: config.fallback_reading(),
            history: Vec::new(),
            location_groups: Vec::new(),
            selected_group: None,
            location_history: Vec::new(),
            loading: true,
        };
        let (state_tx, _) = watch::channel(initial);
        Self { config, state_tx }
    }

    /// Watch the state. The receiver holds the current snapshot immediately.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    /// Clone of the current snapshot.
    pub fn state(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    /// Full fetch path: pull a bounded batch, validate, group, and rebuild
    /// the whole derived state. Terminal in every branch: `loading` is
    /// false afterwards and `current` is renderable.
    pub async fn load(&self, store: &dyn ReadingStore) {
        match store.fetch_recent(self.config.fetch_limit).await {
            Ok(raw) => {
                let readings = filter_valid_readings(raw);
                if readings.is_empty() {
                    info!("store returned no valid readings; showing fallback station");
                    self.apply_fallback();
                    return;
                }

                let groups = group_by_proximity(&readings);
                let history_size = self.config.history_size;
                info!(
                    readings = readings.len(),
                    groups = groups.len(),
                    "dashboard refreshed from store"
                );

                self.state_tx.send_modify(|state| {
                    let head = readings[0].clone();
                    // A slow fetch must not clobber a fresher reading the
                    // live subscription already delivered
                    if head.timestamp > state.current.timestamp || state.loading {
                        state.current = head;
                    }
                    state.history = readings
                        .iter()
                        .skip(1)
                        .take(history_size)
                        .cloned()
                        .collect();
                    state.location_groups = groups;
                    refresh_selection(state, history_size);
                    state.loading = false;
                });
            }
            Err(err) => {
                warn!(error = %err, "initial fetch failed; showing fallback station");
                self.apply_fallback();
            }
        }
    }

    /// Lightweight live path: validate the small batch and, if it leads with
    /// a fresher reading, replace `current`. History and grouping are left
    /// alone; only the full fetch path rebuilds those.
    pub fn apply_live_batch(&self, batch: Vec<RawReading>) {
        let readings = filter_valid_readings(batch);
        let Some(head) = readings.into_iter().next() else {
            debug!("live batch carried no valid readings");
            return;
        };

        self.state_tx.send_if_modified(|state| {
            if head.timestamp > state.current.timestamp {
                state.current = head;
                true
            } else {
                debug!("live batch not newer than current reading; ignored");
                false
            }
        });
    }

    /// Marker selection: remember the group and surface its recent readings
    /// in the history panel. Out-of-range indexes are a no-op.
    pub fn select_location_group(&self, index: usize) {
        let history_size = self.config.history_size;
        self.state_tx.send_if_modified(|state| {
            let Some(group) = state.location_groups.get(index) else {
                return false;
            };
            state.location_history = group
                .readings
                .iter()
                .take(history_size)
                .cloned()
                .collect();
            state.selected_group = Some(index);
            true
        });
    }

    /// Drop the marker selection and fall back to the global history.
    pub fn clear_selection(&self) {
        self.state_tx.send_if_modified(|state| {
            if state.selected_group.is_none() {
                return false;
            }
            state.selected_group = None;
            state.location_history.clear();
            true
        });
    }

    fn apply_fallback(&self) {
        let fallback = self.config.fallback_reading();
        self.state_tx.send_modify(|state| {
            // Keep a live-delivered reading if one already arrived; the
            // placeholder is never fresher than real data
            if state.current.timestamp <= fallback.timestamp {
                state.current = fallback;
            }
            state.history.clear();
            state.location_groups.clear();
            state.selected_group = None;
            state.location_history.clear();
            state.loading = false;
        });
    }
}

// Selection survives a group rebuild when its index is still in range; its
// station history is refreshed from the new group contents.
fn refresh_selection(state: &mut DashboardState, history_size: usize) {
    match state.selected_group {
        Some(index) => match state.location_groups.get(index) {
            Some(group) => {
                state.location_history =
                    group.readings.iter().take(history_size).cloned().collect();
            }
            None => {
                state.selected_group = None;
                state.location_history.clear();
            }
        },
        None => {}
    }
}

/// Background driver for one dashboard session: runs the one-shot initial
/// fetch and the live subscription concurrently on the cooperative runtime.
///
/// Dropping the task (or calling [`shutdown`](Self::shutdown)) aborts the
/// loop, which tears the store subscription down with it; no state updates
/// are applied after teardown.
pub struct DashboardTask {
    handle: JoinHandle<()>,
}

impl DashboardTask {
    pub fn spawn(controller: Arc<DashboardController>, store: Arc<dyn ReadingStore>) -> Self {
        let handle = tokio::spawn(async move {
            let live_batch = controller.config.live_batch;

            let initial = controller.load(store.as_ref());
            let live = async {
                match store.subscribe_recent(live_batch).await {
                    Ok(mut subscription) => {
                        while let Some(batch) = subscription.next_batch().await {
                            controller.apply_live_batch(batch);
                        }
                        debug!("reading subscription ended");
                    }
                    Err(err) => {
                        warn!(error = %err, "subscription unavailable; no live updates this session");
                    }
                }
            };

            // Both run on this one task; delivery order between them is
            // resolved by the controller's timestamp guard
            tokio::join!(initial, live);
        });
        Self { handle }
    }

    /// Stop the driver and tear the store subscription down.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for DashboardTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
