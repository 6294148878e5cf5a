use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Per-device usage record for the current UTC calendar day
#[derive(Debug, Clone)]
struct DeviceQuota {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl DeviceQuota {
    fn new() -> Self {
        Self {
            count: 0,
            reset_at: next_midnight_utc(),
        }
    }

    /// Lazily reset the window if wall-clock time has crossed reset_at.
    /// Correctness never depends on the background reclamation task.
    fn reset_if_expired(&mut self, now: DateTime<Utc>) {
        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = next_midnight_utc();
        }
    }
}

/// Snapshot of store-level counters, for logs and diagnostics
#[derive(Debug, Clone)]
pub struct QuotaStoreStats {
    pub total_devices: usize,
    pub active_quotas: usize,
    pub total_usage_today: u64,
    pub cleanup_running: bool,
}

/// In-memory quota tracking with lazy UTC-midnight reset.
///
/// All multi-step operations on a device record happen under the single store
/// mutex, so concurrent increments for one device id produce distinct counts
/// with no lost updates. The guard is never held across an await point other
/// than its own acquisition.
pub struct QuotaStore {
    entries: Mutex<HashMap<String, DeviceQuota>>,
    cleanup_handle: Mutex<Option<JoinHandle<()>>>,
}

impl QuotaStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            cleanup_handle: Mutex::new(None),
        }
    }

    /// Current usage count for the device's active window. Does not create an
    /// entry; an expired entry is reset in place as a side effect.
    pub async fn get_usage(&self, device_id: &str) -> u32 {
        if device_id.is_empty() {
            return 0;
        }

        let mut entries = self.entries.lock().await;
        match entries.get_mut(device_id) {
            None => 0,
            Some(quota) => {
                quota.reset_if_expired(Utc::now());
                quota.count
            }
        }
    }

    /// Increment usage for a device id, creating or resetting the entry as
    /// needed, and return the new count. Empty device ids are a no-op.
    pub async fn increment_usage(&self, device_id: &str) -> u32 {
        if device_id.is_empty() {
            return 0;
        }

        let mut entries = self.entries.lock().await;
        let quota = entries
            .entry(device_id.to_string())
            .or_insert_with(DeviceQuota::new);
        quota.reset_if_expired(Utc::now());
        quota.count += 1;

        tracing::debug!(
            device = %device_prefix(device_id),
            usage = quota.count,
            "Usage incremented"
        );

        quota.count
    }

    /// True if another request would stay under the given daily limit
    pub async fn can_use(&self, device_id: &str, limit: u32) -> bool {
        self.get_usage(device_id).await < limit
    }

    /// Reset time of the device's window, or the next UTC midnight if no
    /// entry exists yet
    pub async fn get_reset_time(&self, device_id: &str) -> DateTime<Utc> {
        let entries = self.entries.lock().await;
        match entries.get(device_id) {
            Some(quota) => quota.reset_at,
            None => next_midnight_utc(),
        }
    }

    /// Force a device's quota back to zero (admin/testing operation). Only
    /// acts on existing entries.
    pub async fn reset_quota(&self, device_id: &str) {
        if device_id.is_empty() {
            return;
        }

        let mut entries = self.entries.lock().await;
        if let Some(quota) = entries.get_mut(device_id) {
            quota.count = 0;
            quota.reset_at = next_midnight_utc();
            tracing::info!(device = %device_prefix(device_id), "Quota manually reset");
        }
    }

    pub async fn stats(&self) -> QuotaStoreStats {
        let entries = self.entries.lock().await;
        let now = Utc::now();

        let mut active_quotas = 0;
        let mut total_usage_today: u64 = 0;
        for quota in entries.values() {
            if now < quota.reset_at {
                active_quotas += 1;
                total_usage_today += u64::from(quota.count);
            }
        }

        let cleanup_running = self
            .cleanup_handle
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false);

        QuotaStoreStats {
            total_devices: entries.len(),
            active_quotas,
            total_usage_today,
            cleanup_running,
        }
    }

    /// Spawn the periodic reclamation task. Entries whose window has already
    /// passed are deleted to bound memory growth from abandoned device ids.
    pub async fn start_cleanup(self: &Arc<Self>, period: std::time::Duration) {
        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; skip it so the initial
            // scan happens one full period after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.remove_expired().await;
            }
        });

        *self.cleanup_handle.lock().await = Some(handle);
    }

    /// Stop the reclamation task as part of orderly shutdown
    pub async fn shutdown(&self) {
        if let Some(handle) = self.cleanup_handle.lock().await.take() {
            handle.abort();
            let _ = handle.await;
            tracing::info!("Quota cleanup task stopped");
        }
    }

    async fn remove_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, quota| now < quota.reset_at);
        let removed = before - entries.len();

        if removed > 0 {
            tracing::info!(removed, "Cleaned up expired quota entries");
        }

        removed
    }
}

impl Default for QuotaStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Start of the day following the current UTC date
pub fn next_midnight_utc() -> DateTime<Utc> {
    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    tomorrow.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

fn device_prefix(device_id: &str) -> String {
    device_id.chars().take(8).collect()
}
