use tracing::{info, warn};
use uuid::Uuid;

use crate::config::WinSyncConfig;
use crate::store::KeyValueStore;

pub const DEVICE_ID_KEY: &str = "device_id";

/// The identifier stamped on arrangements captured on this machine.
///
/// Uses `[device] id` from the config when set. Otherwise reads the id
/// stored under `device_id`, generating and storing a new UUID on first use.
/// If the new id cannot be stored it is still returned for this run.
pub fn resolve_device_id(config: &WinSyncConfig, store: &dyn KeyValueStore) -> String {
    if let Some(id) = config.device_id() {
        return id.to_string();
    }

    match store.get_blob(DEVICE_ID_KEY) {
        Ok(Some(bytes)) => {
            if let Ok(id) = String::from_utf8(bytes)
                && !id.trim().is_empty()
            {
                return id.trim().to_string();
            }
            warn!(event = "core.device.stored_id_invalid", key = DEVICE_ID_KEY);
        }
        Ok(None) => {}
        Err(e) => warn!(event = "core.device.read_failed", error = %e),
    }

    let id = Uuid::new_v4().to_string();
    match store.set_blob(DEVICE_ID_KEY, id.as_bytes()) {
        Ok(()) => info!(event = "core.device.id_generated", device_id = %id),
        Err(e) => warn!(event = "core.device.persist_failed", error = %e),
    }
    id
}
