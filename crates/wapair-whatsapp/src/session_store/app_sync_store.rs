//! AppSyncStore trait implementation for FileSessionStore.
//!
//! Handles app state sync keys, collection versions, and mutation MACs.

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wacore::appstate::hash::HashState;
use wacore::appstate::processor::AppStateMutationMAC;
use wacore::store::traits::{AppStateSyncKey, AppSyncStore};

use super::{b64, FileSessionStore};

type Result<T> = wacore::store::error::Result<T>;

#[derive(Serialize, Deserialize)]
struct SyncKeyFile {
    #[serde(with = "b64")]
    key_data: Vec<u8>,
    timestamp: i64,
    #[serde(with = "b64")]
    fingerprint: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct MacEntry {
    version: u64,
    #[serde(with = "b64")]
    value_mac: Vec<u8>,
}

/// Mutation MACs of one collection, keyed by base64 index MAC.
type MacTable = HashMap<String, MacEntry>;

fn sync_key_name(key_id: &[u8]) -> String {
    format!("app-state-sync-key-{}", URL_SAFE_NO_PAD.encode(key_id))
}

fn macs_name(collection: &str) -> String {
    format!("app-state-mutation-macs-{collection}")
}

#[async_trait]
impl AppSyncStore for FileSessionStore {
    async fn get_sync_key(&self, key_id: &[u8]) -> Result<Option<AppStateSyncKey>> {
        Ok(self
            .read_json::<SyncKeyFile>(&sync_key_name(key_id))
            .await?
            .map(|f| AppStateSyncKey {
                key_data: f.key_data,
                timestamp: f.timestamp,
                fingerprint: f.fingerprint,
            }))
    }

    async fn set_sync_key(&self, key_id: &[u8], key: AppStateSyncKey) -> Result<()> {
        let file = SyncKeyFile {
            key_data: key.key_data,
            timestamp: key.timestamp,
            fingerprint: key.fingerprint,
        };
        self.write_json(&sync_key_name(key_id), &file).await
    }

    async fn get_version(&self, name: &str) -> Result<HashState> {
        Ok(self
            .read_json::<HashState>(&format!("app-state-sync-version-{name}"))
            .await?
            .unwrap_or_default())
    }

    async fn set_version(&self, name: &str, state: HashState) -> Result<()> {
        self.write_json(&format!("app-state-sync-version-{name}"), &state)
            .await
    }

    async fn put_mutation_macs(
        &self,
        name: &str,
        version: u64,
        mutations: &[AppStateMutationMAC],
    ) -> Result<()> {
        let _guard = self.lock().await;
        let file = macs_name(name);
        let mut table: MacTable = self.read_json(&file).await?.unwrap_or_default();
        for m in mutations {
            table.insert(
                STANDARD.encode(&m.index_mac),
                MacEntry {
                    version,
                    value_mac: m.value_mac.clone(),
                },
            );
        }
        self.write_json(&file, &table).await
    }

    async fn get_mutation_mac(&self, name: &str, index_mac: &[u8]) -> Result<Option<Vec<u8>>> {
        let table: MacTable = self.read_json(&macs_name(name)).await?.unwrap_or_default();
        Ok(table
            .get(&STANDARD.encode(index_mac))
            .map(|entry| entry.value_mac.clone()))
    }

    async fn delete_mutation_macs(&self, name: &str, index_macs: &[Vec<u8>]) -> Result<()> {
        let _guard = self.lock().await;
        let file = macs_name(name);
        let Some(mut table) = self.read_json::<MacTable>(&file).await? else {
            return Ok(());
        };
        for mac in index_macs {
            table.remove(&STANDARD.encode(mac));
        }
        self.write_json(&file, &table).await
    }
}
