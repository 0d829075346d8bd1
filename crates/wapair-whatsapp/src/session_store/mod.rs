//! Multi-file auth state for `whatsapp-rust`.
//!
//! Implements the `Backend` trait (SignalStore + AppSyncStore + ProtocolStore + DeviceStore)
//! as a directory of small JSON files, one per logical record. The device
//! record is staged in memory by the library and only written to `creds.json`
//! when [`FileSessionStore::flush_creds`] runs, mirroring a "save creds"
//! callback.

mod app_sync_store;
mod auth_state;
mod device_store;
mod protocol_store;
mod signal_store;

#[cfg(test)]
mod tests;

pub use auth_state::FileAuthState;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;
use wacore::store::error::{db_err, StoreError};
use wacore::store::Device;

type Result<T> = wacore::store::error::Result<T>;

const CREDS_FILE: &str = "creds";

/// Directory-backed WhatsApp session store.
pub struct FileSessionStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on shared files.
    write_lock: Mutex<()>,
    /// Device record handed to us by the library but not yet flushed.
    staged: Mutex<Option<Device>>,
    creds_tx: broadcast::Sender<()>,
    /// Gives every in-flight write its own temp file.
    tmp_seq: AtomicU64,
}

/// Base64 (de)serialization for byte fields inside JSON files.
pub(crate) mod b64 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// A single opaque blob.
#[derive(Serialize, Deserialize)]
pub(crate) struct BlobFile {
    #[serde(with = "b64")]
    pub data: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct CredsFile {
    /// bincode-encoded `Device`.
    #[serde(with = "b64")]
    device: Vec<u8>,
}

/// Make an arbitrary key safe to use as a file name.
pub(crate) fn fix_file_name(name: &str) -> String {
    name.replace('/', "__").replace(':', "-")
}

fn serialization(e: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(e.to_string())
}

impl FileSessionStore {
    /// Open (creating if needed) the session directory.
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let (creds_tx, _) = broadcast::channel(16);
        debug!("session store opened at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
            staged: Mutex::new(None),
            creds_tx,
            tmp_seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Notified every time the library stages a new device record.
    pub fn subscribe_creds(&self) -> broadcast::Receiver<()> {
        self.creds_tx.subscribe()
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", fix_file_name(name)))
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match tokio::fs::read(self.path_for(name)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(serialization),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Write through a temp file so readers never observe a partial record.
    /// Concurrent writes to one record each use their own temp file; the last rename wins.
    pub(crate) async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path_for(name);
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{seq}.tmp"));
        let data = serde_json::to_vec(value).map_err(serialization)?;
        tokio::fs::write(&tmp, data).await.map_err(db_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(db_err)?;
        Ok(())
    }

    pub(crate) async fn remove(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(db_err(e)),
        }
    }

    /// File stems (without `.json`) that start with `prefix`.
    pub(crate) async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = fix_file_name(prefix);
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(db_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(db_err)? {
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if stem.starts_with(&prefix) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub(crate) async fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read_json::<BlobFile>(name).await?.map(|b| b.data))
    }

    pub(crate) async fn write_blob(&self, name: &str, data: &[u8]) -> Result<()> {
        self.write_json(name, &BlobFile { data: data.to_vec() }).await
    }

    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Stage a device record and notify subscribers.
    pub(crate) async fn stage_device(&self, device: &Device) {
        *self.staged.lock().await = Some(device.clone());
        let _ = self.creds_tx.send(());
    }

    /// The staged device if any, otherwise the one on disk.
    pub(crate) async fn current_device(&self) -> Result<Option<Device>> {
        if let Some(device) = self.staged.lock().await.as_ref() {
            return Ok(Some(device.clone()));
        }
        self.read_device().await
    }

    async fn read_device(&self) -> Result<Option<Device>> {
        match self.read_json::<CredsFile>(CREDS_FILE).await? {
            Some(file) => bincode::deserialize(&file.device)
                .map(Some)
                .map_err(serialization),
            None => Ok(None),
        }
    }

    pub(crate) async fn creds_on_disk(&self) -> bool {
        tokio::fs::try_exists(self.path_for(CREDS_FILE))
            .await
            .unwrap_or(false)
    }

    /// Persist the staged device record to `creds.json`.
    ///
    /// Returns `false` when nothing was staged.
    pub async fn flush_creds(&self) -> Result<bool> {
        let Some(device) = self.staged.lock().await.clone() else {
            return Ok(false);
        };
        let bytes = bincode::serialize(&device).map_err(serialization)?;
        let _guard = self.lock().await;
        self.write_json(CREDS_FILE, &CredsFile { device: bytes }).await?;
        Ok(true)
    }

    /// Base64 text of the bincode-encoded device record.
    pub async fn export_credentials(&self) -> Result<Option<String>> {
        match self.current_device().await? {
            Some(device) => {
                let bytes = bincode::serialize(&device).map_err(serialization)?;
                Ok(Some(STANDARD.encode(bytes)))
            }
            None => Ok(None),
        }
    }

    /// Phone-number JID of the linked account, once paired.
    pub async fn own_jid(&self) -> Option<String> {
        match self.current_device().await {
            Ok(Some(device)) => device.pn.as_ref().map(|jid| jid.to_string()),
            _ => None,
        }
    }

    /// Whether the stored device has completed pairing.
    pub async fn is_registered(&self) -> bool {
        self.own_jid().await.is_some()
    }
}
