//! SignalStore trait implementation for FileSessionStore.
//!
//! Identities, sessions, prekeys, signed prekeys, and sender keys each live in
//! their own file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wacore::store::traits::SignalStore;

use super::{b64, FileSessionStore};

type Result<T> = wacore::store::error::Result<T>;

const SIGNED_PREKEY_PREFIX: &str = "signed-pre-key-";

#[derive(Serialize, Deserialize)]
struct PreKeyFile {
    #[serde(with = "b64")]
    record: Vec<u8>,
    uploaded: bool,
}

#[async_trait]
impl SignalStore for FileSessionStore {
    async fn put_identity(&self, address: &str, key: [u8; 32]) -> Result<()> {
        self.write_blob(&format!("identity-{address}"), &key).await
    }

    async fn load_identity(&self, address: &str) -> Result<Option<Vec<u8>>> {
        self.read_blob(&format!("identity-{address}")).await
    }

    async fn delete_identity(&self, address: &str) -> Result<()> {
        self.remove(&format!("identity-{address}")).await
    }

    async fn get_session(&self, address: &str) -> Result<Option<Vec<u8>>> {
        self.read_blob(&format!("session-{address}")).await
    }

    async fn put_session(&self, address: &str, session: &[u8]) -> Result<()> {
        self.write_blob(&format!("session-{address}"), session).await
    }

    async fn delete_session(&self, address: &str) -> Result<()> {
        self.remove(&format!("session-{address}")).await
    }

    async fn store_prekey(&self, id: u32, record: &[u8], uploaded: bool) -> Result<()> {
        let file = PreKeyFile {
            record: record.to_vec(),
            uploaded,
        };
        self.write_json(&format!("pre-key-{id}"), &file).await
    }

    async fn load_prekey(&self, id: u32) -> Result<Option<Vec<u8>>> {
        Ok(self
            .read_json::<PreKeyFile>(&format!("pre-key-{id}"))
            .await?
            .map(|f| f.record))
    }

    async fn remove_prekey(&self, id: u32) -> Result<()> {
        self.remove(&format!("pre-key-{id}")).await
    }

    async fn store_signed_prekey(&self, id: u32, record: &[u8]) -> Result<()> {
        self.write_blob(&format!("{SIGNED_PREKEY_PREFIX}{id}"), record)
            .await
    }

    async fn load_signed_prekey(&self, id: u32) -> Result<Option<Vec<u8>>> {
        self.read_blob(&format!("{SIGNED_PREKEY_PREFIX}{id}")).await
    }

    async fn load_all_signed_prekeys(&self) -> Result<Vec<(u32, Vec<u8>)>> {
        let mut out = Vec::new();
        for name in self.list(SIGNED_PREKEY_PREFIX).await? {
            let Some(id) = name
                .strip_prefix(SIGNED_PREKEY_PREFIX)
                .and_then(|id| id.parse::<u32>().ok())
            else {
                continue;
            };
            if let Some(record) = self.read_blob(&name).await? {
                out.push((id, record));
            }
        }
        out.sort_by_key(|(id, _)| *id);
        Ok(out)
    }

    async fn remove_signed_prekey(&self, id: u32) -> Result<()> {
        self.remove(&format!("{SIGNED_PREKEY_PREFIX}{id}")).await
    }

    async fn put_sender_key(&self, address: &str, record: &[u8]) -> Result<()> {
        self.write_blob(&format!("sender-key-{address}"), record)
            .await
    }

    async fn get_sender_key(&self, address: &str) -> Result<Option<Vec<u8>>> {
        self.read_blob(&format!("sender-key-{address}")).await
    }

    async fn delete_sender_key(&self, address: &str) -> Result<()> {
        self.remove(&format!("sender-key-{address}")).await
    }
}
