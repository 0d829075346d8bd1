//! ProtocolStore trait implementation for FileSessionStore.
//!
//! Handles SKDM recipients, LID-PN mappings, base keys, device lists, and
//! sender key forget marks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wacore::store::traits::{DeviceListRecord, LidPnMappingEntry, ProtocolStore};

use super::{b64, FileSessionStore};

type Result<T> = wacore::store::error::Result<T>;

const LID_PREFIX: &str = "lid-mapping-";

#[derive(Serialize, Deserialize)]
struct LidMappingFile {
    lid: String,
    phone_number: String,
    created_at: i64,
    updated_at: i64,
    learning_source: String,
}

impl From<LidMappingFile> for LidPnMappingEntry {
    fn from(f: LidMappingFile) -> Self {
        LidPnMappingEntry {
            lid: f.lid,
            phone_number: f.phone_number,
            created_at: f.created_at,
            updated_at: f.updated_at,
            learning_source: f.learning_source,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct BaseKeyFile {
    #[serde(with = "b64")]
    base_key: Vec<u8>,
}

fn base_key_name(address: &str, message_id: &str) -> String {
    format!("base-key-{address}--{message_id}")
}

#[async_trait]
impl ProtocolStore for FileSessionStore {
    async fn get_skdm_recipients(&self, group_jid: &str) -> Result<Vec<String>> {
        Ok(self
            .read_json(&format!("skdm-recipients-{group_jid}"))
            .await?
            .unwrap_or_default())
    }

    async fn add_skdm_recipients(&self, group_jid: &str, device_jids: &[String]) -> Result<()> {
        let _guard = self.lock().await;
        let name = format!("skdm-recipients-{group_jid}");
        let mut recipients: Vec<String> = self.read_json(&name).await?.unwrap_or_default();
        for jid in device_jids {
            if !recipients.contains(jid) {
                recipients.push(jid.clone());
            }
        }
        self.write_json(&name, &recipients).await
    }

    async fn clear_skdm_recipients(&self, group_jid: &str) -> Result<()> {
        self.remove(&format!("skdm-recipients-{group_jid}")).await
    }

    async fn get_lid_mapping(&self, lid: &str) -> Result<Option<LidPnMappingEntry>> {
        Ok(self
            .read_json::<LidMappingFile>(&format!("{LID_PREFIX}{lid}"))
            .await?
            .map(Into::into))
    }

    async fn get_pn_mapping(&self, phone: &str) -> Result<Option<LidPnMappingEntry>> {
        let Some(lid) = self
            .read_json::<String>(&format!("pn-mapping-{phone}"))
            .await?
        else {
            return Ok(None);
        };
        self.get_lid_mapping(&lid).await
    }

    async fn put_lid_mapping(&self, entry: &LidPnMappingEntry) -> Result<()> {
        let _guard = self.lock().await;
        let file = LidMappingFile {
            lid: entry.lid.clone(),
            phone_number: entry.phone_number.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            learning_source: entry.learning_source.clone(),
        };
        self.write_json(&format!("{LID_PREFIX}{}", entry.lid), &file)
            .await?;
        self.write_json(&format!("pn-mapping-{}", entry.phone_number), &entry.lid)
            .await
    }

    async fn get_all_lid_mappings(&self) -> Result<Vec<LidPnMappingEntry>> {
        let mut out = Vec::new();
        for name in self.list(LID_PREFIX).await? {
            if let Some(file) = self.read_json::<LidMappingFile>(&name).await? {
                out.push(file.into());
            }
        }
        Ok(out)
    }

    async fn save_base_key(&self, address: &str, message_id: &str, base_key: &[u8]) -> Result<()> {
        let file = BaseKeyFile {
            base_key: base_key.to_vec(),
        };
        self.write_json(&base_key_name(address, message_id), &file)
            .await
    }

    async fn has_same_base_key(
        &self,
        address: &str,
        message_id: &str,
        current_base_key: &[u8],
    ) -> Result<bool> {
        Ok(self
            .read_json::<BaseKeyFile>(&base_key_name(address, message_id))
            .await?
            .map(|f| f.base_key == current_base_key)
            .unwrap_or(false))
    }

    async fn delete_base_key(&self, address: &str, message_id: &str) -> Result<()> {
        self.remove(&base_key_name(address, message_id)).await
    }

    async fn update_device_list(&self, record: DeviceListRecord) -> Result<()> {
        self.write_json(&format!("device-list-{}", record.user), &record)
            .await
    }

    async fn get_devices(&self, user: &str) -> Result<Option<DeviceListRecord>> {
        self.read_json(&format!("device-list-{user}")).await
    }

    async fn mark_forget_sender_key(&self, group_jid: &str, participant: &str) -> Result<()> {
        let _guard = self.lock().await;
        let name = format!("forget-sender-key-{group_jid}");
        let mut marks: Vec<String> = self.read_json(&name).await?.unwrap_or_default();
        if !marks.iter().any(|p| p == participant) {
            marks.push(participant.to_string());
        }
        self.write_json(&name, &marks).await
    }

    async fn consume_forget_marks(&self, group_jid: &str) -> Result<Vec<String>> {
        let _guard = self.lock().await;
        let name = format!("forget-sender-key-{group_jid}");
        let marks: Vec<String> = self.read_json(&name).await?.unwrap_or_default();
        self.remove(&name).await?;
        Ok(marks)
    }
}
