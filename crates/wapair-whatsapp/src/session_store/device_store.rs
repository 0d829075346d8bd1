//! DeviceStore trait implementation for FileSessionStore.
//!
//! The library calls `save` whenever the device record changes; the record is
//! staged and subscribers are told to flush it.

use async_trait::async_trait;
use wacore::store::traits::DeviceStore;
use wacore::store::Device;

use super::FileSessionStore;

type Result<T> = wacore::store::error::Result<T>;

#[async_trait]
impl DeviceStore for FileSessionStore {
    async fn save(&self, device: &Device) -> Result<()> {
        self.stage_device(device).await;
        Ok(())
    }

    async fn load(&self) -> Result<Option<Device>> {
        self.current_device().await
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.staged.lock().await.is_some() || self.creds_on_disk().await)
    }

    async fn create(&self) -> Result<i32> {
        // Single-device directory; the record itself arrives via save().
        Ok(1)
    }
}
