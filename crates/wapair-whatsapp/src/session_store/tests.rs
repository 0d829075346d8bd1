use super::*;
use wacore::appstate::hash::HashState;
use wacore::store::traits::{
    AppStateSyncKey, AppSyncStore, DeviceStore, LidPnMappingEntry, ProtocolStore, SignalStore,
};

async fn store() -> (tempfile::TempDir, FileSessionStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::open(dir.path().join("sessions"))
        .await
        .unwrap();
    (dir, store)
}

#[test]
fn test_fix_file_name() {
    assert_eq!(fix_file_name("session-123:4@s.whatsapp.net"), "session-123-4@s.whatsapp.net");
    assert_eq!(fix_file_name("a/b"), "a__b");
}

#[tokio::test]
async fn test_open_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("sessions");
    let store = FileSessionStore::open(&path).await.unwrap();
    assert!(path.is_dir());
    assert_eq!(store.dir(), path.as_path());
}

#[tokio::test]
async fn test_fresh_store_is_unregistered() {
    let (_dir, store) = store().await;
    assert!(!store.is_registered().await);
    assert!(!store.exists().await.unwrap());
    assert!(store.load().await.unwrap().is_none());
    assert!(store.export_credentials().await.unwrap().is_none());
    assert!(!store.flush_creds().await.unwrap());
}

#[tokio::test]
async fn test_identity_file_per_address() {
    let (_dir, store) = store().await;
    store
        .put_identity("123:1@s.whatsapp.net", [7u8; 32])
        .await
        .unwrap();
    assert!(store
        .dir()
        .join("identity-123-1@s.whatsapp.net.json")
        .exists());
    assert_eq!(
        store.load_identity("123:1@s.whatsapp.net").await.unwrap(),
        Some(vec![7u8; 32])
    );
    store.delete_identity("123:1@s.whatsapp.net").await.unwrap();
    assert!(store
        .load_identity("123:1@s.whatsapp.net")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_delete_missing_record_is_ok() {
    let (_dir, store) = store().await;
    store.delete_session("nobody").await.unwrap();
    store.remove_prekey(42).await.unwrap();
}

#[tokio::test]
async fn test_signed_prekeys_listed_in_id_order() {
    let (_dir, store) = store().await;
    store.store_signed_prekey(10, b"ten").await.unwrap();
    store.store_signed_prekey(2, b"two").await.unwrap();
    store.store_prekey(5, b"plain", true).await.unwrap();
    let all = store.load_all_signed_prekeys().await.unwrap();
    assert_eq!(all, vec![(2, b"two".to_vec()), (10, b"ten".to_vec())]);
    assert_eq!(store.load_prekey(5).await.unwrap(), Some(b"plain".to_vec()));
}

#[tokio::test]
async fn test_skdm_recipients_deduplicate() {
    let (_dir, store) = store().await;
    let group = "120363@g.us";
    store
        .add_skdm_recipients(group, &["a".into(), "b".into()])
        .await
        .unwrap();
    store
        .add_skdm_recipients(group, &["b".into(), "c".into()])
        .await
        .unwrap();
    assert_eq!(
        store.get_skdm_recipients(group).await.unwrap(),
        vec!["a", "b", "c"]
    );
    store.clear_skdm_recipients(group).await.unwrap();
    assert!(store.get_skdm_recipients(group).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lid_mapping_lookup_both_ways() {
    let (_dir, store) = store().await;
    let entry = LidPnMappingEntry {
        lid: "100000000000001".into(),
        phone_number: "2349159895444".into(),
        created_at: 1,
        updated_at: 2,
        learning_source: "usync".into(),
    };
    store.put_lid_mapping(&entry).await.unwrap();
    let by_pn = store.get_pn_mapping("2349159895444").await.unwrap().unwrap();
    assert_eq!(by_pn.lid, "100000000000001");
    let by_lid = store.get_lid_mapping("100000000000001").await.unwrap().unwrap();
    assert_eq!(by_lid.phone_number, "2349159895444");
    assert_eq!(store.get_all_lid_mappings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_base_key_comparison() {
    let (_dir, store) = store().await;
    store.save_base_key("addr", "msg1", b"key").await.unwrap();
    assert!(store.has_same_base_key("addr", "msg1", b"key").await.unwrap());
    assert!(!store.has_same_base_key("addr", "msg1", b"other").await.unwrap());
    store.delete_base_key("addr", "msg1").await.unwrap();
    assert!(!store.has_same_base_key("addr", "msg1", b"key").await.unwrap());
}

#[tokio::test]
async fn test_forget_marks_consumed_once() {
    let (_dir, store) = store().await;
    store.mark_forget_sender_key("g", "p1").await.unwrap();
    store.mark_forget_sender_key("g", "p1").await.unwrap();
    store.mark_forget_sender_key("g", "p2").await.unwrap();
    assert_eq!(store.consume_forget_marks("g").await.unwrap(), vec!["p1", "p2"]);
    assert!(store.consume_forget_marks("g").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_app_sync_key_and_default_version() {
    let (_dir, store) = store().await;
    let key = AppStateSyncKey {
        key_data: vec![1, 2, 3],
        timestamp: 99,
        fingerprint: vec![4],
    };
    store.set_sync_key(&[0xAA, 0xBB], key).await.unwrap();
    let loaded = store.get_sync_key(&[0xAA, 0xBB]).await.unwrap().unwrap();
    assert_eq!(loaded.key_data, vec![1, 2, 3]);
    assert_eq!(loaded.timestamp, 99);
    assert!(store.get_sync_key(&[0x01]).await.unwrap().is_none());

    let version = store.get_version("regular").await.unwrap();
    store.set_version("regular", version).await.unwrap();
    assert!(store.dir().join("app-state-sync-version-regular.json").exists());
    let _: HashState = store.get_version("regular").await.unwrap();
}

#[tokio::test]
async fn test_no_temp_files_left_behind() {
    let (_dir, store) = store().await;
    store.put_session("a", b"s").await.unwrap();
    let mut entries = std::fs::read_dir(store.dir()).unwrap();
    assert!(entries.all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".tmp")));
}

#[tokio::test]
async fn test_concurrent_writes_to_one_record_all_succeed() {
    let (_dir, store) = store().await;
    let store = std::sync::Arc::new(store);
    let mut writes = tokio::task::JoinSet::new();
    for i in 0u8..16 {
        let store = store.clone();
        writes.spawn(async move { store.write_blob("shared", &[i]).await });
    }
    while let Some(res) = writes.join_next().await {
        res.unwrap().unwrap();
    }

    let data = store.read_blob("shared").await.unwrap().unwrap();
    assert_eq!(data.len(), 1);
    let mut entries = std::fs::read_dir(store.dir()).unwrap();
    assert!(entries.all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".tmp")));
}
