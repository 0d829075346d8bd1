//! # wapair-whatsapp
//!
//! Messaging backend built on `whatsapp-rust`: a multi-file auth state on
//! disk, client construction, event mapping, and message sending.

pub mod session_store;
pub mod version;
pub mod whatsapp;

pub use session_store::FileSessionStore;
pub use whatsapp::WhatsAppConnector;
