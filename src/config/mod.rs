// ==========================================
// Sponsorship MIS - configuration layer
// ==========================================
// Storage: config_kv table, global scope
// ==========================================

pub mod config_manager;
pub mod import_config;
pub mod import_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use import_config::ImportConfig;
pub use import_config_trait::ImportConfigReader;
