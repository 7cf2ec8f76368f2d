//! Configuration for the SIGEA agenda service.

mod settings;

pub use settings::{AuthConfig, Config, ServerConfig, StoreBackendType, StoreConfig};
