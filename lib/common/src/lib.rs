mod config;
mod delete_behaviour;
pub mod error;

pub use config::StoreConfig;
pub use delete_behaviour::DeleteBehaviour;
pub use error::{StateError, StoreError, StoreResult};
