pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod fee;
pub mod server;
pub mod types;
pub mod utils;
pub mod worker;


// Re-export commonly used item
pub use error::{RelayerError, RelayerResult};
