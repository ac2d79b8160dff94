//! Webcash server node.
//!
//! Wires the economy state to the HTTP API: loads configuration, hydrates
//! the durable checkpoint, serves the JSON endpoints, and persists the
//! checkpoint again on shutdown.

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod persist;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::WebcashNode;
pub use shutdown::ShutdownController;
