pub mod builder;
pub mod connector;
pub mod rest;
pub mod signer;
pub mod types;

// Re-export main types for easier importing
pub use builder::build_connector;
pub use connector::BybitConnector;
pub use rest::{BybitClassifier, BybitRestClient};
pub use signer::BybitSigner;
