pub mod builder;
pub mod connector;
pub mod rest;
pub mod signer;
pub mod types;

pub use builder::build_connector;
pub use connector::KuCoinConnector;
pub use rest::{KuCoinClassifier, KuCoinRestClient};
pub use signer::KuCoinSigner;
