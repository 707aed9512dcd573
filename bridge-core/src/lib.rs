pub mod cap;
pub mod client;
pub mod error;
pub mod host;
pub mod hub_contract;
pub mod model;
