//! HTTP adapters for remote services.

pub mod user_client;

pub use user_client::HttpUserClient;
