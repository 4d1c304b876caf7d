//! Profile management: ports, verification, and the orchestrator

pub mod ports;
pub mod service;
pub mod verification;

pub use service::ProfileService;
