//! Lifecycle shared by every managed record type.
//!
//! Users, issuers, recipients and roles all go through the same
//! create / get / list / search / update / activate / deactivate flow,
//! implemented once in [`service::LifecycleService`].

pub mod errors;
pub mod models;
pub mod ports;
pub mod service;
