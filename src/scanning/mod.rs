/// Domain layer for log scanning
///
/// Pure types and services: no network, no filesystem, no persistence.
pub mod domain;
pub mod services;
