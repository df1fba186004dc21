/// Ports module defining interfaces for hexagonal architecture
///
/// Only driven (outbound) ports exist: the use cases are called directly by
/// the CLI.
pub mod outbound;
