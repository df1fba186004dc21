/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (CI provider, persistence, console).
pub mod http_client;
pub mod progress_reporter;
pub mod scan_store;

pub use http_client::{FetchedJson, HttpClient, HttpReply};
pub use progress_reporter::ProgressReporter;
pub use scan_store::{ScanStore, UnscannedObligations};
