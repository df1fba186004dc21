/// Result alias used at the use-case and CLI edge, where typed errors are
/// wrapped into `anyhow::Error` with context.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
