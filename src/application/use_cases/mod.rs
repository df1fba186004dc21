/// Use cases module containing application business logic orchestration
mod find_matches;
mod populate_builds;
mod run_pipeline;

pub use find_matches::FindMatchesUseCase;
pub use populate_builds::PopulateBuildsUseCase;
pub use run_pipeline::RunPipelineUseCase;
