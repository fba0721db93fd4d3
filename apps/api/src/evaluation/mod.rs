/// Interview evaluation pipeline.
///
/// A chunk upload flows one direction: spooled video → extracted audio →
/// transcript → per-question score → session state. Finalization folds the
/// accumulated score map into the recruiter-facing report.
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod scorer;
pub mod session;
pub mod storage;
pub mod store;
pub mod transcriber;
