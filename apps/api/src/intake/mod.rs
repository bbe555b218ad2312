// Résumé intake: the per-document pipeline and the HTTP handlers that feed it.

pub mod handlers;
pub mod pipeline;

pub use pipeline::{PipelineError, ResumePipeline};
