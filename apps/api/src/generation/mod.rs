// Document generation: the synchronous pipeline plus the HTTP handlers that
// drive it, apply the simulated latency, and record history.

pub mod handlers;
pub mod pipeline;

pub use pipeline::{DocumentPipeline, GeneratedDocument, GenerationError};
