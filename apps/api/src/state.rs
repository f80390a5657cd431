use std::sync::Arc;

use crate::calculation::TaxTable;
use crate::config::Config;
use crate::document::{Assembler, TemplateRegistry};
use crate::generation::DocumentPipeline;
use crate::history::HistoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Templates, tax table, and assembler; read-only after startup.
    pub pipeline: Arc<DocumentPipeline>,
    /// Redis or in-memory, picked from `REDIS_URL` at startup.
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(config: Config, history: Arc<dyn HistoryStore>) -> Self {
        let pipeline = DocumentPipeline::new(
            TemplateRegistry::standard(),
            TaxTable::with_wage_base(config.social_security_wage_base),
            Assembler::new(config.generator_signature.clone()),
        );
        Self {
            config,
            pipeline: Arc::new(pipeline),
            history,
        }
    }
}
