// Calculation engine: withholding rates, net pay, YTD and balance arithmetic,
// plus the per-document enrichment that applies them to a request.

pub mod engine;
pub mod enrich;

pub use engine::{PayPeriod, TaxBreakdown, TaxTable};
pub use enrich::enrich;
