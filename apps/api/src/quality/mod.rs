// Request validation (blocking) and post-calculation quality checks (advisory).

pub mod checker;
pub mod validator;

pub use checker::{run_checks, QualityCheck, QualityReport};
pub use validator::{validate, ValidationReport};
