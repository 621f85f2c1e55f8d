mod errors;
mod handler;
mod types;

pub use errors::RestoreError;
pub use handler::RestoreEngine;
pub use types::{RestoreOutcome, RestoreReport, RestoreStatus};
