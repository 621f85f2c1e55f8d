mod errors;
mod handler;

pub use errors::RepositoryError;
pub use handler::{ARRANGEMENTS_KEY, ArrangementRepository, LEGACY_ARRANGEMENTS_KEY};
