mod errors;
mod types;

pub use errors::ArrangementError;
pub use types::{
    Arrangement, ArrangementId, ArrangementParts, DEFAULT_SPACE_INDEX, Frame, MAX_TAG_LEN,
    WindowRecord,
};
