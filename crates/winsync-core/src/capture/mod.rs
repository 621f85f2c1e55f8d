mod errors;
mod handler;
mod types;

pub use errors::CaptureError;
pub use handler::CaptureEngine;
pub use types::CaptureRequest;
