mod backends;
mod errors;
mod registry;
mod traits;
mod types;

#[cfg(target_os = "macos")]
pub use backends::SystemEventsBackend;
pub use errors::PlatformError;
pub use registry::{Providers, detect_backend};
pub use traits::{WindowController, WindowInspector};
pub use types::{
    ActivationPolicy, AppHandle, AttributeValue, Point, Size, WindowAttribute, WindowHandle,
};
