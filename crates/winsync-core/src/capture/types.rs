/// Everything needed to capture a new arrangement.
#[derive(Debug, Clone, Default)]
pub struct CaptureRequest {
    pub name: String,
    pub tags: Vec<String>,
    /// Device the arrangement is attributed to.
    pub origin_device: String,
    /// Bundle ids whose windows are never captured.
    pub excluded_apps: Vec<String>,
}

impl CaptureRequest {
    pub fn new(name: impl Into<String>, origin_device: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin_device: origin_device.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_excluded_apps(mut self, excluded_apps: Vec<String>) -> Self {
        self.excluded_apps = excluded_apps;
        self
    }
}
