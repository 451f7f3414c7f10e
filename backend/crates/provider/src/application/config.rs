//! Application Configuration

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: 15,
            max_duration_minutes: 480,
            default_page_size: 50,
            max_page_size: 200,
        }
    }
}

impl ProviderConfig {
    pub fn development() -> Self {
        Self::default()
    }

    /// Requested page size, defaulted and capped
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}
