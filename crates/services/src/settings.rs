use crate::error::SettingsError;

/// Default number of questions shown and scored together.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Tunables for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    page_size: usize,
}

impl QuizSettings {
    /// Creates settings with a custom page size.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidPageSize` if `page_size` is zero.
    pub fn new(page_size: usize) -> Result<Self, SettingsError> {
        if page_size == 0 {
            return Err(SettingsError::InvalidPageSize);
        }
        Ok(Self { page_size })
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
