/// Holds the configuration of an entity store.
///
/// The configuration is consumed when the store is created. Both options can only be changed
/// afterward while the store does not hold any data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Whether the indices are backed by concurrent maps.
    pub thread_safe: bool,
    /// Whether mutations are recorded in the change journal and a snapshot for rolling back is
    /// retained.
    pub track_changes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            thread_safe: false,
            track_changes: true,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn with_thread_safe(self, thread_safe: bool) -> Self {
        Self {
            thread_safe,
            ..self
        }
    }

    #[must_use]
    pub fn with_track_changes(self, track_changes: bool) -> Self {
        Self {
            track_changes,
            ..self
        }
    }
}
