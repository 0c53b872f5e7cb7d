//! Namespaced keys for the browser-side key-value stores. Opaque to the
//! rest of the crate; consumers treat them as external identifiers.

/// Keys into the persistent local store.
pub mod local {
    pub const SETTINGS: &str = "s42.your-settings";

    /// Per-feature read marker for new-feature announcements.
    pub fn new_feature_read_status(feature: &str) -> String {
        format!("s42.new-feature-read-status-{feature}")
    }
}

/// Keys into the session-scoped store.
pub mod session {
    pub const GITHUB_STARS: &str = "s42.github.stars";
}
