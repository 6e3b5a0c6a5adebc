//! Error taxonomy shared by every feature.
//!
//! None of these reach the user as a crash. Missing elements and storage
//! failures are logged and the affected feature degrades; transport failures
//! become a single error toast.

/// Errors raised by site features and their collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// A view-tree element the feature needs is not on the page.
    #[error("{feature}: element `{selector}` not found")]
    MissingElement { feature: &'static str, selector: String },
    /// The durable preference store could not be read or written.
    #[error("preference storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The form submission collaborator reported a failure.
    #[error("submission failed: {0}")]
    Transport(String),
    /// The site configuration JSON was malformed.
    #[error("invalid site configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// A browser API call failed.
    #[error("browser call failed: {0}")]
    Js(String),
}

impl SiteError {
    /// Shorthand for [`SiteError::MissingElement`].
    #[must_use]
    pub fn missing(feature: &'static str, selector: &str) -> Self {
        Self::MissingElement { feature, selector: selector.to_owned() }
    }
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;
