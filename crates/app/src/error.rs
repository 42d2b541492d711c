//! Unified error handling with Sentry integration.
//!
//! Most failures in the product app degrade to reduced functionality and
//! never reach this type. `AppError` covers the ones a caller still has to
//! see: startup configuration, an unusable local store, and rejected
//! navigation.

use thiserror::Error;

use crate::config::ConfigError;
use crate::navigation::NavigationError;
use crate::storage::StorageError;

/// Application-level error type for the product app.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local persisted store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Navigation event was not valid in the current state.
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl AppError {
    /// Capture to Sentry if this error indicates a fault rather than a user
    /// mistake, and log it.
    pub fn report(&self) {
        if matches!(self, Self::Storage(_) | Self::Config(_) | Self::Client(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Product app error");
        } else {
            tracing::warn!(error = %self, "Product app error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("navigation", "Viewed product", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
