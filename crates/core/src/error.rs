//! Configuration errors.

use thiserror::Error;

/// Problems with the emergency contact configuration.
///
/// The first three variants block a trigger; the last two are only raised when a
/// configuration is validated before being stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No configuration has been stored yet.
    #[error("no emergency contact configured")]
    NotConfigured,
    /// The contact number is empty.
    #[error("emergency contact number is missing")]
    MissingContactNumber,
    /// The recipient list is empty.
    #[error("at least one recipient email is required")]
    NoRecipients,
    /// The contact number contains characters a dialer would reject.
    #[error("invalid contact number '{0}'")]
    InvalidContactNumber(String),
    /// A recipient does not look like an email address.
    #[error("invalid recipient email '{0}'")]
    InvalidEmail(String),
}
