//! Adapter error type.
//!
//! Every live call into an external system resolves to either success or
//! [`AdapterError::CallFailed`] naming the system and what went wrong.
//! Network errors, timeouts and non-2xx responses all take that shape --
//! adapter-library internals never leak past this crate.

/// Error raised by a capability adapter call.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A single external call failed (network, auth, 4xx/5xx, timeout).
    #[error("{system}: {detail}")]
    CallFailed {
        /// The external system, e.g. `"Graylog"`.
        system: &'static str,
        /// Diagnostic detail safe to surface to an operator.
        detail: String,
    },

    /// The external system answered 2xx but the body was not the shape the
    /// adapter expects (missing id field, wrong type).
    #[error("{system}: unexpected response: {detail}")]
    UnexpectedResponse {
        system: &'static str,
        detail: String,
    },
}

impl AdapterError {
    /// Wrap a transport-level failure with system context.
    pub fn call_failed(system: &'static str, detail: impl Into<String>) -> Self {
        AdapterError::CallFailed {
            system,
            detail: detail.into(),
        }
    }

    /// The external system this error came from.
    pub fn system(&self) -> &'static str {
        match self {
            AdapterError::CallFailed { system, .. } => system,
            AdapterError::UnexpectedResponse { system, .. } => system,
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
