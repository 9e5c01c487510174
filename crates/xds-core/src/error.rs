//! Error types for xDS client operations.
//!
//! This module provides [`XdsError`], the error taxonomy shared by every
//! stage of the watch pipeline: envelope unwrapping, validation, watch
//! completion and transport.

/// Comprehensive error type for xDS client operations.
///
/// Variants fall into four classes:
/// - protocol violations ([`XdsError::NoActiveWatch`],
///   [`XdsError::UnexpectedResourceType`], [`XdsError::InvalidTypeUrl`],
///   [`XdsError::DecodingError`]) abort the batch being processed;
/// - validation failures ([`XdsError::InvalidResource`]) abort the batch and
///   leave the cache untouched;
/// - [`XdsError::ResourceNotFound`] and [`XdsError::Timeout`] are delivered
///   through a watch callback;
/// - transport and ambient failures.
///
/// # Example
///
/// ```rust
/// use xds_core::{TypeUrl, XdsError};
///
/// fn require_name(name: &str) -> Result<(), XdsError> {
///     if name.is_empty() {
///         return Err(XdsError::InvalidResource {
///             type_url: TypeUrl::CLUSTER.to_string(),
///             name: name.to_string(),
///             reason: "resource name cannot be empty".to_string(),
///         });
///     }
///     Ok(())
/// }
///
/// assert!(require_name("").unwrap_err().is_validation_failure());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum XdsError {
    /// A response arrived for a resource kind nobody is watching.
    #[error("no active watch for {type_url} when handling response")]
    NoActiveWatch {
        /// The type URL of the unsolicited response.
        type_url: String,
    },

    /// A resource envelope carried a different type than the one subscribed to.
    #[error("unexpected resource type {actual} in response, expected {expected}")]
    UnexpectedResourceType {
        /// The type URL the watcher expects.
        expected: String,
        /// The type URL found in the envelope.
        actual: String,
    },

    /// Malformed or unsupported type URL.
    #[error("invalid type URL: {type_url} - {reason}")]
    InvalidTypeUrl {
        /// The invalid type URL.
        type_url: String,
        /// Reason why the type URL is invalid.
        reason: String,
    },

    /// Protobuf decoding failed.
    #[error("decoding error for {type_url}: {message}")]
    DecodingError {
        /// The type URL being decoded.
        type_url: String,
        /// Error message.
        message: String,
    },

    /// Resource validation failed.
    #[error("invalid resource {type_url}/{name}: {reason}")]
    InvalidResource {
        /// The type URL of the resource.
        type_url: String,
        /// The name of the resource.
        name: String,
        /// Reason for validation failure.
        reason: String,
    },

    /// The watched resource was absent from an otherwise valid response.
    #[error("watch target {type_url}/{name} not found in received response")]
    ResourceNotFound {
        /// The type URL of the resource.
        type_url: String,
        /// The name of the resource.
        name: String,
    },

    /// Operation timed out.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },

    /// A pending watch was displaced by a newer registration for the same kind.
    #[error("watch {watch_id} for {type_url} was replaced by a newer registration")]
    WatchCancelled {
        /// The type URL of the watch.
        type_url: String,
        /// ID of the displaced watch.
        watch_id: u64,
    },

    /// gRPC transport error.
    #[error("transport error: {message}")]
    TransportError {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stream closed unexpectedly.
    #[error("stream closed: {reason}")]
    StreamClosed {
        /// Reason for stream closure.
        reason: String,
    },

    /// Unexpected internal error.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl XdsError {
    /// Create an internal error from any error type.
    pub fn internal<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error from any error type.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TransportError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation failure for a named resource.
    pub fn invalid_resource(
        type_url: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidResource {
            type_url: type_url.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the peer broke the protocol contract.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::NoActiveWatch { .. }
                | Self::UnexpectedResourceType { .. }
                | Self::InvalidTypeUrl { .. }
                | Self::DecodingError { .. }
        )
    }

    /// Whether the error is a semantic rejection of a resource.
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::InvalidResource { .. })
    }

    /// Copy the error so it can be reported to a second party.
    ///
    /// Boxed sources are not cloneable; they are folded into the message.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let flatten = |message: &str, source: &Option<Box<dyn std::error::Error + Send + Sync>>| {
            match source {
                Some(source) => format!("{message}: {source}"),
                None => message.to_string(),
            }
        };

        match self {
            Self::NoActiveWatch { type_url } => Self::NoActiveWatch {
                type_url: type_url.clone(),
            },
            Self::UnexpectedResourceType { expected, actual } => Self::UnexpectedResourceType {
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::InvalidTypeUrl { type_url, reason } => Self::InvalidTypeUrl {
                type_url: type_url.clone(),
                reason: reason.clone(),
            },
            Self::DecodingError { type_url, message } => Self::DecodingError {
                type_url: type_url.clone(),
                message: message.clone(),
            },
            Self::InvalidResource {
                type_url,
                name,
                reason,
            } => Self::invalid_resource(type_url.clone(), name.clone(), reason.clone()),
            Self::ResourceNotFound { type_url, name } => Self::ResourceNotFound {
                type_url: type_url.clone(),
                name: name.clone(),
            },
            Self::Timeout { operation } => Self::Timeout {
                operation: operation.clone(),
            },
            Self::WatchCancelled { type_url, watch_id } => Self::WatchCancelled {
                type_url: type_url.clone(),
                watch_id: *watch_id,
            },
            Self::TransportError { message, source } => Self::TransportError {
                message: flatten(message, source),
                source: None,
            },
            Self::StreamClosed { reason } => Self::StreamClosed {
                reason: reason.clone(),
            },
            Self::Internal { message, source } => Self::Internal {
                message: flatten(message, source),
                source: None,
            },
            Self::Configuration(message) => Self::Configuration(message.clone()),
        }
    }
}

/// Convert to tonic::Status so failures can be reported over gRPC.
impl From<XdsError> for tonic::Status {
    fn from(err: XdsError) -> Self {
        match &err {
            XdsError::InvalidTypeUrl { .. }
            | XdsError::InvalidResource { .. }
            | XdsError::UnexpectedResourceType { .. }
            | XdsError::DecodingError { .. } => tonic::Status::invalid_argument(err.to_string()),
            XdsError::NoActiveWatch { .. } => tonic::Status::failed_precondition(err.to_string()),
            XdsError::ResourceNotFound { .. } => tonic::Status::not_found(err.to_string()),
            XdsError::Timeout { .. } => tonic::Status::deadline_exceeded(err.to_string()),
            XdsError::WatchCancelled { .. } => tonic::Status::cancelled(err.to_string()),
            XdsError::TransportError { .. } | XdsError::StreamClosed { .. } => {
                tonic::Status::unavailable(err.to_string())
            }
            XdsError::Internal { .. } => tonic::Status::internal(err.to_string()),
            XdsError::Configuration(_) => tonic::Status::invalid_argument(err.to_string()),
        }
    }
}
