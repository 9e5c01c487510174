//! Resource kinds and envelope unwrapping.
//!
//! Every resource kind (clusters, listeners, routes, endpoints) follows the
//! same subscribe/validate/cache pattern. [`ResourceKind`] captures what
//! differs between them: the concrete protobuf message, the typed update it
//! validates into, and the validation rules themselves.

use std::fmt;

use prost::Message;

use crate::{TypeUrl, XdsError, XdsResult};

/// A category of xDS resource with its own validation rules and cache.
///
/// # Example
///
/// ```rust
/// use xds_core::{ResourceKind, XdsError, XdsResult};
///
/// #[derive(Clone, PartialEq, prost::Message)]
/// struct Named {
///     #[prost(string, tag = "1")]
///     name: String,
/// }
///
/// struct NamedKind;
///
/// impl ResourceKind for NamedKind {
///     const TYPE_URL: &'static str = "type.googleapis.com/example.Named";
///     type Resource = Named;
///     type Update = String;
///
///     fn name(resource: &Named) -> &str {
///         &resource.name
///     }
///
///     fn validate(resource: &Named) -> XdsResult<String> {
///         if resource.name.is_empty() {
///             return Err(XdsError::invalid_resource(Self::TYPE_URL, "", "empty name"));
///         }
///         Ok(resource.name.to_uppercase())
///     }
/// }
///
/// let update = NamedKind::validate(&Named { name: "a".into() }).unwrap();
/// assert_eq!(NamedKind::resolve(update, "a"), "A");
/// ```
pub trait ResourceKind: Send + Sync + 'static {
    /// Type URL identifying this kind on the wire.
    const TYPE_URL: &'static str;

    /// Concrete protobuf message carried inside resource envelopes.
    type Resource: Message + Default;

    /// Validated, immutable update produced from one resource.
    type Update: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Name the resource is cached and matched under.
    fn name(resource: &Self::Resource) -> &str;

    /// Enforce the kind's semantic invariants.
    fn validate(resource: &Self::Resource) -> XdsResult<Self::Update>;

    /// Fill in defaults that depend on the resource name.
    ///
    /// Runs after [`ResourceKind::validate`] succeeds. The default keeps the
    /// update unchanged.
    fn resolve(update: Self::Update, _name: &str) -> Self::Update {
        update
    }

    /// The kind's type URL as an owned [`TypeUrl`].
    fn type_url() -> TypeUrl {
        TypeUrl::new(Self::TYPE_URL)
    }
}

/// Unwrap a resource envelope into its concrete message.
///
/// Fails with [`XdsError::UnexpectedResourceType`] when the envelope's type
/// URL differs from `expected`, and with [`XdsError::DecodingError`] when the
/// payload is not a valid encoding of `M`.
pub fn decode_any<M>(any: &prost_types::Any, expected: &str) -> XdsResult<M>
where
    M: Message + Default,
{
    if any.type_url != expected {
        return Err(XdsError::UnexpectedResourceType {
            expected: expected.to_string(),
            actual: any.type_url.clone(),
        });
    }

    M::decode(any.value.as_slice()).map_err(|e| XdsError::DecodingError {
        type_url: expected.to_string(),
        message: e.to_string(),
    })
}

/// Wrap a message into a resource envelope of the given type.
pub fn encode_any<M: Message>(message: &M, type_url: &str) -> prost_types::Any {
    prost_types::Any {
        type_url: type_url.to_string(),
        value: message.encode_to_vec(),
    }
}
