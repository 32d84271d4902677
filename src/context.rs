use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Header used for request correlation between this service and the backend.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// RequestContext
///
/// The per-request values that must travel with every backend read issued on
/// behalf of the caller. Built fresh for each request and never shared, so no
/// session or cache state outlives the request that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    /// The caller's raw `Cookie` header, forwarded so the backend sees the same session.
    pub cookie: Option<String>,
    /// The id assigned by the request-id layer.
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            cookie: header_value(header::COOKIE.as_str()),
            request_id: header_value(REQUEST_ID_HEADER),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
