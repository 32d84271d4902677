use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    backend::{Backend, BackendState},
    context::RequestContext,
    models::User,
};

/// Session
///
/// What this request knows about the caller's identity. `Unknown` is the state
/// before the resolver has run; a resolved session is always `Absent` or `Present`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Unknown,
    Absent,
    Present(User),
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Present(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Session::Present(_))
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Session::Unknown)
    }
}

/// resolve_session
///
/// Performs a single read of the identity endpoint on behalf of the caller.
/// Never fails: any lookup failure (network, non-2xx, undecodable body) means
/// the caller is treated as unauthenticated.
pub async fn resolve_session(backend: &dyn Backend, ctx: &RequestContext) -> Session {
    match backend.current_user(ctx).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = %user.id, "session resolved");
            Session::Present(user)
        }
        Ok(None) => Session::Absent,
        Err(err) => {
            tracing::debug!(error = %err, "auth lookup failed, treating caller as anonymous");
            Session::Absent
        }
    }
}

/// Session Extractor Implementation
///
/// Resolves the session once per request so handlers receive it as an argument.
/// Infallible: an unauthenticated caller is a valid outcome, not a rejection.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    BackendState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let backend = BackendState::from_ref(state);
        let ctx = RequestContext::from_parts(parts);
        Ok(resolve_session(backend.as_ref(), &ctx).await)
    }
}
