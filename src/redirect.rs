use std::fmt;

use thiserror::Error;
use url::Url;

use crate::session::Session;

/// RedirectError
#[derive(Debug, Error, PartialEq)]
pub enum RedirectError {
    #[error("malformed redirect target: {0}")]
    MalformedTarget(String),
}

/// RedirectTarget
///
/// A path on this application's own origin. Construction goes through
/// [`RedirectTarget::parse`], so holding one means it is safe to send a
/// `Location` header to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// Percent-decodes `raw` and accepts it only if it is a same-origin path
    /// relative to `app_origin`.
    pub fn parse(raw: &str, app_origin: &Url) -> Result<Self, RedirectError> {
        let malformed = || RedirectError::MalformedTarget(raw.to_string());

        let decoded = urlencoding::decode(raw).map_err(|_| malformed())?;
        let decoded = decoded.trim();

        // "//host" and "/\host" are treated as network-path references by browsers.
        if !decoded.starts_with('/') || decoded.starts_with("//") {
            return Err(malformed());
        }
        if decoded.contains('\\') || decoded.chars().any(char::is_control) {
            return Err(malformed());
        }

        let resolved = app_origin.join(decoded).map_err(|_| malformed())?;
        if resolved.origin() != app_origin.origin() {
            return Err(malformed());
        }

        Ok(Self(decoded.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// RedirectPolicy
///
/// Decides where an already-authenticated visitor of a guest-only page goes.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    origin: Url,
    default_target: RedirectTarget,
}

impl RedirectPolicy {
    /// Fails when `app_url` is not an absolute URL or `landing_path` is not a
    /// path on it.
    pub fn new(app_url: &str, landing_path: &str) -> Result<Self, RedirectError> {
        let origin =
            Url::parse(app_url).map_err(|_| RedirectError::MalformedTarget(app_url.to_string()))?;
        let default_target = RedirectTarget::parse(landing_path, &origin)?;
        Ok(Self {
            origin,
            default_target,
        })
    }

    pub fn default_target(&self) -> &RedirectTarget {
        &self.default_target
    }

    /// decide_redirect
    ///
    /// `None` unless the session is present. For a present session, the
    /// percent-decoded `raw_return_to` when it is a valid same-origin path,
    /// otherwise the default landing path.
    pub fn decide_redirect(
        &self,
        session: &Session,
        raw_return_to: Option<&str>,
    ) -> Option<RedirectTarget> {
        if !session.is_present() {
            return None;
        }

        let requested = raw_return_to.filter(|raw| !raw.trim().is_empty());
        let target = match requested {
            Some(raw) => RedirectTarget::parse(raw, &self.origin).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring redirect target, using default");
                self.default_target.clone()
            }),
            None => self.default_target.clone(),
        };

        Some(target)
    }
}
