use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Identity of the signed-in user, as asserted by the auth layer in front of
/// this service via forwarded headers.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    /// Display name falls back to the email address, matching how profiles
    /// are defaulted on lazy creation.
    pub fn default_display_name(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_default()
    }
}

/// Never rejects: an absent or incomplete identity yields `None`, and the
/// handlers answer with empty data or treat the mutation as a no-op.
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .filter(|v| !v.is_empty())
        };

        let identity = header("x-user-id").map(|user_id| Identity {
            user_id,
            email: header("x-user-email"),
            display_name: header("x-user-name"),
        });

        Ok(MaybeIdentity(identity))
    }
}
