//! Per-request caller identity.
//!
//! The web client sends a stable `x-session-id` for anonymous visitors and an
//! `x-user-id` once signed in. Both are read once per request into an
//! immutable `SessionContext` that is passed explicitly to whatever needs it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const USER_HEADER: &str = "x-user-id";
const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: Option<String>,
    pub user_id: Option<Uuid>,
}

impl SessionContext {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Key of the usage counter: the user when signed in, else the session.
    pub fn usage_key(&self) -> Option<String> {
        match (&self.user_id, &self.session_id) {
            (Some(user_id), _) => Some(format!("user:{user_id}")),
            (None, Some(session_id)) => Some(format!("session:{session_id}")),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
impl SessionContext {
    pub fn anonymous(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            user_id: None,
        }
    }

    pub fn signed_in(user_id: Uuid) -> Self {
        Self {
            session_id: None,
            user_id: Some(user_id),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Result<Option<String>, AppError> {
            match parts.headers.get(name) {
                None => Ok(None),
                Some(value) => value
                    .to_str()
                    .map(|v| Some(v.trim().to_string()).filter(|v| !v.is_empty()))
                    .map_err(|_| AppError::Validation(format!("{name} header must be ASCII"))),
            }
        };

        let session_id = header(SESSION_HEADER)?;
        if let Some(id) = &session_id {
            if id.len() > MAX_SESSION_ID_LEN {
                return Err(AppError::Validation(format!(
                    "{SESSION_HEADER} header exceeds {MAX_SESSION_ID_LEN} characters"
                )));
            }
        }

        let user_id = header(USER_HEADER)?
            .map(|raw| {
                Uuid::parse_str(&raw)
                    .map_err(|_| AppError::Validation(format!("{USER_HEADER} must be a UUID")))
            })
            .transpose()?;

        Ok(SessionContext {
            session_id,
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<SessionContext, AppError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SessionContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_anonymous_session() {
        let ctx = extract(&[(SESSION_HEADER, "abc-123")]).await.unwrap();
        assert!(ctx.is_anonymous());
        assert_eq!(ctx.usage_key().as_deref(), Some("session:abc-123"));
    }

    #[tokio::test]
    async fn test_user_id_takes_precedence_for_usage_key() {
        let user = Uuid::new_v4();
        let ctx = extract(&[(SESSION_HEADER, "abc"), (USER_HEADER, &user.to_string())])
            .await
            .unwrap();
        assert!(!ctx.is_anonymous());
        assert_eq!(ctx.usage_key(), Some(format!("user:{user}")));
    }

    #[tokio::test]
    async fn test_no_headers_has_no_usage_key() {
        let ctx = extract(&[]).await.unwrap();
        assert_eq!(ctx.usage_key(), None);
    }

    #[tokio::test]
    async fn test_malformed_user_id_is_rejected() {
        let err = extract(&[(USER_HEADER, "not-a-uuid")]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_session_header_is_absent() {
        let ctx = extract(&[(SESSION_HEADER, "   ")]).await.unwrap();
        assert_eq!(ctx.session_id, None);
    }
}
