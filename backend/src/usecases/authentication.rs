use anyhow::Result;
use std::{collections::HashMap, sync::Arc};
use tracing::warn;

use crate::auth::{
    Session,
    credentials::{AuthErrorKind, CredentialsProvider, SignInError},
};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";
pub const GENERIC_AUTH_FAILURE_MESSAGE: &str = "Something went wrong.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticateOutcome {
    SignedIn(Session),
    Rejected(String),
}

impl AuthenticateOutcome {
    /// `None` on success; the caller redirects.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AuthenticateOutcome::SignedIn(_) => None,
            AuthenticateOutcome::Rejected(message) => Some(message),
        }
    }
}

pub struct AuthenticationUseCase<T>
where
    T: CredentialsProvider + Send + Sync,
{
    credentials_provider: Arc<T>,
}

impl<T> AuthenticationUseCase<T>
where
    T: CredentialsProvider + Send + Sync,
{
    pub fn new(credentials_provider: Arc<T>) -> Self {
        Self {
            credentials_provider,
        }
    }

    pub async fn authenticate(&self, fields: HashMap<String, String>) -> Result<AuthenticateOutcome> {
        match self.credentials_provider.sign_in(fields).await {
            Ok(session) => Ok(AuthenticateOutcome::SignedIn(session)),
            Err(SignInError::Auth(kind)) => {
                warn!(?kind, "authentication: sign-in rejected");
                let message = match kind {
                    AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS_MESSAGE,
                    _ => GENERIC_AUTH_FAILURE_MESSAGE,
                };
                Ok(AuthenticateOutcome::Rejected(message.to_string()))
            }
            Err(SignInError::Unexpected(err)) => Err(err),
        }
    }
}
