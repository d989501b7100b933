use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, bail};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::{error, info, warn};

use super::{Session, SessionKeys};
use invoicing::domain::{
    entities::users::InsertUserEntity, repositories::users::UserRepository,
    value_objects::credentials::Credentials,
};

/// Failure kinds a sign-in attempt can report without being a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    CredentialsSignin,
    CallbackRouteError,
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("authentication failed: {0:?}")]
    Auth(AuthErrorKind),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[async_trait]
#[automock]
pub trait CredentialsProvider {
    async fn sign_in(&self, fields: HashMap<String, String>) -> Result<Session, SignInError>;
}

pub struct PasswordCredentialsProvider<U>
where
    U: UserRepository + Send + Sync,
{
    user_repository: Arc<U>,
    session_keys: Arc<SessionKeys>,
}

impl<U> PasswordCredentialsProvider<U>
where
    U: UserRepository + Send + Sync,
{
    pub fn new(user_repository: Arc<U>, session_keys: Arc<SessionKeys>) -> Self {
        Self {
            user_repository,
            session_keys,
        }
    }
}

#[async_trait]
impl<U> CredentialsProvider for PasswordCredentialsProvider<U>
where
    U: UserRepository + Send + Sync,
{
    async fn sign_in(&self, fields: HashMap<String, String>) -> Result<Session, SignInError> {
        let Some(credentials) = Credentials::parse(&fields) else {
            info!("auth: malformed credentials submitted");
            return Err(SignInError::Auth(AuthErrorKind::CredentialsSignin));
        };

        let user = self
            .user_repository
            .find_by_email(credentials.email.clone())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "auth: failed to load user");
                SignInError::Auth(AuthErrorKind::CallbackRouteError)
            })?
            .ok_or_else(|| {
                info!(email = %credentials.email, "auth: unknown email");
                SignInError::Auth(AuthErrorKind::CredentialsSignin)
            })?;

        let stored_hash = PasswordHash::new(&user.password).map_err(|err| {
            error!(user_id = %user.id, error = %err, "auth: stored password hash is unreadable");
            SignInError::Auth(AuthErrorKind::CallbackRouteError)
        })?;

        match Argon2::default().verify_password(credentials.password.as_bytes(), &stored_hash) {
            Ok(()) => {}
            Err(password_hash::Error::Password) => {
                info!(user_id = %user.id, "auth: password mismatch");
                return Err(SignInError::Auth(AuthErrorKind::CredentialsSignin));
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "auth: password verification failed");
                return Err(SignInError::Auth(AuthErrorKind::CallbackRouteError));
            }
        }

        let session = self.session_keys.issue(&user)?;
        info!(user_id = %user.id, "auth: signed in");

        Ok(session)
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| {
            warn!(error = %err, "auth: failed to hash password");
            anyhow!("failed to hash password: {}", err)
        })?;

    Ok(hash.to_string())
}

/// Stores a login for `credentials`, replacing the password of an existing user with the same email.
pub async fn seed_user<U>(
    user_repository: &U,
    name: &str,
    credentials: Credentials,
) -> anyhow::Result<String>
where
    U: UserRepository + Send + Sync,
{
    if name.trim().is_empty() {
        bail!("user name must not be empty");
    }

    let user = InsertUserEntity {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        email: credentials.email,
        password: hash_password(&credentials.password)?,
    };
    let email = user.email.clone();

    let user_id = user_repository.upsert_user(user).await?;
    info!(%user_id, %email, "auth: user seeded");

    Ok(user_id)
}
