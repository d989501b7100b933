use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::users::{InsertUserEntity, UserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>>;
    /// Inserts the user, or replaces name and password when the email already exists.
    /// Returns the stored id.
    async fn upsert_user(&self, user: InsertUserEntity) -> Result<String>;
}
