use diesel::prelude::*;

use crate::infra::db::postgres::schema::users;

#[derive(Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: String,
    pub name: String,
    pub email: String,
    /// argon2 PHC string
    pub password: String,
}

// Keep password hashes out of logs.
impl std::fmt::Debug for UserEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserEntity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Insertable)]
#[diesel(table_name = users)]
pub struct InsertUserEntity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for InsertUserEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertUserEntity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password_hash() {
        let user = UserEntity {
            id: "u1".to_string(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        };

        let rendered = format!("{user:?}");
        assert!(rendered.contains("user@nextmail.com"));
        assert!(!rendered.contains("argon2id"));

        let insert = InsertUserEntity {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        };
        assert!(!format!("{insert:?}").contains("argon2id"));
    }
}
