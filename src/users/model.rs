use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // always lowercase
    pub password_hash: String, // Argon2 hash, never leaves the store layer
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields the client controls; id and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
