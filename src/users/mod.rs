use async_trait::async_trait;
use uuid::Uuid;

mod model;
mod pg;
#[cfg(test)]
pub mod memory;

pub use model::{NewUser, User};
pub use pg::PgUserStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for users; handlers only see this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with `DuplicateEmail` if the email was taken between check and insert.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}
