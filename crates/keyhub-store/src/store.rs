//! User store trait — the persistence seam of the auth core.

use async_trait::async_trait;
use uuid::Uuid;

use keyhub_core::result::AppResult;
use keyhub_entity::user::{CreateUser, UpdateUser, User};

/// Persistence operations for user records.
///
/// Implementations own the `User` rows outright; callers fetch fresh state
/// per operation and never hold a long-lived copy. Every call is scoped to
/// exactly one user record — no operation spans multiple users.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Create a new user. Fails with `Conflict` when the email is already
    /// registered (case-insensitive).
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Update a user's profile fields. Fails with `NotFound` when the user
    /// does not exist and `Conflict` when a new email is already taken.
    async fn update(&self, data: &UpdateUser) -> AppResult<User>;

    /// Delete a user by ID. Returns `true` if a record was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Overwrite the stored refresh-token fingerprint; `None` clears it.
    /// Fails with `NotFound` when the user does not exist.
    async fn set_fingerprint(&self, id: Uuid, digest: Option<String>) -> AppResult<()>;

    /// Read the stored refresh-token fingerprint. Fails with `NotFound`
    /// when the user does not exist.
    async fn get_fingerprint(&self, id: Uuid) -> AppResult<Option<String>>;

    /// Atomically replace the fingerprint only if the stored value still
    /// equals `expected`. Returns `false` when the comparison fails —
    /// i.e. a concurrent rotation already committed. Fails with `NotFound`
    /// when the user does not exist.
    async fn replace_fingerprint(
        &self,
        id: Uuid,
        expected: &str,
        new_digest: &str,
    ) -> AppResult<bool>;
}
