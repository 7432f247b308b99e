//! In-memory user store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use keyhub_core::error::AppError;
use keyhub_core::result::AppResult;
use keyhub_entity::user::{CreateUser, UpdateUser, User};

use crate::store::UserStore;

/// In-process user store backed by a single locked map.
///
/// One `RwLock` guards all records so that email-uniqueness checks and
/// fingerprint compare-and-swap are atomic on a single node. A sharded map
/// cannot give that cross-entry atomicity, hence the coarse lock; the
/// write path here is short and uncontended enough that it does not matter.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict("Email already in use"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            refresh_token_fingerprint: None,
            created_at: now,
            updated_at: now,
        };

        users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update(&self, data: &UpdateUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        if let Some(email) = &data.email {
            if users
                .values()
                .any(|u| u.id != data.id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(AppError::conflict("Email already in use"));
            }
        }

        let user = users
            .get_mut(&data.id)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", data.id)))?;

        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn set_fingerprint(&self, id: Uuid, digest: Option<String>) -> AppResult<()> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        user.refresh_token_fingerprint = digest;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn get_fingerprint(&self, id: Uuid) -> AppResult<Option<String>> {
        self.users
            .read()
            .await
            .get(&id)
            .map(|u| u.refresh_token_fingerprint.clone())
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn replace_fingerprint(
        &self,
        id: Uuid,
        expected: &str,
        new_digest: &str,
    ) -> AppResult<bool> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        if user.refresh_token_fingerprint.as_deref() != Some(expected) {
            debug!(user_id = %id, "Fingerprint swap lost: stored value changed");
            return Ok(false);
        }

        user.refresh_token_fingerprint = Some(new_digest.to_string());
        user.updated_at = Utc::now();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use keyhub_core::error::ErrorKind;

    fn create(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_roundtrip() {
        let store = MemoryUserStore::new();
        let user = store.create(&create("example@test.com")).await.unwrap();

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "example@test.com");
        assert!(by_id.refresh_token_fingerprint.is_none());

        let by_email = store.find_by_email("EXAMPLE@TEST.COM").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store.create(&create("example@test.com")).await.unwrap();

        let err = store
            .create(&create("Example@Test.com"))
            .await
            .expect_err("duplicate email must be rejected");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_email_uniqueness() {
        let store = MemoryUserStore::new();
        store.create(&create("first@test.com")).await.unwrap();
        let second = store.create(&create("second@test.com")).await.unwrap();

        let err = store
            .update(&UpdateUser {
                id: second.id,
                email: Some("first@test.com".to_string()),
            })
            .await
            .expect_err("taken email must be rejected");
        assert_eq!(err.kind, ErrorKind::Conflict);

        let updated = store
            .update(&UpdateUser {
                id: second.id,
                email: Some("renamed@test.com".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(updated.email, "renamed@test.com");
    }

    #[tokio::test]
    async fn test_fingerprint_set_get_clear() {
        let store = MemoryUserStore::new();
        let user = store.create(&create("example@test.com")).await.unwrap();

        assert_eq!(store.get_fingerprint(user.id).await.unwrap(), None);

        store
            .set_fingerprint(user.id, Some("digest-1".to_string()))
            .await
            .unwrap();
        assert_eq!(
            store.get_fingerprint(user.id).await.unwrap().as_deref(),
            Some("digest-1")
        );

        store.set_fingerprint(user.id, None).await.unwrap();
        assert_eq!(store.get_fingerprint(user.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fingerprint_ops_require_existing_user() {
        let store = MemoryUserStore::new();
        let missing = Uuid::new_v4();

        let err = store.set_fingerprint(missing, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = store.get_fingerprint(missing).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = store
            .replace_fingerprint(missing, "old", "new")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_replace_fingerprint_is_compare_and_swap() {
        let store = MemoryUserStore::new();
        let user = store.create(&create("example@test.com")).await.unwrap();

        // No stored fingerprint yet: nothing to swap against.
        assert!(!store
            .replace_fingerprint(user.id, "digest-1", "digest-2")
            .await
            .unwrap());

        store
            .set_fingerprint(user.id, Some("digest-1".to_string()))
            .await
            .unwrap();

        assert!(store
            .replace_fingerprint(user.id, "digest-1", "digest-2")
            .await
            .unwrap());

        // The first writer already advanced the value; the loser must fail.
        assert!(!store
            .replace_fingerprint(user.id, "digest-1", "digest-3")
            .await
            .unwrap());
        assert_eq!(
            store.get_fingerprint(user.id).await.unwrap().as_deref(),
            Some("digest-2")
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryUserStore::new();
        let user = store.create(&create("example@test.com")).await.unwrap();

        assert!(store.delete(user.id).await.unwrap());
        assert!(!store.delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
    }
}
