use anyhow::anyhow;
use chrono::Utc;

use crate::storage::traits::User;
use crate::storage::{CatalogRead, CatalogWrite, Storage, StorageTx};

use super::{Catalog, CatalogError};

impl<S: Storage> Catalog<S> {
    pub fn user(&self, username: &str) -> Result<Option<User>, CatalogError> {
        Ok(self.storage().load_user(username)?)
    }

    pub fn users(&self) -> Result<Vec<User>, CatalogError> {
        Ok(self.storage().list_users()?)
    }

    /// Provision an API user. The password is expected to be hashed already.
    pub fn add_user(&self, username: &str, password_hash: &str) -> Result<User, CatalogError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let tx = self.storage().begin_tx()?;
        if tx.load_user(username)?.is_some() {
            return Err(CatalogError::DuplicateName {
                entity: "user",
                name: username.to_string(),
            });
        }
        let id = tx.insert_user(username, password_hash, Utc::now())?;
        tx.commit()?;

        let user = self
            .storage()
            .load_user(username)?
            .ok_or_else(|| anyhow!("user {id} vanished after insert"))?;
        log::info!("provisioned user {}", user.username);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use tempfile::TempDir;

    fn catalog() -> (TempDir, Catalog<SqliteStorage>) {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("cookbook.sqlite"));
        storage.init().unwrap();
        (dir, Catalog::new(storage))
    }

    #[test]
    fn add_user_trims_and_rejects_duplicates() {
        let (_dir, catalog) = catalog();
        let user = catalog.add_user("  alice ", "hash").unwrap();
        assert_eq!(user.username, "alice");

        let err = catalog.add_user("ALICE", "other").unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NAME");

        let err = catalog.add_user("   ", "hash").unwrap_err();
        assert_eq!(err.code(), "EMPTY_NAME");
    }

    #[test]
    fn users_are_listed_by_name() {
        let (_dir, catalog) = catalog();
        catalog.add_user("bob", "h").unwrap();
        catalog.add_user("alice", "h").unwrap();
        let names: Vec<_> = catalog
            .users()
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }
}
