use tracing::{info, instrument, warn};

use crate::auth::{base_username, resolve_unique_username, verify_password, PasswordHasher};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{validate_password, Account};
use crate::store::AccountStore;

/// Lifecycle rules shared by every account kind.
///
/// One instance per kind: the store's associated `Account` type picks
/// Trainee or Trainer. Kind-specific operations live in inherent impls
/// bounded on `TraineeStore` / `TrainerStore`.
pub struct AccountService<R> {
    pub(crate) store: R,
    hasher: PasswordHasher,
}

impl<R: AccountStore> AccountService<R> {
    pub fn new(store: R) -> Self {
        Self::with_hasher(store, PasswordHasher::default())
    }

    pub fn with_hasher(store: R, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    fn kind() -> &'static str {
        <R::Account as Account>::KIND
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<R::Account>> {
        info!(kind = Self::kind(), id, "Searching for account by id");
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Option<R::Account>> {
        info!(kind = Self::kind(), username, "Searching for account by username");
        Ok(self.store.find_by_username(username).await?)
    }

    pub async fn find_by_username_or_fail(&self, username: &str) -> ServiceResult<R::Account> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("{} with username {username}", Self::kind())))
    }

    /// Provision and persist a new account.
    ///
    /// Rejects a person already registered under either kind, then assigns a
    /// unique username derived from the name, a password hash and active status.
    #[instrument(skip_all, fields(kind = Self::kind()))]
    pub async fn create(&self, mut account: R::Account, password: &str) -> ServiceResult<R::Account> {
        account.validate()?;
        validate_password(password)?;

        let user = account.user();
        info!("Checking if person is already registered");
        if self
            .store
            .exists_by_first_and_last_name(&user.first_name, &user.last_name)
            .await?
        {
            return Err(ServiceError::Conflict(format!(
                "{} is already registered",
                user.full_name()
            )));
        }

        let base = base_username(&user.first_name, &user.last_name);
        let store = &self.store;
        let username =
            resolve_unique_username(&base, |candidate| async move { store.username_exists(&candidate).await })
                .await?;

        let password_hash = self.hasher.hash(password)?;
        let user = account.user_mut();
        user.id = None;
        user.username = username;
        user.password_hash = password_hash;
        user.is_active = true;

        let saved = self.store.save(account).await?;
        info!(id = ?saved.id(), username = saved.username(), "Account created");
        Ok(saved)
    }

    /// Persist every field of an existing account as given.
    ///
    /// The username is not re-derived and the password hash is stored as is,
    /// so both must be present: an account built from scratch is rejected.
    pub async fn update(&self, account: R::Account) -> ServiceResult<R::Account> {
        account.validate()?;

        let id = account
            .id()
            .ok_or_else(|| ServiceError::NotFound(format!("{} without id", Self::kind())))?;
        account.user().validate_provisioned()?;
        if !self.store.exists_by_id(id).await? {
            return Err(ServiceError::NotFound(format!("{} with id={id}", Self::kind())));
        }

        info!(kind = Self::kind(), id, "Updating account");
        Ok(self.store.update(account).await?)
    }

    /// Replace the credential when `old_password` matches.
    ///
    /// Returns `false` without touching the account or the store on mismatch.
    pub async fn change_password(
        &self,
        account: &mut R::Account,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<bool> {
        validate_password(new_password)?;

        if !verify_password(old_password, &account.user().password_hash)? {
            warn!(kind = Self::kind(), username = account.username(), "Old password does not match");
            return Ok(false);
        }

        let mut changed = account.clone();
        changed.user_mut().password_hash = self.hasher.hash(new_password)?;
        *account = self.store.update(changed).await?;

        info!(kind = Self::kind(), username = account.username(), "Password changed");
        Ok(true)
    }

    /// Mark the account active. `false` when no account has this id.
    pub async fn activate_status(&self, id: i64) -> ServiceResult<bool> {
        info!(kind = Self::kind(), id, "Activating account");
        self.set_status(id, true).await
    }

    /// Mark the account inactive and return the resulting status (`false`),
    /// or `false` when no account has this id.
    pub async fn deactivate_status(&self, id: i64) -> ServiceResult<bool> {
        info!(kind = Self::kind(), id, "Deactivating account");
        self.set_status(id, false).await
    }

    async fn set_status(&self, id: i64, active: bool) -> ServiceResult<bool> {
        let Some(mut account) = self.store.find_by_id(id).await? else {
            return Ok(false);
        };

        account.user_mut().is_active = active;
        let stored = self.store.update(account).await?;
        Ok(stored.is_active())
    }

    pub async fn is_credential_match(&self, username: &str, password: &str) -> ServiceResult<bool> {
        info!(kind = Self::kind(), username, "Verifying credentials");
        match self.store.find_by_username(username).await? {
            Some(account) => Ok(verify_password(password, &account.user().password_hash)?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Trainee, ValidationError};
    use crate::store::{MockAccountStore, StoreError};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn service(store: MockAccountStore) -> AccountService<MockAccountStore> {
        AccountService::with_hasher(store, PasswordHasher::new(PasswordHasher::MIN_COST))
    }

    fn anna() -> Trainee {
        Trainee::new("Anna", "Lee", Some("1 Elm St".to_string()), None)
    }

    fn stored_anna(password: &str) -> Trainee {
        let mut trainee = anna();
        trainee.user.id = Some(1);
        trainee.user.username = "Anna.Lee".to_string();
        trainee.user.password_hash = bcrypt::hash(password, 4).unwrap();
        trainee
    }

    #[tokio::test]
    async fn test_create_assigns_base_username_and_credentials() {
        let mut store = MockAccountStore::new();
        store
            .expect_exists_by_first_and_last_name()
            .times(1)
            .returning(|_, _| Ok(false));
        store.expect_username_exists().times(1).returning(|_| Ok(false));
        store.expect_save().times(1).returning(|mut trainee: Trainee| {
            trainee.user.id = Some(7);
            Ok(trainee)
        });

        let created = service(store).create(anna(), "Secret1").await.unwrap();

        assert_eq!(created.id(), Some(7));
        assert_eq!(created.username(), "Anna.Lee");
        assert!(created.is_active());
        assert!(verify_password("Secret1", &created.user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_probes_suffixes_until_free() {
        let mut store = MockAccountStore::new();
        store.expect_exists_by_first_and_last_name().returning(|_, _| Ok(false));
        store
            .expect_username_exists()
            .times(3)
            .returning(|candidate| Ok(candidate.to_string() != "Anna.Lee2"));
        store.expect_save().returning(|trainee: Trainee| Ok(trainee));

        let created = service(store).create(anna(), "Secret1").await.unwrap();

        assert_eq!(created.username(), "Anna.Lee2");
    }

    #[tokio::test]
    async fn test_create_rejects_registered_person() {
        let mut store = MockAccountStore::new();
        store.expect_exists_by_first_and_last_name().returning(|_, _| Ok(true));
        store.expect_username_exists().never();
        store.expect_save().never();

        let result = service(store).create(anna(), "Secret1").await;

        assert_matches!(result, Err(ServiceError::Conflict(message)) if message.contains("Anna Lee"));
    }

    #[tokio::test]
    async fn test_create_validates_before_store_access() {
        // No expectations: any store call panics.
        let store = MockAccountStore::new();
        let blank = Trainee::new("", "Lee", None, None);

        let result = service(store).create(blank, "Secret1").await;

        assert_matches!(result, Err(ServiceError::Validation(ValidationError::Blank("first name"))));
    }

    #[tokio::test]
    async fn test_create_surfaces_insert_race_as_conflict() {
        let mut store = MockAccountStore::new();
        store.expect_exists_by_first_and_last_name().returning(|_, _| Ok(false));
        store.expect_username_exists().returning(|_| Ok(false));
        store
            .expect_save()
            .returning(|_| Err(StoreError::UniqueViolation("users_username_key".to_string())));

        let result = service(store).create(anna(), "Secret1").await;

        assert_matches!(result, Err(ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_requires_existing_account() {
        let mut store = MockAccountStore::new();
        store.expect_exists_by_id().returning(|_| Ok(false));
        store.expect_update().never();

        let result = service(store).update(stored_anna("Secret1")).await;

        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_without_id_is_not_found() {
        let store = MockAccountStore::new();

        let result = service(store).update(anna()).await;

        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_unprovisioned_account_before_store_access() {
        // No expectations: any store call panics.
        let store = MockAccountStore::new();
        let service = service(store);

        let mut from_scratch = anna();
        from_scratch.user.id = Some(1);
        let result = service.update(from_scratch).await;
        assert_matches!(result, Err(ServiceError::Validation(ValidationError::Blank("username"))));

        let mut without_hash = stored_anna("Secret1");
        without_hash.user.password_hash = String::new();
        let result = service.update(without_hash).await;
        assert_matches!(result, Err(ServiceError::Validation(ValidationError::Blank("password hash"))));
    }

    #[tokio::test]
    async fn test_update_keeps_username_and_hash() {
        let mut store = MockAccountStore::new();
        store.expect_exists_by_id().returning(|_| Ok(true));
        store.expect_update().times(1).returning(|trainee: Trainee| Ok(trainee));

        let mut renamed = stored_anna("Secret1");
        renamed.user.username = "anna.lee.custom".to_string();
        let original_hash = renamed.user.password_hash.clone();

        let updated = service(store).update(renamed).await.unwrap();

        assert_eq!(updated.username(), "anna.lee.custom");
        assert_eq!(updated.user.password_hash, original_hash);
    }

    #[tokio::test]
    async fn test_change_password_mismatch_leaves_account_untouched() {
        let mut store = MockAccountStore::new();
        store.expect_update().never();

        let mut account = stored_anna("Secret1");
        let before = account.clone();

        let changed = service(store)
            .change_password(&mut account, "WrongOld1", "NewSecret1")
            .await
            .unwrap();

        assert!(!changed);
        assert_eq!(account, before);
    }

    #[tokio::test]
    async fn test_change_password_replaces_hash() {
        let mut store = MockAccountStore::new();
        store.expect_update().times(1).returning(|trainee: Trainee| Ok(trainee));

        let mut account = stored_anna("Secret1");
        let changed = service(store)
            .change_password(&mut account, "Secret1", "NewSecret1")
            .await
            .unwrap();

        assert!(changed);
        assert!(verify_password("NewSecret1", &account.user.password_hash).unwrap());
        assert!(!verify_password("Secret1", &account.user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_status_toggle_on_missing_id_is_false() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));
        store.expect_update().never();

        let service = service(store);

        assert!(!service.activate_status(99).await.unwrap());
        assert!(!service.deactivate_status(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_status_toggle_returns_resulting_status() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_id().returning(|_| Ok(Some(stored_anna("Secret1"))));
        store.expect_update().returning(|trainee: Trainee| Ok(trainee));

        let service = service(store);

        assert!(service.activate_status(1).await.unwrap());
        assert!(!service.deactivate_status(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_credential_match() {
        let hash = bcrypt::hash("Secret1", 4).unwrap();
        let mut store = MockAccountStore::new();
        store.expect_find_by_username().returning(move |username| {
            if username.to_string() == "Anna.Lee" {
                let mut trainee = stored_anna("unused");
                trainee.user.password_hash = hash.clone();
                Ok(Some(trainee))
            } else {
                Ok(None)
            }
        });

        let service = service(store);

        assert!(service.is_credential_match("Anna.Lee", "Secret1").await.unwrap());
        assert!(!service.is_credential_match("Anna.Lee", "Secret2").await.unwrap());
        assert!(!service.is_credential_match("Nobody.Here", "Secret1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_username_or_fail() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));

        let result = service(store).find_by_username_or_fail("Nobody.Here").await;

        assert_matches!(result, Err(ServiceError::NotFound(message)) if message.contains("Nobody.Here"));
    }
}
