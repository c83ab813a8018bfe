use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::UniqueKey;
use crate::domain::entity::ports::EntityRepository;
use crate::domain::entity::ports::LifecyclePort;
use crate::domain::entity::service::LifecycleService;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserPatch;
use crate::domain::user::ports::UserServicePort;
use crate::domain::values::PhoneNumber;

/// Domain service implementation for user operations.
///
/// Wraps the generic lifecycle and adds password hashing.
pub struct UserService<UR>
where
    UR: EntityRepository<User>,
{
    repository: Arc<UR>,
    lifecycle: LifecycleService<User, UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: EntityRepository<User>,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self::with_hasher(repository, auth::PasswordHasher::new())
    }

    pub fn with_hasher(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            lifecycle: LifecycleService::new(Arc::clone(&repository)),
            repository,
            password_hasher,
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, EntityError> {
        if password.is_empty() {
            return Err(EntityError::InvalidPassword(
                "password must not be empty".to_string(),
            ));
        }

        self.password_hasher
            .hash(password)
            .map_err(|e| EntityError::Unknown(format!("Password hashing failed: {}", e)))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: EntityRepository<User>,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, EntityError> {
        let password_hash = self.hash_password(&command.password)?;

        let draft = UserDraft {
            name: command.name,
            email: command.email,
            phone: command.phone,
            password_hash,
        };

        self.lifecycle.create(draft).await
    }

    async fn update_user(
        &self,
        id: RecordId,
        command: UpdateUserCommand,
    ) -> Result<User, EntityError> {
        let password_hash = match command.password {
            Some(password) => Some(self.hash_password(&password)?),
            None => None,
        };

        let patch = UserPatch {
            name: command.name,
            email: command.email,
            phone: command.phone,
            password_hash,
        };

        self.lifecycle.update(id, patch).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, EntityError> {
        self.repository
            .find_by_unique(&UniqueKey::new(User::EMAIL, email))
            .await
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<User>, EntityError> {
        self.repository
            .find_by_unique(&UniqueKey::new(User::PHONE, phone.as_str()))
            .await
    }
}

#[async_trait]
impl<UR> LifecyclePort<User> for UserService<UR>
where
    UR: EntityRepository<User>,
{
    async fn create(&self, draft: UserDraft) -> Result<User, EntityError> {
        self.lifecycle.create(draft).await
    }

    async fn get(&self, id: RecordId) -> Result<User, EntityError> {
        self.lifecycle.get(id).await
    }

    async fn list(&self) -> Result<Vec<User>, EntityError> {
        self.lifecycle.list().await
    }

    async fn search(&self, term: &str) -> Result<Vec<User>, EntityError> {
        self.lifecycle.search(term).await
    }

    async fn update(&self, id: RecordId, patch: UserPatch) -> Result<User, EntityError> {
        self.lifecycle.update(id, patch).await
    }

    async fn set_active(&self, id: RecordId, active: bool) -> Result<User, EntityError> {
        self.lifecycle.set_active(id, active).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::entity::models::Entity;
    use crate::domain::entity::models::RecordMeta;
    use crate::domain::entity::models::SearchTerm;
    use crate::domain::values::EmailAddress;
    use crate::domain::values::Name;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl EntityRepository<User> for TestUserRepository {
            async fn insert(&self, draft: UserDraft, created_at: DateTime<Utc>) -> Result<User, EntityError>;
            async fn find_by_id(&self, id: RecordId) -> Result<Option<User>, EntityError>;
            async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<User>, EntityError>;
            async fn list_all(&self) -> Result<Vec<User>, EntityError>;
            async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<User>, EntityError>;
            async fn update(&self, id: RecordId, patch: UserPatch, updated_at: DateTime<Utc>) -> Result<User, EntityError>;
            async fn set_active(&self, id: RecordId, active: bool, updated_at: DateTime<Utc>) -> Result<User, EntityError>;
        }
    }

    fn register_command(email: &str, phone: &str, password: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            name: Name::new("Ana Souza".to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            phone: PhoneNumber::new(phone.to_string()).unwrap(),
            password: password.to_string(),
        }
    }

    fn stored_user(id: i64, email: &str, phone: &str) -> User {
        User {
            meta: RecordMeta::created(RecordId(id), Utc::now()),
            name: Name::new("Ana Souza".to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            phone: PhoneNumber::new(phone.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_unique()
            .times(2)
            .returning(|_| Ok(None));
        repository
            .expect_insert()
            .withf(|draft, _| {
                draft.email.as_str() == "ana@example.com"
                    && draft.password_hash.starts_with("$argon2")
                    && !draft.password_hash.contains("s3cret-pass")
            })
            .times(1)
            .returning(|draft, at| {
                Ok(User::materialize(draft, RecordMeta::created(RecordId(1), at)))
            });

        let service = UserService::new(Arc::new(repository));
        let user = service
            .register(register_command("ana@example.com", "11987654321", "s3cret-pass"))
            .await
            .unwrap();

        assert_eq!(user.phone.as_str(), "+5511987654321");
        assert!(auth::PasswordHasher::new()
            .verify("s3cret-pass", &user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_phone() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_unique()
            .returning(|key| match key.field {
                "phone" => Ok(Some(stored_user(4, "other@example.com", "11987654321"))),
                _ => Ok(None),
            });
        repository.expect_insert().times(0);

        let service = UserService::new(Arc::new(repository));
        let result = service
            .register(register_command("ana@example.com", "+55 11 98765-4321", "pw"))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            EntityError::Conflict {
                kind: "user",
                field: "phone",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_password() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_insert().times(0);

        let service = UserService::new(Arc::new(repository));
        let result = service
            .register(register_command("ana@example.com", "11987654321", ""))
            .await;

        assert!(matches!(result.unwrap_err(), EntityError::InvalidPassword(_)));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_user(id.0, "ana@example.com", "11987654321"))));
        repository
            .expect_update()
            .withf(|id, patch, _| {
                *id == RecordId(2)
                    && patch.name.is_none()
                    && patch
                        .password_hash
                        .as_deref()
                        .is_some_and(|hash| hash.starts_with("$argon2"))
            })
            .times(1)
            .returning(|id, patch, at| {
                let mut user = stored_user(id.0, "ana@example.com", "11987654321");
                user.apply(patch);
                user.touch(at);
                Ok(user)
            });

        let service = UserService::new(Arc::new(repository));
        let command = UpdateUserCommand {
            password: Some("new-password".to_string()),
            ..Default::default()
        };
        let user = service.update_user(RecordId(2), command).await.unwrap();

        assert_ne!(user.password_hash, "$argon2id$test_hash");
        assert!(auth::PasswordHasher::new()
            .verify("new-password", &user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_find_by_email_uses_email_key() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_unique()
            .withf(|key| key.field == "email" && key.value == "ana@example.com")
            .times(1)
            .returning(|_| Ok(Some(stored_user(1, "ana@example.com", "11987654321"))));

        let service = UserService::new(Arc::new(repository));
        let found = service.find_by_email("ana@example.com").await.unwrap();

        assert_eq!(found.map(|user| user.id()), Some(RecordId(1)));
    }

    #[tokio::test]
    async fn test_find_by_phone_miss() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_unique()
            .withf(|key| key.field == "phone" && key.value == "+5511987654321")
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));
        let phone = PhoneNumber::new("(11) 98765-4321".to_string()).unwrap();

        assert!(service.find_by_phone(&phone).await.unwrap().is_none());
    }
}
