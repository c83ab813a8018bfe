use async_trait::async_trait;

use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::RecordId;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::values::PhoneNumber;

/// Port for the user operations that involve credentials.
///
/// Status changes, reads and search go through `LifecyclePort<User>`.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new active user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing name, email, phone and password
    ///
    /// # Errors
    /// * `InvalidPassword` - Password is empty
    /// * `Conflict` - Email or phone is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, EntityError>;

    /// Update existing user with optional fields.
    ///
    /// A new password is hashed before it is stored.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmptyUpdate` - Command carries no field
    /// * `Conflict` - New email or phone belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn update_user(
        &self,
        id: RecordId,
        command: UpdateUserCommand,
    ) -> Result<User, EntityError>;

    /// Retrieve user by exact email (None if not found).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, EntityError>;

    /// Retrieve user by phone number (None if not found).
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<User>, EntityError>;
}
