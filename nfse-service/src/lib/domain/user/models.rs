use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::UniqueKey;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;

/// Registered user and its login credential.
///
/// The email is the login identifier and the token subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub meta: RecordMeta,
    pub name: Name,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub password_hash: String,
}

impl User {
    pub const EMAIL: &'static str = "email";
    pub const PHONE: &'static str = "phone";
}

#[derive(Debug)]
pub struct UserDraft {
    pub name: Name,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub password_hash: String,
}

#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<Name>,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub password_hash: Option<String>,
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub name: Name,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    /// Plain text password (will be hashed by service)
    pub password: String,
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub name: Option<Name>,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub password: Option<String>,
}

impl Entity for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const KIND: &'static str = "user";

    fn materialize(draft: UserDraft, meta: RecordMeta) -> Self {
        Self {
            meta,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            password_hash: draft.password_hash,
        }
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
    }

    fn patch_is_empty(patch: &UserPatch) -> bool {
        patch.name.is_none()
            && patch.email.is_none()
            && patch.phone.is_none()
            && patch.password_hash.is_none()
    }

    fn draft_unique_keys(draft: &UserDraft) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new(Self::EMAIL, draft.email.as_str()),
            UniqueKey::new(Self::PHONE, draft.phone.as_str()),
        ]
    }

    fn patch_unique_keys(patch: &UserPatch) -> Vec<UniqueKey> {
        let mut keys = Vec::new();
        if let Some(email) = &patch.email {
            keys.push(UniqueKey::new(Self::EMAIL, email.as_str()));
        }
        if let Some(phone) = &patch.phone {
            keys.push(UniqueKey::new(Self::PHONE, phone.as_str()));
        }
        keys
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new(Self::EMAIL, self.email.as_str()),
            UniqueKey::new(Self::PHONE, self.phone.as_str()),
        ]
    }

    fn search_name(&self) -> &str {
        self.name.as_str()
    }

    fn search_key(&self) -> &str {
        self.email.as_str()
    }
}
