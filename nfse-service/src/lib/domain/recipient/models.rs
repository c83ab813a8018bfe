use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::UniqueKey;
use crate::domain::values::DocumentNumber;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;

/// Invoice recipient (destinatário), a person (CPF) or a company (CNPJ).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub meta: RecordMeta,
    pub name: Name,
    pub document: DocumentNumber,
    pub phone: Option<PhoneNumber>,
    pub email: Option<EmailAddress>,
}

impl Recipient {
    pub const DOCUMENT: &'static str = "document";
}

#[derive(Debug)]
pub struct RecipientDraft {
    pub name: Name,
    pub document: DocumentNumber,
    pub phone: Option<PhoneNumber>,
    pub email: Option<EmailAddress>,
}

/// Partial update. Contact fields can be set but not cleared.
#[derive(Debug, Default)]
pub struct RecipientPatch {
    pub name: Option<Name>,
    pub document: Option<DocumentNumber>,
    pub phone: Option<PhoneNumber>,
    pub email: Option<EmailAddress>,
}

impl Entity for Recipient {
    type Draft = RecipientDraft;
    type Patch = RecipientPatch;

    const KIND: &'static str = "recipient";

    fn materialize(draft: RecipientDraft, meta: RecordMeta) -> Self {
        Self {
            meta,
            name: draft.name,
            document: draft.document,
            phone: draft.phone,
            email: draft.email,
        }
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn apply(&mut self, patch: RecipientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(document) = patch.document {
            self.document = document;
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
    }

    fn patch_is_empty(patch: &RecipientPatch) -> bool {
        patch.name.is_none()
            && patch.document.is_none()
            && patch.phone.is_none()
            && patch.email.is_none()
    }

    fn draft_unique_keys(draft: &RecipientDraft) -> Vec<UniqueKey> {
        vec![UniqueKey::new(Self::DOCUMENT, draft.document.as_str())]
    }

    fn patch_unique_keys(patch: &RecipientPatch) -> Vec<UniqueKey> {
        patch
            .document
            .iter()
            .map(|document| UniqueKey::new(Self::DOCUMENT, document.as_str()))
            .collect()
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(Self::DOCUMENT, self.document.as_str())]
    }

    fn search_name(&self) -> &str {
        self.name.as_str()
    }

    fn search_key(&self) -> &str {
        self.document.as_str()
    }
}
