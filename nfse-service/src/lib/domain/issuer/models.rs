use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::UniqueKey;
use crate::domain::values::DocumentNumber;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;

/// Company issuing invoices (emitente), identified by its CNPJ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    pub meta: RecordMeta,
    pub name: Name,
    pub cnpj: DocumentNumber,
    pub phone: PhoneNumber,
    pub email: EmailAddress,
}

impl Issuer {
    pub const CNPJ: &'static str = "cnpj";
}

#[derive(Debug)]
pub struct IssuerDraft {
    pub name: Name,
    pub cnpj: DocumentNumber,
    pub phone: PhoneNumber,
    pub email: EmailAddress,
}

#[derive(Debug, Default)]
pub struct IssuerPatch {
    pub name: Option<Name>,
    pub cnpj: Option<DocumentNumber>,
    pub phone: Option<PhoneNumber>,
    pub email: Option<EmailAddress>,
}

impl Entity for Issuer {
    type Draft = IssuerDraft;
    type Patch = IssuerPatch;

    const KIND: &'static str = "issuer";

    fn materialize(draft: IssuerDraft, meta: RecordMeta) -> Self {
        Self {
            meta,
            name: draft.name,
            cnpj: draft.cnpj,
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

    fn apply(&mut self, patch: IssuerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(cnpj) = patch.cnpj {
            self.cnpj = cnpj;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }

    fn patch_is_empty(patch: &IssuerPatch) -> bool {
        patch.name.is_none()
            && patch.cnpj.is_none()
            && patch.phone.is_none()
            && patch.email.is_none()
    }

    fn draft_unique_keys(draft: &IssuerDraft) -> Vec<UniqueKey> {
        vec![UniqueKey::new(Self::CNPJ, draft.cnpj.as_str())]
    }

    fn patch_unique_keys(patch: &IssuerPatch) -> Vec<UniqueKey> {
        patch
            .cnpj
            .iter()
            .map(|cnpj| UniqueKey::new(Self::CNPJ, cnpj.as_str()))
            .collect()
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(Self::CNPJ, self.cnpj.as_str())]
    }

    fn search_name(&self) -> &str {
        self.name.as_str()
    }

    fn search_key(&self) -> &str {
        self.cnpj.as_str()
    }
}
