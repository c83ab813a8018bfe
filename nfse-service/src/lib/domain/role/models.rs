use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::UniqueKey;
use crate::domain::values::Description;
use crate::domain::values::Name;

/// Access role. Its name is its natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub meta: RecordMeta,
    pub name: Name,
    pub description: Description,
}

impl Role {
    pub const NAME: &'static str = "name";
}

#[derive(Debug)]
pub struct RoleDraft {
    pub name: Name,
    pub description: Description,
}

#[derive(Debug, Default)]
pub struct RolePatch {
    pub name: Option<Name>,
    pub description: Option<Description>,
}

impl Entity for Role {
    type Draft = RoleDraft;
    type Patch = RolePatch;

    const KIND: &'static str = "role";

    fn materialize(draft: RoleDraft, meta: RecordMeta) -> Self {
        Self {
            meta,
            name: draft.name,
            description: draft.description,
        }
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn apply(&mut self, patch: RolePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn patch_is_empty(patch: &RolePatch) -> bool {
        patch.name.is_none() && patch.description.is_none()
    }

    fn draft_unique_keys(draft: &RoleDraft) -> Vec<UniqueKey> {
        vec![UniqueKey::new(Self::NAME, draft.name.as_str())]
    }

    fn patch_unique_keys(patch: &RolePatch) -> Vec<UniqueKey> {
        patch
            .name
            .iter()
            .map(|name| UniqueKey::new(Self::NAME, name.as_str()))
            .collect()
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(Self::NAME, self.name.as_str())]
    }

    fn search_name(&self) -> &str {
        self.name.as_str()
    }

    fn search_key(&self) -> &str {
        self.name.as_str()
    }
}
