use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::entities::Creatable;
use super::entities::Editable;
use super::entities::Resource;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::ports::LifecyclePort;
use crate::domain::recipient::models::Recipient;
use crate::domain::recipient::models::RecipientDraft;
use crate::domain::recipient::models::RecipientPatch;
use crate::domain::values::DocumentNumber;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;
use crate::inbound::http::router::AppState;

/// HTTP request body for creating a recipient (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRecipientRequest {
    name: String,
    /// CPF or CNPJ, formatted or digits only
    document: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRecipientRequest {
    name: Option<String>,
    document: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientData {
    pub id: i64,
    pub name: String,
    pub document: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Recipient> for RecipientData {
    fn from(recipient: &Recipient) -> Self {
        Self {
            id: recipient.meta.id.0,
            name: recipient.name.as_str().to_string(),
            document: recipient.document.as_str().to_string(),
            phone: recipient.phone.as_ref().map(|p| p.as_str().to_string()),
            email: recipient.email.as_ref().map(|e| e.as_str().to_string()),
            active: recipient.meta.active,
            created_at: recipient.meta.created_at,
            updated_at: recipient.meta.updated_at,
        }
    }
}

impl Resource for Recipient {
    type Data = RecipientData;

    const COLLECTION: &'static str = "recipients";

    fn service(state: &AppState) -> Arc<dyn LifecyclePort<Self>> {
        Arc::clone(&state.recipients)
    }
}

impl Creatable for Recipient {
    type CreateBody = CreateRecipientRequest;

    fn draft(body: CreateRecipientRequest) -> Result<RecipientDraft, EntityError> {
        Ok(RecipientDraft {
            name: Name::new(body.name)?,
            document: DocumentNumber::new(body.document)?,
            phone: body.phone.map(PhoneNumber::new).transpose()?,
            email: body.email.map(EmailAddress::new).transpose()?,
        })
    }
}

impl Editable for Recipient {
    type UpdateBody = UpdateRecipientRequest;

    fn patch(body: UpdateRecipientRequest) -> Result<RecipientPatch, EntityError> {
        Ok(RecipientPatch {
            name: body.name.map(Name::new).transpose()?,
            document: body.document.map(DocumentNumber::new).transpose()?,
            phone: body.phone.map(PhoneNumber::new).transpose()?,
            email: body.email.map(EmailAddress::new).transpose()?,
        })
    }
}
