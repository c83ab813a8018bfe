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
use crate::domain::issuer::models::Issuer;
use crate::domain::issuer::models::IssuerDraft;
use crate::domain::issuer::models::IssuerPatch;
use crate::domain::values::DocumentNumber;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;
use crate::inbound::http::router::AppState;

/// HTTP request body for creating an issuer (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIssuerRequest {
    name: String,
    cnpj: String,
    phone: String,
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateIssuerRequest {
    name: Option<String>,
    cnpj: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerData {
    pub id: i64,
    pub name: String,
    pub cnpj: String,
    pub phone: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Issuer> for IssuerData {
    fn from(issuer: &Issuer) -> Self {
        Self {
            id: issuer.meta.id.0,
            name: issuer.name.as_str().to_string(),
            cnpj: issuer.cnpj.as_str().to_string(),
            phone: issuer.phone.as_str().to_string(),
            email: issuer.email.as_str().to_string(),
            active: issuer.meta.active,
            created_at: issuer.meta.created_at,
            updated_at: issuer.meta.updated_at,
        }
    }
}

impl Resource for Issuer {
    type Data = IssuerData;

    const COLLECTION: &'static str = "issuers";

    fn service(state: &AppState) -> Arc<dyn LifecyclePort<Self>> {
        Arc::clone(&state.issuers)
    }
}

impl Creatable for Issuer {
    type CreateBody = CreateIssuerRequest;

    fn draft(body: CreateIssuerRequest) -> Result<IssuerDraft, EntityError> {
        Ok(IssuerDraft {
            name: Name::new(body.name)?,
            cnpj: DocumentNumber::cnpj(body.cnpj)?,
            phone: PhoneNumber::new(body.phone)?,
            email: EmailAddress::new(body.email)?,
        })
    }
}

impl Editable for Issuer {
    type UpdateBody = UpdateIssuerRequest;

    fn patch(body: UpdateIssuerRequest) -> Result<IssuerPatch, EntityError> {
        Ok(IssuerPatch {
            name: body.name.map(Name::new).transpose()?,
            cnpj: body.cnpj.map(DocumentNumber::cnpj).transpose()?,
            phone: body.phone.map(PhoneNumber::new).transpose()?,
            email: body.email.map(EmailAddress::new).transpose()?,
        })
    }
}
