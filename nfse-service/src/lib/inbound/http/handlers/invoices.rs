use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::entities::Creatable;
use super::entities::Resource;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::ports::LifecyclePort;
use crate::domain::invoice::models::Invoice;
use crate::domain::invoice::models::InvoiceDraft;
use crate::domain::values::Amount;
use crate::domain::values::Code;
use crate::domain::values::DocumentNumber;
use crate::domain::values::Name;
use crate::inbound::http::router::AppState;

/// Money as a JSON number (`1500.5`) or a decimal string (`"1500.50"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    fn text(&self) -> String {
        match self {
            AmountInput::Number(number) => number.to_string(),
            AmountInput::Text(text) => text.clone(),
        }
    }
}

fn optional_amount(
    field: &'static str,
    input: Option<AmountInput>,
) -> Result<Option<Amount>, EntityError> {
    Ok(input
        .map(|input| Amount::parse(field, &input.text()))
        .transpose()?)
}

/// HTTP request body for registering an invoice (raw JSON)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceRequest {
    number: String,
    series: String,
    cfop: String,
    issuer_name: String,
    issuer_cnpj: String,
    recipient_name: String,
    /// CPF or CNPJ, formatted or digits only
    recipient_document: String,
    total: AmountInput,
    #[serde(default)]
    icms: Option<AmountInput>,
    #[serde(default)]
    pis: Option<AmountInput>,
    #[serde(default)]
    cofins: Option<AmountInput>,
    #[serde(default)]
    discount: Option<AmountInput>,
}

/// Invoice as returned by the API; amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceData {
    pub id: i64,
    pub number: String,
    pub series: String,
    pub cfop: String,
    pub issuer_name: String,
    pub issuer_cnpj: String,
    pub recipient_name: String,
    pub recipient_document: String,
    pub total: String,
    pub icms: Option<String>,
    pub pis: Option<String>,
    pub cofins: Option<String>,
    pub discount: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceData {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.meta.id.0,
            number: invoice.number.as_str().to_string(),
            series: invoice.series.as_str().to_string(),
            cfop: invoice.cfop.as_str().to_string(),
            issuer_name: invoice.issuer_name.as_str().to_string(),
            issuer_cnpj: invoice.issuer_cnpj.as_str().to_string(),
            recipient_name: invoice.recipient_name.as_str().to_string(),
            recipient_document: invoice.recipient_document.as_str().to_string(),
            total: invoice.total.to_string(),
            icms: invoice.icms.map(|a| a.to_string()),
            pis: invoice.pis.map(|a| a.to_string()),
            cofins: invoice.cofins.map(|a| a.to_string()),
            discount: invoice.discount.map(|a| a.to_string()),
            created_at: invoice.meta.created_at,
            updated_at: invoice.meta.updated_at,
        }
    }
}

impl Resource for Invoice {
    type Data = InvoiceData;

    const COLLECTION: &'static str = "invoices";

    fn service(state: &AppState) -> Arc<dyn LifecyclePort<Self>> {
        Arc::clone(&state.invoices)
    }
}

impl Creatable for Invoice {
    type CreateBody = CreateInvoiceRequest;

    fn draft(body: CreateInvoiceRequest) -> Result<InvoiceDraft, EntityError> {
        Ok(InvoiceDraft {
            number: Code::new(Invoice::NUMBER, body.number, Invoice::NUMBER_MAX_LENGTH)?,
            series: Code::new(Invoice::SERIES, body.series, Invoice::SERIES_MAX_LENGTH)?,
            cfop: Code::new(Invoice::CFOP, body.cfop, Invoice::CFOP_MAX_LENGTH)?,
            issuer_name: Name::new(body.issuer_name)?,
            issuer_cnpj: DocumentNumber::cnpj(body.issuer_cnpj)?,
            recipient_name: Name::new(body.recipient_name)?,
            recipient_document: DocumentNumber::new(body.recipient_document)?,
            total: Amount::positive("total", &body.total.text())?,
            icms: optional_amount("icms", body.icms)?,
            pis: optional_amount("pis", body.pis)?,
            cofins: optional_amount("cofins", body.cofins)?,
            discount: optional_amount("discount", body.discount)?,
        })
    }
}
