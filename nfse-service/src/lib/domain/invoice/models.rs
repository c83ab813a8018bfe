use std::convert::Infallible;

use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::UniqueKey;
use crate::domain::values::Amount;
use crate::domain::values::Code;
use crate::domain::values::DocumentNumber;
use crate::domain::values::Name;

/// Recorded invoice (nota fiscal).
///
/// Invoices are registered once and never edited. Parties are copied by
/// name and document rather than linked to issuer or recipient records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub meta: RecordMeta,
    pub number: Code,
    pub series: Code,
    pub cfop: Code,
    pub issuer_name: Name,
    pub issuer_cnpj: DocumentNumber,
    pub recipient_name: Name,
    pub recipient_document: DocumentNumber,
    pub total: Amount,
    pub icms: Option<Amount>,
    pub pis: Option<Amount>,
    pub cofins: Option<Amount>,
    pub discount: Option<Amount>,
}

impl Invoice {
    pub const NUMBER: &'static str = "number";
    pub const NUMBER_MAX_LENGTH: usize = 50;

    pub const SERIES: &'static str = "series";
    pub const SERIES_MAX_LENGTH: usize = 20;

    pub const CFOP: &'static str = "cfop";
    pub const CFOP_MAX_LENGTH: usize = 10;
}

#[derive(Debug)]
pub struct InvoiceDraft {
    pub number: Code,
    pub series: Code,
    pub cfop: Code,
    pub issuer_name: Name,
    pub issuer_cnpj: DocumentNumber,
    pub recipient_name: Name,
    pub recipient_document: DocumentNumber,
    pub total: Amount,
    pub icms: Option<Amount>,
    pub pis: Option<Amount>,
    pub cofins: Option<Amount>,
    pub discount: Option<Amount>,
}

impl Entity for Invoice {
    type Draft = InvoiceDraft;
    type Patch = Infallible;

    const KIND: &'static str = "invoice";

    fn materialize(draft: InvoiceDraft, meta: RecordMeta) -> Self {
        Self {
            meta,
            number: draft.number,
            series: draft.series,
            cfop: draft.cfop,
            issuer_name: draft.issuer_name,
            issuer_cnpj: draft.issuer_cnpj,
            recipient_name: draft.recipient_name,
            recipient_document: draft.recipient_document,
            total: draft.total,
            icms: draft.icms,
            pis: draft.pis,
            cofins: draft.cofins,
            discount: draft.discount,
        }
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn apply(&mut self, patch: Infallible) {
        match patch {}
    }

    fn patch_is_empty(patch: &Infallible) -> bool {
        match *patch {}
    }

    fn draft_unique_keys(_draft: &InvoiceDraft) -> Vec<UniqueKey> {
        Vec::new()
    }

    fn patch_unique_keys(patch: &Infallible) -> Vec<UniqueKey> {
        match *patch {}
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    fn search_name(&self) -> &str {
        self.issuer_name.as_str()
    }

    fn search_key(&self) -> &str {
        self.number.as_str()
    }
}
