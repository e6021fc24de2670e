use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod action {
    use super::*;

    /// Result of a server action that did not navigate away.
    ///
    /// `errors` is only present for validation failures and is keyed by the
    /// form field name (`customerId`, `amount`, `status`).
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ActionState {
        pub message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub errors: Option<BTreeMap<String, Vec<String>>>,
    }

    impl ActionState {
        pub fn message(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
                errors: None,
            }
        }

        pub fn invalid(
            message: impl Into<String>,
            errors: BTreeMap<String, Vec<String>>,
        ) -> Self {
            Self {
                message: message.into(),
                errors: Some(errors),
            }
        }
    }
}

pub mod invoice {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvoiceStatus {
        Pending,
        Paid,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct InvoiceView {
        pub id: String,
        pub customer_id: String,
        /// Amount in cents.
        pub amount_minor: i64,
        pub status: InvoiceStatus,
        /// ISO-8601 calendar date.
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceListResponse {
        pub invoices: Vec<InvoiceView>,
    }

    /// Invoice values used to pre-fill the edit form.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct InvoiceForm {
        pub id: String,
        pub customer_id: String,
        /// Amount in dollars.
        pub amount: f64,
        pub status: InvoiceStatus,
    }
}

pub mod customer {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CustomerField {
        pub id: String,
        pub name: String,
    }
}

pub mod page {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Breadcrumb {
        pub label: String,
        pub href: String,
        #[serde(default)]
        pub active: bool,
    }

    /// Everything the edit-invoice page needs.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EditInvoicePage {
        pub breadcrumbs: Vec<Breadcrumb>,
        pub invoice: invoice::InvoiceForm,
        pub customers: Vec<customer::CustomerField>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignInFailed {
        pub message: String,
    }
}
