//! Invoice primitives.
//!
//! An `Invoice` bills a customer for an amount stored in cents. The `date` is
//! stamped by the engine when the invoice is created and never changes
//! afterwards.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = EngineError;

    /// Only the exact lowercase literals are accepted.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid invoice status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: MoneyCents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// A validated invoice ready to be inserted. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: MoneyCents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Fields replaced by an update. `id` and `date` are never part of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: MoneyCents,
    pub status: InvoiceStatus,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: String,
    pub date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customer,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_new(id: String, invoice: &NewInvoice) -> Self {
        Self {
            id: ActiveValue::Set(id),
            customer_id: ActiveValue::Set(invoice.customer_id.clone()),
            amount: ActiveValue::Set(invoice.amount.cents()),
            status: ActiveValue::Set(invoice.status.as_str().to_string()),
            date: ActiveValue::Set(invoice.date),
        }
    }
}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            customer_id: model.customer_id,
            amount: MoneyCents::new(model.amount),
            status: InvoiceStatus::try_from(model.status.as_str())?,
            date: model.date,
        })
    }
}
