use async_trait::async_trait;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Customer, EngineError, Invoice, InvoiceChanges, InvoiceStore, NewInvoice, ResultEngine,
    customers, invoices,
};

use super::Engine;

impl Engine {
    /// Return the invoice `id`.
    pub async fn invoice_by_id(&self, id: &str) -> ResultEngine<Invoice> {
        let model = invoices::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("invoice not exists".to_string()))?;
        Invoice::try_from(model)
    }

    /// Return every invoice, newest first.
    pub async fn invoices(&self) -> ResultEngine<Vec<Invoice>> {
        invoices::Entity::find()
            .order_by_desc(invoices::Column::Date)
            .order_by_asc(invoices::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Invoice::try_from)
            .collect()
    }

    /// Return every customer ordered by name.
    pub async fn customers(&self) -> ResultEngine<Vec<Customer>> {
        Ok(customers::Entity::find()
            .order_by_asc(customers::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Customer::from)
            .collect())
    }
}

#[async_trait]
impl InvoiceStore for Engine {
    async fn insert_invoice(&self, invoice: NewInvoice) -> ResultEngine<Invoice> {
        let id = Uuid::new_v4().to_string();
        let model = invoices::ActiveModel::from_new(id, &invoice)
            .insert(&self.database)
            .await?;
        Invoice::try_from(model)
    }

    async fn update_invoice(&self, id: &str, changes: InvoiceChanges) -> ResultEngine<()> {
        let result = invoices::Entity::update_many()
            .set(invoices::ActiveModel {
                customer_id: ActiveValue::Set(changes.customer_id),
                amount: ActiveValue::Set(changes.amount.cents()),
                status: ActiveValue::Set(changes.status.as_str().to_string()),
                ..Default::default()
            })
            .filter(invoices::Column::Id.eq(id.to_string()))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("invoice not exists".to_string()));
        }
        Ok(())
    }

    async fn delete_invoice(&self, id: &str) -> ResultEngine<()> {
        invoices::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
