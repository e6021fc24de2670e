//! Invoices endpoints

use api_types::{
    customer::CustomerField,
    invoice::{InvoiceForm, InvoiceListResponse, InvoiceStatus as ApiStatus, InvoiceView},
    page::{Breadcrumb, EditInvoicePage},
};
use axum::{
    Form, Json,
    extract::{Path, State},
};
use engine::{FormData, Invoice, InvoiceStatus};
use serde_json::Value;

use crate::{
    ServerError,
    actions::{self, ActionOutcome, INVOICES_PATH},
    server::ServerState,
};

fn map_status(status: InvoiceStatus) -> ApiStatus {
    match status {
        InvoiceStatus::Pending => ApiStatus::Pending,
        InvoiceStatus::Paid => ApiStatus::Paid,
    }
}

fn invoice_view(invoice: Invoice) -> InvoiceView {
    InvoiceView {
        id: invoice.id,
        customer_id: invoice.customer_id,
        amount_minor: invoice.amount.cents(),
        status: map_status(invoice.status),
        date: invoice.date,
    }
}

/// Invoice list, served from the page cache until a mutation revalidates it.
pub async fn list(State(state): State<ServerState>) -> Result<Json<Value>, ServerError> {
    if let Some(cached) = state.cache.get(INVOICES_PATH) {
        return Ok(Json(Value::clone(&cached)));
    }

    let generation = state.cache.generation();
    let invoices = state.engine.invoices().await?;
    let response = InvoiceListResponse {
        invoices: invoices.into_iter().map(invoice_view).collect(),
    };
    let payload =
        serde_json::to_value(response).map_err(|err| ServerError::Internal(err.to_string()))?;
    let payload = state
        .cache
        .insert_if_fresh(INVOICES_PATH, generation, payload);

    Ok(Json(Value::clone(&payload)))
}

pub async fn create(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> ActionOutcome {
    actions::create_invoice(state.engine.as_ref(), state.cache.as_ref(), &form).await
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> ActionOutcome {
    actions::update_invoice(state.engine.as_ref(), state.cache.as_ref(), &id, &form).await
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> ActionOutcome {
    actions::delete_invoice(state.engine.as_ref(), state.cache.as_ref(), &id).await
}

/// Data for the edit-invoice page. Unknown ids are a 404.
pub async fn edit_page(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<EditInvoicePage>, ServerError> {
    let (invoice, customers) =
        tokio::try_join!(state.engine.invoice_by_id(&id), state.engine.customers())?;

    let breadcrumbs = vec![
        Breadcrumb {
            label: "Invoices".to_string(),
            href: INVOICES_PATH.to_string(),
            active: false,
        },
        Breadcrumb {
            label: "Edit Invoice".to_string(),
            href: format!("{INVOICES_PATH}/{id}/edit"),
            active: true,
        },
    ];

    Ok(Json(EditInvoicePage {
        breadcrumbs,
        invoice: InvoiceForm {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: invoice.amount.to_display_amount(),
            status: map_status(invoice.status),
        },
        customers: customers
            .into_iter()
            .map(|customer| CustomerField {
                id: customer.id,
                name: customer.name,
            })
            .collect(),
    }))
}
