//! Invoice mutations.
//!
//! Each action validates the submitted form, performs a single write through
//! an [`InvoiceStore`] and reports the result as an [`ActionOutcome`]. Failures
//! are values: nothing is written when validation fails, and nothing is
//! revalidated or redirected when the write fails.

use api_types::action::ActionState;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use engine::{CreateInvoice, EngineError, FormData, InvoiceStore, UpdateInvoice};

use crate::cache::Revalidate;

/// Path of the invoice list view.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Leave the current view for the given path.
    Redirect(&'static str),
    /// Stay on the current view and show the state.
    Completed(ActionState),
    Failed(ActionFailure),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionFailure {
    Invalid(ActionState),
    NotFound(ActionState),
    Database(ActionState),
}

impl ActionFailure {
    pub fn state(&self) -> &ActionState {
        match self {
            Self::Invalid(state) | Self::NotFound(state) | Self::Database(state) => state,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    fn invalid(self, errors: engine::FieldErrors) -> ActionOutcome {
        tracing::debug!("rejected invoice form: {errors}");
        ActionOutcome::Failed(ActionFailure::Invalid(ActionState::invalid(
            format!("Missing Fields. Failed to {} Invoice.", self.verb()),
            errors.into_named(),
        )))
    }

    fn failed(self, err: EngineError) -> ActionOutcome {
        let failure = match err {
            EngineError::KeyNotFound(_) => ActionFailure::NotFound(ActionState::message(format!(
                "Invoice Not Found: Failed to {} Invoice.",
                self.verb()
            ))),
            other => {
                tracing::error!("failed to {} invoice: {other}", self.verb().to_lowercase());
                ActionFailure::Database(ActionState::message(format!(
                    "Database Error: Failed to {} Invoice.",
                    self.verb()
                )))
            }
        };
        ActionOutcome::Failed(failure)
    }
}

/// Create an invoice dated today (UTC) and go back to the invoice list.
pub async fn create_invoice<S, C>(store: &S, cache: &C, form: &FormData) -> ActionOutcome
where
    S: InvoiceStore + ?Sized,
    C: Revalidate + ?Sized,
{
    let input = match CreateInvoice::parse(form) {
        Ok(input) => input,
        Err(errors) => return Mutation::Create.invalid(errors),
    };
    let invoice = input.into_new_invoice(Utc::now().date_naive());

    match store.insert_invoice(invoice).await {
        Ok(created) => tracing::info!("created invoice {}", created.id),
        Err(err) => return Mutation::Create.failed(err),
    }

    cache.invalidate(INVOICES_PATH);
    ActionOutcome::Redirect(INVOICES_PATH)
}

/// Replace customer, amount and status of invoice `id` and go back to the
/// invoice list. The invoice date is left untouched.
pub async fn update_invoice<S, C>(
    store: &S,
    cache: &C,
    id: &str,
    form: &FormData,
) -> ActionOutcome
where
    S: InvoiceStore + ?Sized,
    C: Revalidate + ?Sized,
{
    let input = match UpdateInvoice::parse(form) {
        Ok(input) => input,
        Err(errors) => return Mutation::Update.invalid(errors),
    };

    if let Err(err) = store.update_invoice(id, input.into_changes()).await {
        return Mutation::Update.failed(err);
    }
    tracing::info!("updated invoice {id}");

    cache.invalidate(INVOICES_PATH);
    ActionOutcome::Redirect(INVOICES_PATH)
}

/// Delete invoice `id`, staying on the current view.
pub async fn delete_invoice<S, C>(store: &S, cache: &C, id: &str) -> ActionOutcome
where
    S: InvoiceStore + ?Sized,
    C: Revalidate + ?Sized,
{
    if let Err(err) = store.delete_invoice(id).await {
        return Mutation::Delete.failed(err);
    }
    tracing::info!("deleted invoice {id}");

    cache.invalidate(INVOICES_PATH);
    ActionOutcome::Completed(ActionState::message("Deleted Invoice."))
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            ActionOutcome::Redirect(path) => Redirect::to(path).into_response(),
            ActionOutcome::Completed(state) => (StatusCode::OK, Json(state)).into_response(),
            ActionOutcome::Failed(failure) => {
                let (status, state) = match failure {
                    ActionFailure::Invalid(state) => (StatusCode::UNPROCESSABLE_ENTITY, state),
                    ActionFailure::NotFound(state) => (StatusCode::NOT_FOUND, state),
                    ActionFailure::Database(state) => (StatusCode::INTERNAL_SERVER_ERROR, state),
                };
                (status, Json(state)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use engine::{Invoice, InvoiceChanges, InvoiceStatus, MoneyCents, NewInvoice};
    use sea_orm::DbErr;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        invoices: Mutex<Vec<Invoice>>,
        writes: AtomicUsize,
        broken: bool,
    }

    impl MemoryStore {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn with_invoice(invoice: Invoice) -> Self {
            Self {
                invoices: Mutex::new(vec![invoice]),
                ..Self::default()
            }
        }

        fn write(&self) -> Result<(), EngineError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(EngineError::Database(DbErr::Custom("unreachable".into())));
            }
            Ok(())
        }

        fn snapshot(&self) -> Vec<Invoice> {
            self.invoices.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InvoiceStore for MemoryStore {
        async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, EngineError> {
            self.write()?;
            let mut invoices = self.invoices.lock().unwrap();
            let created = Invoice {
                id: format!("inv{}", invoices.len() + 1),
                customer_id: invoice.customer_id,
                amount: invoice.amount,
                status: invoice.status,
                date: invoice.date,
            };
            invoices.push(created.clone());
            Ok(created)
        }

        async fn update_invoice(
            &self,
            id: &str,
            changes: InvoiceChanges,
        ) -> Result<(), EngineError> {
            self.write()?;
            let mut invoices = self.invoices.lock().unwrap();
            let invoice = invoices
                .iter_mut()
                .find(|invoice| invoice.id == id)
                .ok_or_else(|| EngineError::KeyNotFound("invoice not exists".to_string()))?;
            invoice.customer_id = changes.customer_id;
            invoice.amount = changes.amount;
            invoice.status = changes.status;
            Ok(())
        }

        async fn delete_invoice(&self, id: &str) -> Result<(), EngineError> {
            self.write()?;
            self.invoices.lock().unwrap().retain(|invoice| invoice.id != id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingCache(Mutex<Vec<String>>);

    impl RecordingCache {
        fn paths(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Revalidate for RecordingCache {
        fn invalidate(&self, path: &str) {
            self.0.lock().unwrap().push(path.to_string());
        }
    }

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().copied().collect()
    }

    fn existing_invoice() -> Invoice {
        Invoice {
            id: "inv1".to_string(),
            customer_id: "c1".to_string(),
            amount: MoneyCents::new(500),
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_stores_cents_and_today_then_redirects() {
        let store = MemoryStore::default();
        let cache = RecordingCache::default();

        let outcome = create_invoice(
            &store,
            &cache,
            &form(&[
                ("customerId", "c1"),
                ("amount", "250.5"),
                ("status", "pending"),
                ("date", "1999-01-01"),
            ]),
        )
        .await;

        assert_eq!(outcome, ActionOutcome::Redirect(INVOICES_PATH));
        assert_eq!(cache.paths(), vec![INVOICES_PATH.to_string()]);
        let stored = store.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount.cents(), 25050);
        assert_eq!(stored[0].status, InvoiceStatus::Pending);
        assert_eq!(stored[0].date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_the_store() {
        let store = MemoryStore::default();
        let cache = RecordingCache::default();

        let outcome = create_invoice(
            &store,
            &cache,
            &form(&[("customerId", "c1"), ("amount", "abc"), ("status", "pending")]),
        )
        .await;

        let state = match outcome {
            ActionOutcome::Failed(ActionFailure::Invalid(state)) => state,
            other => panic!("expected a validation failure, got {other:?}"),
        };
        assert_eq!(state.message, "Missing Fields. Failed to Create Invoice.");
        assert!(state.errors.unwrap().contains_key("amount"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(cache.paths().is_empty());
    }

    #[tokio::test]
    async fn unknown_status_never_reaches_the_store() {
        let store = MemoryStore::with_invoice(existing_invoice());
        let cache = RecordingCache::default();

        for status in ["Paid", "overdue", ""] {
            let outcome = update_invoice(
                &store,
                &cache,
                "inv1",
                &form(&[("customerId", "c1"), ("amount", "1"), ("status", status)]),
            )
            .await;
            assert!(matches!(
                outcome,
                ActionOutcome::Failed(ActionFailure::Invalid(_))
            ));
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_database_failure_skips_revalidation_and_redirect() {
        let store = MemoryStore::broken();
        let cache = RecordingCache::default();

        let outcome = create_invoice(
            &store,
            &cache,
            &form(&[("customerId", "c1"), ("amount", "1"), ("status", "paid")]),
        )
        .await;

        assert_eq!(
            outcome,
            ActionOutcome::Failed(ActionFailure::Database(ActionState::message(
                "Database Error: Failed to Create Invoice."
            )))
        );
        assert!(cache.paths().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_id_and_date() {
        let store = MemoryStore::with_invoice(existing_invoice());
        let cache = RecordingCache::default();

        let outcome = update_invoice(
            &store,
            &cache,
            "inv1",
            &form(&[("customerId", "c2"), ("amount", "10"), ("status", "paid")]),
        )
        .await;

        assert_eq!(outcome, ActionOutcome::Redirect(INVOICES_PATH));
        assert_eq!(cache.paths(), vec![INVOICES_PATH.to_string()]);
        let stored = store.snapshot();
        assert_eq!(stored[0].id, "inv1");
        assert_eq!(stored[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(stored[0].customer_id, "c2");
        assert_eq!(stored[0].amount.cents(), 1000);
        assert_eq!(stored[0].status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn update_of_missing_invoice_is_not_found() {
        let store = MemoryStore::default();
        let cache = RecordingCache::default();

        let outcome = update_invoice(
            &store,
            &cache,
            "missing",
            &form(&[("customerId", "c2"), ("amount", "10"), ("status", "paid")]),
        )
        .await;

        assert_eq!(
            outcome,
            ActionOutcome::Failed(ActionFailure::NotFound(ActionState::message(
                "Invoice Not Found: Failed to Update Invoice."
            )))
        );
        assert!(cache.paths().is_empty());
    }

    #[tokio::test]
    async fn update_database_failure_returns_message() {
        let store = MemoryStore::broken();
        let cache = RecordingCache::default();

        let outcome = update_invoice(
            &store,
            &cache,
            "inv1",
            &form(&[("customerId", "c2"), ("amount", "10"), ("status", "paid")]),
        )
        .await;

        let failure = match outcome {
            ActionOutcome::Failed(failure) => failure,
            other => panic!("expected a failure, got {other:?}"),
        };
        assert_eq!(
            failure.state().message,
            "Database Error: Failed to Update Invoice."
        );
        assert!(cache.paths().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_reports_deleted_both_times() {
        let store = MemoryStore::with_invoice(existing_invoice());
        let cache = RecordingCache::default();

        for _ in 0..2 {
            let outcome = delete_invoice(&store, &cache, "inv1").await;
            assert_eq!(
                outcome,
                ActionOutcome::Completed(ActionState::message("Deleted Invoice."))
            );
        }
        assert!(store.snapshot().is_empty());
        assert_eq!(cache.paths().len(), 2);
    }

    #[tokio::test]
    async fn delete_database_failure_returns_message() {
        let store = MemoryStore::broken();
        let cache = RecordingCache::default();

        let outcome = delete_invoice(&store, &cache, "inv1").await;

        assert_eq!(
            outcome,
            ActionOutcome::Failed(ActionFailure::Database(ActionState::message(
                "Database Error: Failed to Delete Invoice."
            )))
        );
        assert!(cache.paths().is_empty());
    }

    #[test]
    fn outcomes_map_to_http_statuses() {
        let redirect = ActionOutcome::Redirect(INVOICES_PATH).into_response();
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect.headers()["location"], INVOICES_PATH);

        let invalid = ActionOutcome::Failed(ActionFailure::Invalid(ActionState::default()));
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let not_found = ActionOutcome::Failed(ActionFailure::NotFound(ActionState::default()));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);
    }
}
