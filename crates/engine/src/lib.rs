//! Invoice domain: money, the invoice form schema and persistence.

pub use customers::Customer;
pub use error::EngineError;
pub use invoices::{Invoice, InvoiceChanges, InvoiceStatus, NewInvoice};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use schema::{
    CreateInvoice, FieldErrors, FieldSet, FormData, InvoiceField, InvoiceFields, InvoiceView,
    MUTATION_FIELDS, UpdateInvoice, parse_form,
};
pub use store::InvoiceStore;
pub use users::{User, password_digest};

mod customers;
mod error;
mod invoices;
mod money;
mod ops;
mod schema;
mod store;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
