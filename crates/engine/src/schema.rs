//! Invoice form schema.
//!
//! Raw form input is a string map ([`FormData`]). Every invoice field has a
//! single rule, defined once in [`ParsedFields::read`]. Views over the invoice
//! shape pick the subset of fields they need through a [`FieldSet`]:
//!
//! - [`InvoiceFields`]: the full record shape.
//! - [`CreateInvoice`] and [`UpdateInvoice`]: the record without `id` and
//!   `date`, which are never taken from the client.
//!
//! Validation reports every failing field at once through [`FieldErrors`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{InvoiceChanges, InvoiceStatus, MoneyCents, NewInvoice};

/// Raw key/value pairs of a submitted form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvoiceField {
    Id,
    CustomerId,
    Amount,
    Status,
    Date,
}

impl InvoiceField {
    pub const ALL: [InvoiceField; 5] = [
        Self::Id,
        Self::CustomerId,
        Self::Amount,
        Self::Status,
        Self::Date,
    ];

    /// Key of the field in form input and error maps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CustomerId => "customerId",
            Self::Amount => "amount",
            Self::Status => "status",
            Self::Date => "date",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A subset of [`InvoiceField`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const ALL: FieldSet = FieldSet(0b1_1111);

    /// Returns the set without `fields`.
    #[must_use]
    pub const fn omit(self, fields: &[InvoiceField]) -> Self {
        let mut bits = self.0;
        let mut idx = 0;
        while idx < fields.len() {
            bits &= !fields[idx].bit();
            idx += 1;
        }
        FieldSet(bits)
    }

    pub const fn contains(self, field: InvoiceField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = InvoiceField> {
        InvoiceField::ALL
            .into_iter()
            .filter(move |field| self.contains(*field))
    }
}

/// Fields a client may submit when creating or updating an invoice.
pub const MUTATION_FIELDS: FieldSet =
    FieldSet::ALL.omit(&[InvoiceField::Id, InvoiceField::Date]);

/// Validation messages keyed by field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<InvoiceField, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: InvoiceField, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: InvoiceField) -> Option<&[String]> {
        self.0.get(&field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = InvoiceField> + '_ {
        self.0.keys().copied()
    }

    /// Errors keyed by the form field name.
    pub fn into_named(self) -> BTreeMap<String, Vec<String>> {
        self.0
            .into_iter()
            .map(|(field, messages)| (field.name().to_string(), messages))
            .collect()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {message}", field.name())?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Values produced by the field rules. A field is `Some` once its rule passed.
#[derive(Debug, Default)]
pub struct ParsedFields {
    id: Option<String>,
    customer_id: Option<String>,
    amount: Option<MoneyCents>,
    status: Option<InvoiceStatus>,
    date: Option<NaiveDate>,
}

impl ParsedFields {
    fn read(&mut self, field: InvoiceField, raw: Option<&str>) -> Result<(), &'static str> {
        match field {
            InvoiceField::Id => {
                self.id = Some(required_text(raw).ok_or("Invoice id is required.")?);
            }
            InvoiceField::CustomerId => {
                self.customer_id =
                    Some(required_text(raw).ok_or("Please select a customer.")?);
            }
            InvoiceField::Amount => {
                let amount = raw
                    .and_then(|value| MoneyCents::from_display_amount(value).ok())
                    .ok_or("Please enter a valid, non-negative amount.")?;
                self.amount = Some(amount);
            }
            InvoiceField::Status => {
                let status = raw
                    .and_then(|value| InvoiceStatus::try_from(value).ok())
                    .ok_or("Please select an invoice status.")?;
                self.status = Some(status);
            }
            InvoiceField::Date => {
                let date = raw
                    .and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
                    .ok_or("Please enter a valid date.")?;
                self.date = Some(date);
            }
        }
        Ok(())
    }
}

fn required_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// A typed view over a subset of the invoice fields.
pub trait InvoiceView: Sized {
    const FIELDS: FieldSet;

    /// Builds the view once every field in [`Self::FIELDS`] has been parsed.
    fn from_fields(fields: ParsedFields) -> Option<Self>;
}

/// Validate `form` against the fields of `V`.
///
/// Keys outside `V::FIELDS` are ignored, even when present.
pub fn parse_form<V: InvoiceView>(form: &FormData) -> Result<V, FieldErrors> {
    let mut parsed = ParsedFields::default();
    let mut errors = FieldErrors::default();

    for field in V::FIELDS.iter() {
        if let Err(message) = parsed.read(field, form.get(field.name())) {
            errors.push(field, message);
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    V::from_fields(parsed).ok_or_else(|| {
        let mut errors = FieldErrors::default();
        for field in V::FIELDS.iter() {
            errors.push(field, "Required.");
        }
        errors
    })
}

/// The complete invoice shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceFields {
    pub id: String,
    pub customer_id: String,
    pub amount: MoneyCents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl InvoiceView for InvoiceFields {
    const FIELDS: FieldSet = FieldSet::ALL;

    fn from_fields(fields: ParsedFields) -> Option<Self> {
        Some(Self {
            id: fields.id?,
            customer_id: fields.customer_id?,
            amount: fields.amount?,
            status: fields.status?,
            date: fields.date?,
        })
    }
}

/// Form input accepted when creating an invoice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateInvoice {
    pub customer_id: String,
    pub amount: MoneyCents,
    pub status: InvoiceStatus,
}

impl CreateInvoice {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        parse_form(form)
    }

    /// Stamps the creation date.
    pub fn into_new_invoice(self, today: NaiveDate) -> NewInvoice {
        NewInvoice {
            customer_id: self.customer_id,
            amount: self.amount,
            status: self.status,
            date: today,
        }
    }
}

impl InvoiceView for CreateInvoice {
    const FIELDS: FieldSet = MUTATION_FIELDS;

    fn from_fields(fields: ParsedFields) -> Option<Self> {
        Some(Self {
            customer_id: fields.customer_id?,
            amount: fields.amount?,
            status: fields.status?,
        })
    }
}

/// Form input accepted when updating an invoice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateInvoice {
    pub customer_id: String,
    pub amount: MoneyCents,
    pub status: InvoiceStatus,
}

impl UpdateInvoice {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        parse_form(form)
    }

    pub fn into_changes(self) -> InvoiceChanges {
        InvoiceChanges {
            customer_id: self.customer_id,
            amount: self.amount,
            status: self.status,
        }
    }
}

impl InvoiceView for UpdateInvoice {
    const FIELDS: FieldSet = MUTATION_FIELDS;

    fn from_fields(fields: ParsedFields) -> Option<Self> {
        Some(Self {
            customer_id: fields.customer_id?,
            amount: fields.amount?,
            status: fields.status?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().copied().collect()
    }

    #[test]
    fn mutation_fields_exclude_id_and_date() {
        let fields: Vec<_> = MUTATION_FIELDS.iter().collect();
        assert_eq!(
            fields,
            vec![
                InvoiceField::CustomerId,
                InvoiceField::Amount,
                InvoiceField::Status
            ]
        );
        assert!(FieldSet::ALL.contains(InvoiceField::Date));
    }

    #[test]
    fn create_parses_and_scales_amount() {
        let parsed = CreateInvoice::parse(&form(&[
            ("customerId", "c1"),
            ("amount", "250.5"),
            ("status", "pending"),
        ]))
        .unwrap();

        assert_eq!(parsed.customer_id, "c1");
        assert_eq!(parsed.amount.cents(), 25050);
        assert_eq!(parsed.status, InvoiceStatus::Pending);
    }

    #[test]
    fn non_numeric_amount_is_a_field_error() {
        let errors = CreateInvoice::parse(&form(&[
            ("customerId", "c1"),
            ("amount", "abc"),
            ("status", "pending"),
        ]))
        .unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![InvoiceField::Amount]);
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = UpdateInvoice::parse(&form(&[("status", "overdue")])).unwrap_err();

        assert_eq!(
            errors.get(InvoiceField::CustomerId),
            Some(&["Please select a customer.".to_string()][..])
        );
        assert!(errors.get(InvoiceField::Amount).is_some());
        assert_eq!(
            errors.get(InvoiceField::Status),
            Some(&["Please select an invoice status.".to_string()][..])
        );
        assert!(errors.get(InvoiceField::Date).is_none());
    }

    #[test]
    fn blank_customer_is_rejected() {
        let errors = CreateInvoice::parse(&form(&[
            ("customerId", "   "),
            ("amount", "1"),
            ("status", "paid"),
        ]))
        .unwrap_err();
        assert!(errors.get(InvoiceField::CustomerId).is_some());
    }

    #[test]
    fn client_date_and_id_are_ignored_on_create() {
        let parsed = CreateInvoice::parse(&form(&[
            ("id", "forged"),
            ("customerId", "c1"),
            ("amount", "10"),
            ("status", "paid"),
            ("date", "1999-12-31"),
        ]))
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let new_invoice = parsed.into_new_invoice(today);
        assert_eq!(new_invoice.date, today);
        assert_eq!(new_invoice.amount.cents(), 1000);
    }

    #[test]
    fn full_shape_requires_id_and_date() {
        let errors = parse_form::<InvoiceFields>(&form(&[
            ("customerId", "c1"),
            ("amount", "10"),
            ("status", "paid"),
            ("date", "2024-13-01"),
        ]))
        .unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![InvoiceField::Id, InvoiceField::Date]
        );

        let full = parse_form::<InvoiceFields>(&form(&[
            ("id", "inv1"),
            ("customerId", "c1"),
            ("amount", "10"),
            ("status", "paid"),
            ("date", "2024-01-01"),
        ]))
        .unwrap();
        assert_eq!(full.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn named_errors_use_form_keys() {
        let mut errors = FieldErrors::default();
        errors.push(InvoiceField::CustomerId, "Please select a customer.");
        let named = errors.into_named();
        assert!(named.contains_key("customerId"));
    }
}
