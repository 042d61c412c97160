//! Create/edit form state: raw values, touched tracking and field validation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use validator::{Validate, ValidationError};

use crate::dates;
use crate::models::{FinancialProduct, NewFinancialProduct, ProductFields};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ProductField {
    Id,
    Name,
    Description,
    Logo,
    DateRelease,
    DateRevision,
}

/// Why a single field is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    MinLength(u64),
    MaxLength(u64),
    InvalidDate,
}

impl FieldError {
    /// User-facing message for `field`
    pub fn message(&self, field: ProductField) -> String {
        match self {
            FieldError::Required => format!("{} es requerido", field),
            FieldError::MinLength(n) => {
                format!("{} debe tener al menos {} caracteres", field, n)
            }
            FieldError::MaxLength(n) => format!("{} debe tener máximo {} caracteres", field, n),
            FieldError::InvalidDate => format!("{} debe ser una fecha válida", field),
        }
    }
}

/// Every invalid field of a form, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<ProductField, FieldError>);

impl FormErrors {
    pub fn get(&self, field: ProductField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductField, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    /// Messages for every invalid field
    pub fn messages(&self) -> Vec<String> {
        self.iter().map(|(field, error)| error.message(field)).collect()
    }

    fn insert(&mut self, field: ProductField, error: FieldError) {
        self.0.entry(field).or_insert(error);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

/// Raw values as typed by the user, with the declared field rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProductFormValues {
    #[validate(length(min = 3, max = 10))]
    pub id: String,
    #[validate(length(min = 5, max = 100))]
    pub name: String,
    #[validate(length(min = 10, max = 200))]
    pub description: String,
    #[validate(length(min = 1))]
    pub logo: String,
    #[validate(length(min = 1))]
    pub date_release: String,
    #[validate(length(min = 1))]
    pub date_revision: String,
}

impl ProductFormValues {
    pub fn get(&self, field: ProductField) -> &str {
        match field {
            ProductField::Id => &self.id,
            ProductField::Name => &self.name,
            ProductField::Description => &self.description,
            ProductField::Logo => &self.logo,
            ProductField::DateRelease => &self.date_release,
            ProductField::DateRevision => &self.date_revision,
        }
    }

    fn slot(&mut self, field: ProductField) -> &mut String {
        match field {
            ProductField::Id => &mut self.id,
            ProductField::Name => &mut self.name,
            ProductField::Description => &mut self.description,
            ProductField::Logo => &mut self.logo,
            ProductField::DateRelease => &mut self.date_release,
            ProductField::DateRevision => &mut self.date_revision,
        }
    }

    /// Run the rule set and map the results to per-field errors
    pub fn errors(&self) -> FormErrors {
        self.check().errors
    }

    /// Rule errors together with the parsed dates.
    ///
    /// A date that is `None` here is always reported in `errors`, as
    /// `Required` when empty or `InvalidDate` otherwise.
    fn check(&self) -> FormCheck {
        let mut errors = self.rule_errors();
        let date_release = self.parse_date_field(ProductField::DateRelease, &mut errors);
        let date_revision = self.parse_date_field(ProductField::DateRevision, &mut errors);

        FormCheck {
            errors,
            date_release,
            date_revision,
        }
    }

    fn parse_date_field(&self, field: ProductField, errors: &mut FormErrors) -> Option<NaiveDate> {
        let value = self.get(field);
        let date = dates::parse_date(value);
        if date.is_none() && !value.is_empty() {
            errors.insert(field, FieldError::InvalidDate);
        }
        date
    }

    fn rule_errors(&self) -> FormErrors {
        let mut errors = FormErrors::default();

        if let Err(report) = self.validate() {
            for (name, field_errors) in report.field_errors() {
                let Ok(field) = ProductField::from_str(name.as_ref()) else {
                    continue;
                };
                if let Some(error) = field_errors
                    .iter()
                    .find_map(|e| classify(self.get(field), e))
                {
                    errors.insert(field, error);
                }
            }
        }

        errors
    }
}

struct FormCheck {
    errors: FormErrors,
    date_release: Option<NaiveDate>,
    date_revision: Option<NaiveDate>,
}

/// Turn a `length` rule failure into required / too short / too long.
///
/// Empty values always report `Required`, like a required-field check that
/// runs before the length checks.
fn classify(value: &str, error: &ValidationError) -> Option<FieldError> {
    if error.code != "length" {
        return None;
    }
    if value.is_empty() {
        return Some(FieldError::Required);
    }

    let len = value.chars().count() as u64;
    let bound = |key: &str| error.params.get(key).and_then(|v| v.as_u64());

    match (bound("min"), bound("max")) {
        (Some(min), _) if len < min => Some(FieldError::MinLength(min)),
        (_, Some(max)) if len > max => Some(FieldError::MaxLength(max)),
        _ => None,
    }
}

/// A form that passed validation, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProduct {
    pub id: String,
    pub fields: ProductFields,
}

impl From<ValidatedProduct> for NewFinancialProduct {
    fn from(product: ValidatedProduct) -> Self {
        NewFinancialProduct {
            id: product.id,
            fields: product.fields,
        }
    }
}

/// Form state for creating or editing a product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    values: ProductFormValues,
    touched: BTreeSet<ProductField>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit form pre-filled from an existing product
    pub fn from_product(product: &FinancialProduct) -> Self {
        Self {
            values: ProductFormValues {
                id: product.id.clone(),
                name: product.name.clone(),
                description: product.description.clone(),
                logo: product.logo.clone(),
                date_release: dates::to_input(product.date_release),
                date_revision: dates::to_input(product.date_revision),
            },
            touched: BTreeSet::new(),
        }
    }

    pub fn values(&self) -> &ProductFormValues {
        &self.values
    }

    pub fn value(&self, field: ProductField) -> &str {
        self.values.get(field)
    }

    pub fn set_value(&mut self, field: ProductField, value: impl Into<String>) {
        *self.values.slot(field) = value.into();
    }

    /// Record that the user interacted with `field`
    pub fn touch(&mut self, field: ProductField) {
        self.touched.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(ProductField::iter());
    }

    pub fn is_touched(&self, field: ProductField) -> bool {
        self.touched.contains(&field)
    }

    /// Store a new release date and propose a revision date one year later.
    ///
    /// The proposal overwrites the current revision date; the user may change
    /// it again before submitting.
    pub fn on_release_date_change(&mut self, value: impl Into<String>) {
        self.set_value(ProductField::DateRelease, value);

        let revision = dates::parse_date(&self.values.date_release)
            .and_then(dates::default_revision_date);
        if let Some(revision) = revision {
            self.values.date_revision = dates::to_input(revision);
        }
    }

    pub fn errors(&self) -> FormErrors {
        self.values.errors()
    }

    /// Message for `field`, only once the field has been touched
    pub fn field_error(&self, field: ProductField) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        self.errors().get(field).map(|error| error.message(field))
    }

    pub fn is_field_invalid(&self, field: ProductField) -> bool {
        self.is_touched(field) && self.errors().get(field).is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Check every rule and build the typed product
    pub fn validate(&self) -> Result<ValidatedProduct, FormErrors> {
        let check = self.values.check();

        match (check.date_release, check.date_revision) {
            (Some(date_release), Some(date_revision)) if check.errors.is_empty() => {
                Ok(ValidatedProduct {
                    id: self.values.id.clone(),
                    fields: ProductFields {
                        name: self.values.name.clone(),
                        description: self.values.description.clone(),
                        logo: self.values.logo.clone(),
                        date_release,
                        date_revision,
                    },
                })
            }
            // Missing dates are already in `errors`
            _ => Err(check.errors),
        }
    }

    /// Clear every value and the touched state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
