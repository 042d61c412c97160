use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::dates;

/// Financial product as served by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialProduct {
    /// Stable identity, assigned by the user on creation
    pub id: String,
    pub name: String,
    pub description: String,
    /// Logo URL
    pub logo: String,
    #[serde(with = "dates::wire")]
    pub date_release: NaiveDate,
    #[serde(with = "dates::wire")]
    pub date_revision: NaiveDate,
}

/// Editable fields of a product (everything but the id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub logo: String,
    #[serde(with = "dates::wire")]
    pub date_release: NaiveDate,
    #[serde(with = "dates::wire")]
    pub date_revision: NaiveDate,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFinancialProduct {
    pub id: String,
    #[serde(flatten)]
    pub fields: ProductFields,
}

/// Envelope returned by the list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsEnvelope {
    #[serde(default)]
    pub data: Vec<FinancialProduct>,
}

impl FinancialProduct {
    pub fn from_parts(id: impl Into<String>, fields: ProductFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            description: fields.description,
            logo: fields.logo,
            date_release: fields.date_release,
            date_revision: fields.date_revision,
        }
    }

    /// Editable fields of this product
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            description: self.description.clone(),
            logo: self.logo.clone(),
            date_release: self.date_release,
            date_revision: self.date_revision,
        }
    }
}

impl From<NewFinancialProduct> for FinancialProduct {
    fn from(input: NewFinancialProduct) -> Self {
        FinancialProduct::from_parts(input.id, input.fields)
    }
}

/// Current search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Term exactly as typed; trimming and case folding happen at match time
    pub search_term: String,
}

impl SearchCriteria {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
        }
    }

    /// The term as used for matching: trimmed and lower-cased
    pub fn normalized_term(&self) -> String {
        self.search_term.trim().to_lowercase()
    }

    pub fn is_active(&self) -> bool {
        !self.search_term.trim().is_empty()
    }
}

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;

/// Page size choices offered to the user
pub const ITEMS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 20];

/// Pagination window: current page, page size and total matching count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaginationWindow {
    /// 1-based
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
}

impl Default for PaginationWindow {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            total_items: 0,
        }
    }
}

/// Partial pagination update; unset fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationPatch {
    pub current_page: Option<usize>,
    pub items_per_page: Option<usize>,
    pub total_items: Option<usize>,
}

impl PaginationPatch {
    pub fn page(current_page: usize) -> Self {
        Self {
            current_page: Some(current_page),
            ..Default::default()
        }
    }

    pub fn with_total_items(mut self, total_items: usize) -> Self {
        self.total_items = Some(total_items);
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = Some(items_per_page);
        self
    }

    /// Merge this patch over `window`
    pub fn apply_to(&self, window: &PaginationWindow) -> PaginationWindow {
        PaginationWindow {
            current_page: self.current_page.unwrap_or(window.current_page),
            items_per_page: self.items_per_page.unwrap_or(window.items_per_page),
            total_items: self.total_items.unwrap_or(window.total_items),
        }
    }
}

/// Filtering statistics for the result header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub original_count: usize,
    pub filtered_count: usize,
    pub is_filtered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// What a form submission does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationMode {
    Create,
    Update(String),
}

impl std::fmt::Display for MutationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationMode::Create => write!(f, "create"),
            MutationMode::Update(id) => write!(f, "update {}", id),
        }
    }
}

impl MutationMode {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationMode::Create => MutationKind::Create,
            MutationMode::Update(_) => MutationKind::Update,
        }
    }
}

/// Token of the mutation currently in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub kind: MutationKind,
    pub target_id: Option<String>,
}

impl PendingMutation {
    pub fn create() -> Self {
        Self {
            kind: MutationKind::Create,
            target_id: None,
        }
    }

    pub fn update(id: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Update,
            target_id: Some(id.into()),
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Delete,
            target_id: Some(id.into()),
        }
    }
}

impl From<&MutationMode> for PendingMutation {
    fn from(mode: &MutationMode) -> Self {
        match mode {
            MutationMode::Create => PendingMutation::create(),
            MutationMode::Update(id) => PendingMutation::update(id.clone()),
        }
    }
}
