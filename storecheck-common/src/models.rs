//! Checklist and inspection data models

use serde::{Deserialize, Serialize};

use crate::icons::Icon;
use crate::{Error, Result};

/// Answer state for a single checklist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Yes,
    No,
    Na,
}

/// A named grouping of checklist items, ordered for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Slug derived from the title, unique across categories
    pub id: String,
    pub title: String,
    pub icon: Icon,
    pub sort_order: i64,
    pub items: Vec<ChecklistItem>,
}

/// A single yes/no/NA checklist question within a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub category_id: String,
    pub description: String,
    pub sort_order: i64,
}

/// Create/update payloads for taxonomy administration
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub title: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemCreate {
    pub description: String,
}

/// Store identification entered before an inspection can begin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub store_number: String,
    pub inspected_by: String,
}

impl StoreInfo {
    /// Both fields populated (whitespace does not count)
    pub fn is_complete(&self) -> bool {
        !self.store_number.trim().is_empty() && !self.inspected_by.trim().is_empty()
    }

    /// Validate for submission: store number must be a 7-digit numeric string
    pub fn validate(&self) -> Result<()> {
        let number = self.store_number.trim();
        if number.is_empty() {
            return Err(Error::Validation("store_number is required".to_string()));
        }
        if number.len() != 7 || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Validation(format!(
                "store_number must be a 7-digit number, got '{}'",
                number
            )));
        }
        if self.inspected_by.trim().is_empty() {
            return Err(Error::Validation("inspected_by is required".to_string()));
        }
        Ok(())
    }
}

/// Working copy of a category during an in-progress inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCategory {
    pub id: String,
    pub title: String,
    pub icon: Icon,
    pub items: Vec<WorkingItem>,
}

/// Working copy of an item with its ephemeral answer state
///
/// `status == None` means unanswered. `fixed` and `notes` are only
/// meaningful when the status is `No`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingItem {
    pub id: String,
    pub description: String,
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub notes: String,
}

impl WorkingItem {
    pub fn blank(id: String, description: String) -> Self {
        Self {
            id,
            description,
            status: None,
            fixed: false,
            notes: String::new(),
        }
    }
}

/// Partial update overlay for one working item; absent fields are untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemUpdate {
    pub status: Option<ItemStatus>,
    pub fixed: Option<bool>,
    pub notes: Option<String>,
}

/// Aggregate completion counters for the working checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionStatus {
    pub total_items: usize,
    pub completed_items: usize,
    pub percent_complete: u32,
}

/// An item answered "no" in the working state, annotated with its category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkingIssue {
    pub category_id: String,
    pub category_title: String,
    pub item_id: String,
    pub description: String,
    pub notes: String,
    pub fixed: bool,
}

/// Immutable snapshot of one category inside a submitted inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionCategory {
    pub id: String,
    pub title: String,
    pub items: Vec<InspectionItem>,
}

/// Immutable snapshot of one answered item inside a submitted inspection
///
/// Stores a copy of the description, not a live taxonomy reference, so
/// later taxonomy edits do not alter historical inspections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionItem {
    pub id: String,
    pub description: String,
    pub status: ItemStatus,
    pub fixed: bool,
    pub notes: String,
}

/// Normalized payload produced by `prepare_submission`, ready for one
/// durable write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub store_number: String,
    pub inspected_by: String,
    /// RFC 3339 timestamp taken on the client at preparation time
    pub client_date: String,
    pub categories: Vec<InspectionCategory>,
}

/// A submitted inspection as stored by the data provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: String,
    pub store_number: String,
    pub inspected_by: String,
    pub client_date: String,
    pub inspection_date: String,
    pub submitted_at: String,
    pub last_updated: String,
    /// Optimistic-concurrency token, incremented on every rewrite
    pub version: i64,
    pub categories: Vec<InspectionCategory>,
}

/// An item answered "no" within a submitted inspection, flattened for the
/// admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub inspection_id: String,
    pub store_number: String,
    pub submitted_at: String,
    pub category_id: String,
    pub category_title: String,
    pub item_id: String,
    pub description: String,
    pub notes: String,
    pub fixed: bool,
}

/// Derive a URL-safe slug from a category title
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims leading/trailing hyphens. "Food Prep" becomes "food-prep".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
