//! In-progress inspection session state machine
//!
//! Owns the working copy of the store info and the categorized checklist;
//! every presentation component reads and mutates through this type, and
//! every successful mutation synchronously re-persists the complete state
//! to the local `StateStore` (full overwrite - persistence cost grows with
//! checklist size, which stays in the tens of items).
//!
//! Phases: `Uninitialized -> Loading -> Ready -> Submitting ->
//! (Submitted | back to Ready with the error recorded)`.

use serde::Serialize;
use tracing::{info, warn};

use crate::db::ChecklistProvider;
use crate::models::{
    Category, CompletionStatus, InspectionCategory, InspectionItem, ItemUpdate, StoreInfo,
    SubmissionPayload, WorkingCategory, WorkingIssue, WorkingItem,
};
use crate::store::{self, StateStore, INSPECTION_DATA_KEY, STORE_INFO_KEY};
use crate::{Error, Result};


/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Ready,
    Submitting,
    Submitted,
}

/// The working inspection: single source of truth for the checklist UI
pub struct InspectionSession {
    store: Box<dyn StateStore>,
    phase: SessionPhase,
    store_info: StoreInfo,
    categories: Vec<WorkingCategory>,
    last_error: Option<String>,
}

impl InspectionSession {
    pub fn new(store: Box<dyn StateStore>) -> Self {
        Self {
            store,
            phase: SessionPhase::Uninitialized,
            store_info: StoreInfo::default(),
            categories: Vec::new(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn store_info(&self) -> &StoreInfo {
        &self.store_info
    }

    pub fn categories(&self) -> &[WorkingCategory] {
        &self.categories
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Restore persisted working state, or fetch a fresh taxonomy
    ///
    /// A persisted blob is adopted only when its schema version matches the
    /// current build; anything else is discarded and the cold path runs. A
    /// provider failure is surfaced to the caller and not retried here.
    pub async fn initialize(&mut self, provider: &dyn ChecklistProvider) -> Result<()> {
        self.phase = SessionPhase::Loading;

        if let Some(info) = store::load_json::<StoreInfo>(self.store.as_ref(), STORE_INFO_KEY) {
            self.store_info = info;
        }

        if let Some(categories) =
            store::load_json::<Vec<WorkingCategory>>(self.store.as_ref(), INSPECTION_DATA_KEY)
        {
            info!("Restored in-progress inspection from local state");
            self.categories = categories;
            self.phase = SessionPhase::Ready;
            return Ok(());
        }

        self.cold_load(provider).await
    }

    /// Discard all progress and start over from a fresh taxonomy fetch
    ///
    /// Destructive and unconditional; confirmation is the caller's job.
    pub async fn reset(&mut self, provider: &dyn ChecklistProvider) -> Result<()> {
        self.store.remove(STORE_INFO_KEY)?;
        self.store.remove(INSPECTION_DATA_KEY)?;
        self.store_info = StoreInfo::default();
        self.categories = Vec::new();
        self.cold_load(provider).await
    }

    async fn cold_load(&mut self, provider: &dyn ChecklistProvider) -> Result<()> {
        match provider.fetch_taxonomy().await {
            Ok(taxonomy) => {
                self.categories = project_taxonomy(taxonomy);
                self.persist()?;
                self.phase = SessionPhase::Ready;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Checklist fetch failed: {}", e);
                self.phase = SessionPhase::Uninitialized;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the store info and re-persist
    pub fn set_store_info(&mut self, info: StoreInfo) -> Result<()> {
        self.store_info = info;
        self.persist()
    }

    /// Overlay a partial update onto one item
    ///
    /// Returns false (leaving all state untouched) when the
    /// (category, item) pair does not exist.
    pub fn update_item(
        &mut self,
        category_id: &str,
        item_id: &str,
        update: ItemUpdate,
    ) -> Result<bool> {
        let Some(item) = self
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .and_then(|c| c.items.iter_mut().find(|i| i.id == item_id))
        else {
            return Ok(false);
        };

        if let Some(status) = update.status {
            item.status = Some(status);
        }
        if let Some(fixed) = update.fixed {
            item.fixed = fixed;
        }
        if let Some(notes) = update.notes {
            item.notes = notes;
        }

        self.persist()?;
        Ok(true)
    }

    /// Aggregate completion across all categories
    pub fn completion_status(&self) -> CompletionStatus {
        let total_items: usize = self.categories.iter().map(|c| c.items.len()).sum();
        let completed_items: usize = self
            .categories
            .iter()
            .flat_map(|c| c.items.iter())
            .filter(|i| i.status.is_some())
            .count();
        let percent_complete = if total_items == 0 {
            0
        } else {
            (100.0 * completed_items as f64 / total_items as f64).round() as u32
        };

        CompletionStatus {
            total_items,
            completed_items,
            percent_complete,
        }
    }

    /// True iff the category exists and every item has a status
    pub fn is_category_complete(&self, category_id: &str) -> bool {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.items.iter().all(|i| i.status.is_some()))
            .unwrap_or(false)
    }

    /// All items currently answered "no", annotated with their category
    pub fn all_issues(&self) -> Vec<WorkingIssue> {
        self.categories
            .iter()
            .flat_map(|c| {
                c.items
                    .iter()
                    .filter(|i| i.status == Some(crate::models::ItemStatus::No))
                    .map(|i| WorkingIssue {
                        category_id: c.id.clone(),
                        category_title: c.title.clone(),
                        item_id: i.id.clone(),
                        description: i.description.clone(),
                        notes: i.notes.clone(),
                        fixed: i.fixed,
                    })
            })
            .collect()
    }

    /// Validate and shape the working state into a submission payload
    ///
    /// Pure with respect to storage: nothing is written here. The payload
    /// carries trimmed strings and a fresh `client_date` stamp.
    pub fn prepare_submission(&self) -> Result<SubmissionPayload> {
        self.store_info.validate()?;

        let mut categories = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            if category.id.is_empty() || category.title.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "category '{}' is missing its id or title",
                    if category.id.is_empty() {
                        &category.title
                    } else {
                        &category.id
                    }
                )));
            }

            let mut items = Vec::with_capacity(category.items.len());
            for item in &category.items {
                if item.id.is_empty() || item.description.trim().is_empty() {
                    return Err(Error::Validation(format!(
                        "item '{}' in category '{}' is missing its id or description",
                        item.id, category.title
                    )));
                }
                let Some(status) = item.status else {
                    return Err(Error::Validation(format!(
                        "item '{}' in category '{}' is unanswered",
                        item.description, category.title
                    )));
                };
                items.push(InspectionItem {
                    id: item.id.clone(),
                    description: item.description.trim().to_string(),
                    status,
                    fixed: item.fixed,
                    notes: item.notes.trim().to_string(),
                });
            }

            categories.push(InspectionCategory {
                id: category.id.clone(),
                title: category.title.trim().to_string(),
                items,
            });
        }

        Ok(SubmissionPayload {
            store_number: self.store_info.store_number.trim().to_string(),
            inspected_by: self.store_info.inspected_by.trim().to_string(),
            client_date: chrono::Utc::now().to_rfc3339(),
            categories,
        })
    }

    /// Submission pipeline entry/exit transitions, driven by the caller
    pub fn mark_submitting(&mut self) {
        self.phase = SessionPhase::Submitting;
    }

    pub fn mark_submitted(&mut self) {
        self.phase = SessionPhase::Submitted;
        self.last_error = None;
    }

    /// Submission failed: back to Ready with the error recorded, working
    /// state intact so the user can retry manually
    pub fn mark_submit_failed(&mut self, error: &Error) {
        self.phase = SessionPhase::Ready;
        self.last_error = Some(error.to_string());
    }

    /// Serialize the complete current state back to local storage
    fn persist(&self) -> Result<()> {
        store::save_json(self.store.as_ref(), STORE_INFO_KEY, &self.store_info)?;
        store::save_json(self.store.as_ref(), INSPECTION_DATA_KEY, &self.categories)?;
        Ok(())
    }
}

/// Project the taxonomy into blank working state
fn project_taxonomy(taxonomy: Vec<Category>) -> Vec<WorkingCategory> {
    taxonomy
        .into_iter()
        .map(|category| WorkingCategory {
            id: category.id,
            title: category.title,
            icon: category.icon,
            items: category
                .items
                .into_iter()
                .map(|item| WorkingItem::blank(item.id, item.description))
                .collect(),
        })
        .collect()
}
