//! Submission pipeline
//!
//! Takes a validated payload from the session state machine and records it
//! durably with exactly one provider write. There is no retry and no
//! idempotency key: re-invoking after a timeout of unknown outcome can
//! create a duplicate record, since the id is generated per write.

use tracing::info;

use crate::db::ChecklistProvider;
use crate::models::{InspectionRecord, Issue, ItemStatus, SubmissionPayload};
use crate::Result;

/// Durably record one inspection, returning the generated id
pub async fn submit(
    provider: &dyn ChecklistProvider,
    payload: &SubmissionPayload,
) -> Result<String> {
    let id = provider.submit_inspection(payload).await?;
    info!(
        "Recorded inspection {} for store {} by {}",
        id, payload.store_number, payload.inspected_by
    );
    Ok(id)
}

/// Flip the `fixed` flag on one issue inside a submitted inspection
pub async fn update_issue_status(
    provider: &dyn ChecklistProvider,
    inspection_id: &str,
    category_id: &str,
    item_id: &str,
    fixed: bool,
) -> Result<InspectionRecord> {
    provider
        .update_issue_status(inspection_id, category_id, item_id, fixed)
        .await
}

/// Materialize the issue view: every item answered "no" across the given
/// inspections, flattened for the admin dashboard
pub fn flatten_issues(inspections: &[InspectionRecord]) -> Vec<Issue> {
    inspections
        .iter()
        .flat_map(|inspection| {
            inspection.categories.iter().flat_map(|category| {
                category
                    .items
                    .iter()
                    .filter(|item| item.status == ItemStatus::No)
                    .map(|item| Issue {
                        inspection_id: inspection.id.clone(),
                        store_number: inspection.store_number.clone(),
                        submitted_at: inspection.submitted_at.clone(),
                        category_id: category.id.clone(),
                        category_title: category.title.clone(),
                        item_id: item.id.clone(),
                        description: item.description.clone(),
                        notes: item.notes.clone(),
                        fixed: item.fixed,
                    })
            })
        })
        .collect()
}
