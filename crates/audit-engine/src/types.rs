//! Engine input and output

use crate::backfill::AclBackfill;
use crate::error::{EngineError, EngineResult};
use audit_model::{HistoryEntry, ObjectKey, RelationshipRevision, Revision};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything fetched for one object's history page
///
/// All collections are expected oldest first, though the engine sorts
/// them again before diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionHistory {
    /// Object whose history is shown
    pub subject: ObjectKey,
    /// Snapshots of the subject
    #[serde(default)]
    pub object: Vec<Revision>,
    /// Baseline predating `object`; used only when exactly one is given
    #[serde(default)]
    pub revisions_for_compare: Vec<Revision>,
    /// Snapshots of relationships touching the subject
    #[serde(default)]
    pub mappings: Vec<RelationshipRevision>,
}

impl RevisionHistory {
    /// Create empty history for `subject`
    #[inline]
    #[must_use]
    pub fn new(subject: ObjectKey) -> Self {
        Self {
            subject,
            object: Vec::new(),
            revisions_for_compare: Vec::new(),
            mappings: Vec::new(),
        }
    }

    /// With object snapshots
    #[must_use]
    pub fn with_object(mut self, revisions: Vec<Revision>) -> Self {
        self.object = revisions;
        self
    }

    /// With comparison baseline
    #[must_use]
    pub fn with_compare(mut self, revision: Revision) -> Self {
        self.revisions_for_compare = vec![revision];
        self
    }

    /// With relationship snapshots
    #[must_use]
    pub fn with_mappings(mut self, mappings: Vec<RelationshipRevision>) -> Self {
        self.mappings = mappings;
        self
    }

    /// Decode from JSON
    ///
    /// # Errors
    /// Returns error if the JSON does not describe a history
    pub fn from_json(text: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and decode a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded
    pub async fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::io(path, e))?;
        Self::from_json(&text)
    }

    /// Baseline for the first object snapshot
    #[must_use]
    pub fn baseline(&self) -> Revision {
        match self.revisions_for_compare.as_slice() {
            [only] => only.clone(),
            _ => Revision::empty(self.subject.kind.clone()),
        }
    }
}

/// Result of one [`crate::RevisionDiffEngine::compute`] call
#[derive(Debug)]
pub struct RevisionDiffReport {
    /// Generation this report belongs to
    pub generation: u64,
    /// Object and mapping rows, newest first
    pub entries: Vec<HistoryEntry>,
    /// Pending email fill for role diffs in `entries`
    pub backfill: AclBackfill,
}

impl RevisionDiffReport {
    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_payload() {
        let history = RevisionHistory::from_json(
            &json!({
                "subject": {"type": "Control", "id": 1},
                "object": [{
                    "id": 10,
                    "resource_type": "Control",
                    "resource_id": 1,
                    "content": null,
                    "updated_at": "2024-01-01T00:00:00Z"
                }]
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(history.subject, ObjectKey::new("Control", 1));
        assert_eq!(history.object.len(), 1);
        assert!(history.object[0].content.is_empty());
        assert!(history.mappings.is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(
            RevisionHistory::from_json("{\"object\": []}"),
            Err(EngineError::InvalidHistory(_))
        ));
    }

    #[test]
    fn baseline_needs_exactly_one_compare_revision() {
        let subject = ObjectKey::new("Control", 1);
        let compare = Revision::empty("Control").with_field("title", json!("old"));

        let one = RevisionHistory::new(subject.clone()).with_compare(compare.clone());
        assert_eq!(one.baseline(), compare);

        let mut two = one.clone();
        two.revisions_for_compare.push(compare);
        assert!(two.baseline().content.is_empty());
        assert_eq!(two.baseline().resource_type, "Control");
    }
}
