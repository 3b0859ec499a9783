//! Custom attribute value differences

use audit_context::{DateFormatter, PersonCache};
use audit_model::{
    AttributeType, CustomAttributeDefinition, CustomAttributeId, CustomAttributeValue,
    FieldChange, PersonId,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Rendering of a checked checkbox
pub const CHECKMARK: &str = "✓";

/// Diffs custom attribute values using their definitions
#[derive(Debug, Clone)]
pub struct CustomAttributeDiffer {
    people: Arc<PersonCache>,
    dates: Arc<dyn DateFormatter>,
    placeholder: String,
}

impl CustomAttributeDiffer {
    /// Create differ
    #[inline]
    #[must_use]
    pub fn new(
        people: Arc<PersonCache>,
        dates: Arc<dyn DateFormatter>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            people,
            dates,
            placeholder: placeholder.into(),
        }
    }

    /// Changes between two sets of custom attribute values
    ///
    /// Ids without a definition on either side are skipped; definitions may
    /// have been deleted since the snapshot was taken.
    #[must_use]
    pub fn diff(
        &self,
        old_values: &[CustomAttributeValue],
        old_defs: &[CustomAttributeDefinition],
        new_values: &[CustomAttributeValue],
        new_defs: &[CustomAttributeDefinition],
    ) -> Vec<FieldChange> {
        let old_values = index_values(old_values);
        let new_values = index_values(new_values);
        let old_defs = index_defs(old_defs);
        let new_defs = index_defs(new_defs);

        let ids: BTreeSet<CustomAttributeId> =
            old_values.keys().chain(new_values.keys()).copied().collect();

        let mut changes = Vec::new();
        for id in ids {
            let (old_def, new_def) = match (old_defs.get(&id), new_defs.get(&id)) {
                (None, None) => {
                    tracing::debug!("Skipping custom attribute {} without definition", id);
                    continue;
                }
                (Some(old), None) => (*old, *old),
                (None, Some(new)) => (*new, *new),
                (Some(old), Some(new)) => (*old, *new),
            };

            let orig_val = self.render(old_values.get(&id).copied(), old_def);
            let new_val = self.render(new_values.get(&id).copied(), new_def);
            if orig_val != new_val {
                changes.push(FieldChange::new(new_def.title.clone(), orig_val, new_val));
            }
        }
        changes
    }

    fn render(
        &self,
        value: Option<&CustomAttributeValue>,
        def: &CustomAttributeDefinition,
    ) -> String {
        let empty = CustomAttributeValue::default();
        let value = value.unwrap_or(&empty);
        let raw = value.attribute_value.as_deref();

        let rendered = match def.attribute_type {
            AttributeType::Checkbox => raw
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|n| *n != 0.0 && !n.is_nan())
                .map(|_| CHECKMARK.to_string()),
            AttributeType::MapPerson => value
                .attribute_object
                .as_ref()
                .and_then(|person| self.people.find_by_id(PersonId(person.id)))
                .map(|person| person.label().to_string())
                .or_else(|| raw.map(str::to_string)),
            AttributeType::Date => raw.map(|v| {
                if v.is_empty() {
                    v.to_string()
                } else {
                    self.dates.format_human_date(&Value::String(v.to_string()))
                }
            }),
            _ => raw.map(str::to_string),
        };

        rendered
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.placeholder.clone())
    }
}

fn index_values(values: &[CustomAttributeValue]) -> HashMap<CustomAttributeId, &CustomAttributeValue> {
    values.iter().map(|v| (v.custom_attribute_id, v)).collect()
}

fn index_defs(
    defs: &[CustomAttributeDefinition],
) -> HashMap<CustomAttributeId, &CustomAttributeDefinition> {
    defs.iter().map(|d| (d.id, d)).collect()
}
