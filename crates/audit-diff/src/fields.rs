//! Field-level differences between two snapshots
//!
//! Walks the fields of the newer snapshot, hides fields without a
//! friendly alias, formats dates and comma lists, and reports only values
//! whose renderings actually differ.

use crate::rules::DiffRules;
use audit_context::DateFormatter;
use audit_model::{keys, AttrDef, FieldChange, FieldValue, Revision};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Result of diffing plain fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDiff {
    /// Changed fields in content order
    pub changes: Vec<FieldChange>,
    /// Lower-cased raw new review status, when it changed to a non-empty value
    pub review_status: Option<String>,
}

/// Diffs plain content fields
#[derive(Debug, Clone)]
pub struct FieldDiffer {
    rules: Arc<DiffRules>,
    dates: Arc<dyn DateFormatter>,
}

impl FieldDiffer {
    /// Create differ
    #[inline]
    #[must_use]
    pub fn new(rules: Arc<DiffRules>, dates: Arc<dyn DateFormatter>) -> Self {
        Self { rules, dates }
    }

    /// Changes from `prev` to `next`
    ///
    /// With `defs`, only aliased fields are reported, under their alias.
    /// Without, every field is reported under its raw name.
    #[must_use]
    pub fn diff(&self, prev: &Revision, next: &Revision, defs: Option<&[AttrDef]>) -> FieldDiff {
        let mut out = FieldDiff::default();

        for (field, value) in &next.content {
            let display_name = match defs {
                Some(defs) => match defs.iter().find(|d| d.attr_name == *field) {
                    Some(def) => def.display_name.as_str(),
                    None => continue,
                },
                None => field.as_str(),
            };

            let orig = prev.content.get(field).unwrap_or(&Value::Null);
            if value == orig {
                continue;
            }

            let orig_val = self.render(field, orig);
            let new_val = self.render(field, value);
            if !orig_val.differs(&new_val) {
                continue;
            }

            if field == keys::REVIEW_STATUS {
                out.review_status = review_status(value);
            }
            out.changes.push(FieldChange {
                field_name: display_name.to_string(),
                orig_val,
                new_val,
            });
        }

        out
    }

    /// Format by field kind, then unify into a comparable rendering
    fn render(&self, field: &str, raw: &Value) -> FieldValue {
        let formatted: Cow<'_, Value> = if self.rules.is_date_field(field) && is_truthy(raw) {
            Cow::Owned(Value::String(self.dates.format_human_date(raw)))
        } else if self.rules.is_list_field(field) {
            match raw {
                Value::String(s) => Cow::Owned(Value::String(normalize_list(s))),
                _ => Cow::Borrowed(raw),
            }
        } else {
            Cow::Borrowed(raw)
        };
        self.unify(&formatted)
    }

    fn unify(&self, value: &Value) -> FieldValue {
        if !is_truthy(value) {
            return FieldValue::Text(self.rules.placeholder.clone());
        }
        match value {
            Value::Array(items) if items.is_empty() => {
                FieldValue::Text(self.rules.placeholder.clone())
            }
            Value::Array(items) => {
                FieldValue::List(items.iter().map(|item| self.display_of(item)).collect())
            }
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Object(_) => FieldValue::Text(self.display_of(value)),
            other => FieldValue::Text(other.to_string()),
        }
    }

    /// Display string of a list element or nested object
    fn display_of(&self, item: &Value) -> String {
        match item {
            Value::Object(map) => ["display_name", "title", "name", "email"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))
                .map_or_else(|| self.rules.placeholder.clone(), str::to_string),
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Null | Value::String(_) => self.rules.placeholder.clone(),
            other => other.to_string(),
        }
    }
}

/// Split on commas, trim, drop blanks, sort, rejoin with `", "`
#[must_use]
pub fn normalize_list(raw: &str) -> String {
    let mut items: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    items.sort_unstable();
    items.join(", ")
}

/// Lower-cased raw status; cleared statuses stash nothing
fn review_status(raw: &Value) -> Option<String> {
    if !is_truthy(raw) {
        return None;
    }
    match raw {
        Value::String(s) => Some(s.to_lowercase()),
        other => Some(other.to_string().to_lowercase()),
    }
}

/// Truthiness of a raw content value
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_context::HumanDateFormatter;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn differ() -> FieldDiffer {
        FieldDiffer::new(Arc::new(DiffRules::default()), Arc::new(HumanDateFormatter::default()))
    }

    fn rev(content: Value) -> Revision {
        Revision::new(1, "Control", 1, DateTime::<Utc>::default()).with_content(content)
    }

    #[test]
    fn alias_gating_hides_unaliased_fields() {
        let defs = vec![AttrDef::new("title", "Object Name")];
        let prev = rev(json!({"title": "Old", "foo": 1}));
        let next = rev(json!({"title": "New", "foo": 2}));

        let diff = differ().diff(&prev, &next, Some(&defs));
        assert_eq!(diff.changes, vec![FieldChange::new("Object Name", "Old", "New")]);
    }

    #[test]
    fn raw_names_without_defs() {
        let prev = rev(json!({"status": "Draft"}));
        let next = rev(json!({"status": "Active"}));
        let diff = differ().diff(&prev, &next, None);
        assert_eq!(diff.changes, vec![FieldChange::new("status", "Draft", "Active")]);
    }

    #[test]
    fn recipients_are_normalized() {
        let defs = vec![AttrDef::new("recipients", "Recipients")];
        let prev = rev(json!({"recipients": "foo,,bar,"}));
        let next = rev(json!({"recipients": ",,bar,baz"}));

        let diff = differ().diff(&prev, &next, Some(&defs));
        assert_eq!(
            diff.changes,
            vec![FieldChange::new("Recipients", "bar, foo", "bar, baz")]
        );
    }

    #[test]
    fn reordered_recipients_are_not_a_change() {
        let prev = rev(json!({"recipients": "a,b"}));
        let next = rev(json!({"recipients": "b, a,"}));
        assert!(differ().diff(&prev, &next, None).changes.is_empty());
    }

    #[test]
    fn dates_are_formatted() {
        let prev = rev(json!({"start_date": "2024-01-05"}));
        let next = rev(json!({"start_date": "2024-02-06"}));
        let diff = differ().diff(&prev, &next, None);
        assert_eq!(
            diff.changes,
            vec![FieldChange::new("start_date", "01/05/2024", "02/06/2024")]
        );
    }

    #[test]
    fn empty_values_become_placeholder() {
        let next = rev(json!({"description": "text", "notes": ""}));
        let diff = differ().diff(&Revision::empty("Control"), &next, None);
        assert_eq!(diff.changes, vec![FieldChange::new("description", "—", "text")]);
    }

    #[test]
    fn falsy_values_are_equivalent() {
        let prev = rev(json!({"notes": null, "count": 0}));
        let next = rev(json!({"notes": "", "count": false}));
        assert!(differ().diff(&prev, &next, None).changes.is_empty());
    }

    #[test]
    fn lists_compare_by_display_name_multiset() {
        let prev = rev(json!({"owners": [{"display_name": "A", "id": 1}, {"display_name": "B", "id": 2}]}));
        let next = rev(json!({"owners": [{"display_name": "B", "id": 7}, {"display_name": "A", "id": 8}]}));
        assert!(differ().diff(&prev, &next, None).changes.is_empty());

        let next = rev(json!({"owners": [{"display_name": "C"}]}));
        let diff = differ().diff(&prev, &next, None);
        assert_eq!(
            diff.changes[0].orig_val,
            FieldValue::List(vec!["A".into(), "B".into()])
        );
        assert_eq!(diff.changes[0].new_val, FieldValue::List(vec!["C".into()]));
    }

    #[test]
    fn review_status_is_stashed() {
        let prev = rev(json!({"review_status": "Unreviewed"}));
        let next = rev(json!({"review_status": "Reviewed"}));
        let diff = differ().diff(&prev, &next, None);
        assert_eq!(diff.review_status.as_deref(), Some("reviewed"));

        let diff = differ().diff(&prev, &prev, None);
        assert_eq!(diff.review_status, None);
    }

    #[test]
    fn cleared_review_status_stashes_nothing() {
        let prev = rev(json!({"review_status": "Reviewed"}));
        let next = rev(json!({"review_status": ""}));
        let diff = differ().diff(&prev, &next, None);

        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].new_val, FieldValue::text("—"));
        assert_eq!(diff.review_status, None);
    }

    #[test]
    fn normalize_list_cases() {
        assert_eq!(normalize_list("foo,,bar,"), "bar, foo");
        assert_eq!(normalize_list(" , ,"), "");
        assert_eq!(normalize_list("b , a"), "a, b");
    }

    fn content_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z ,]{0,12}".prop_map(Value::String),
        ];
        let value = leaf.prop_recursive(2, 8, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z_]{1,8}", inner, 0..3)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        });
        proptest::collection::btree_map(
            prop_oneof![
                Just("recipients".to_string()),
                Just("start_date".to_string()),
                "[a-z_]{1,10}"
            ],
            value,
            0..8,
        )
        .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn prop_self_diff_is_empty(content in content_strategy()) {
            let r = rev(content);
            let names: Vec<AttrDef> = r.content.keys().map(|k| AttrDef::new(k.clone(), k.clone())).collect();
            prop_assert!(differ().diff(&r, &r, None).changes.is_empty());
            prop_assert!(differ().diff(&r, &r, Some(&names)).changes.is_empty());
        }

        #[test]
        fn prop_normalized_list_is_stable(raw in "[a-c ,]{0,20}") {
            let once = normalize_list(&raw);
            prop_assert_eq!(normalize_list(&once), once.clone());
        }
    }
}
