//! # Row Aggregation
//!
//! Collapses raw spreadsheet rows into unique label groups and computes how
//! many copies of each label to print.
//!
//! The pipeline is a fixed sequence:
//!
//! ```text
//! records → aggregate() → apply_edits() → finalize() → Vec<LabelGroup>
//! ```
//!
//! - [`aggregate`] counts occurrences per normalized [`GroupKey`] in input
//!   order, and doubles every count in bulk mode (two physical labels per
//!   counted row).
//! - [`apply_edits`] replaces quantity/color/size per group from user edits.
//! - [`finalize`] drops zero-quantity groups (bulk) or forces every
//!   quantity to one (template).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EtiquetaError;
use crate::style::BULK_COPIES_PER_ROW;
use crate::tabular::RawRecord;

/// Column the aggregator reads for color when no color role is mapped.
const DEFAULT_COLOR_COLUMN: &str = "Color";

/// Which output the generation run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMode {
    /// One consolidated multi-page document, quantities doubled.
    #[default]
    Bulk,
    /// One file per unique variant, quantity forced to one.
    Template,
}

/// Mapping from label roles to spreadsheet column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub barcode: String,
    pub product_name: String,
    pub article: String,
    /// Optional size column; when absent, groups carry no size.
    #[serde(default)]
    pub size: Option<String>,
    /// Optional color column; defaults to a column literally named `Color`.
    #[serde(default)]
    pub color: Option<String>,
}

impl RoleMapping {
    fn color_column(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR_COLUMN)
    }
}

/// Equality key of a label variant.
///
/// All components are trimmed and lower-cased; a missing field is the empty
/// string, never absent. Used directly as the map key so that no separator
/// character can falsely merge or split groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupKey {
    pub article: String,
    pub barcode: String,
    pub color: String,
    pub size: String,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl GroupKey {
    /// Build the key for one record under the given role mapping.
    pub fn from_record(record: &RawRecord, roles: &RoleMapping) -> Self {
        Self {
            article: normalize(record.get(&roles.article)),
            barcode: normalize(record.get(&roles.barcode)),
            color: normalize(record.get(roles.color_column())),
            size: roles
                .size
                .as_deref()
                .map(|col| normalize(record.get(col)))
                .unwrap_or_default(),
        }
    }
}

/// The deduplicated representation of all rows sharing a [`GroupKey`].
///
/// Attributes are taken verbatim from the first record of the group (size
/// excepted, which is stored normalized); `quantity` is the number of label
/// copies to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub name: String,
    pub article: String,
    pub barcode: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
}

impl LabelGroup {
    fn from_record(record: &RawRecord, roles: &RoleMapping, key: &GroupKey) -> Self {
        Self {
            name: record.get(&roles.product_name).to_string(),
            article: record.get(&roles.article).to_string(),
            barcode: record.get(&roles.barcode).trim().to_string(),
            color: record.get(roles.color_column()).to_string(),
            size: key.size.clone(),
            quantity: 0,
        }
    }
}

/// Group raw records and count label copies.
///
/// Iterates in input order; the order of first appearance is the iteration
/// order of the returned map, which downstream file and report ordering
/// depends on. In bulk mode every count is multiplied by
/// [`BULK_COPIES_PER_ROW`] after the pass.
pub fn aggregate(
    records: &[RawRecord],
    roles: &RoleMapping,
    mode: PrintMode,
) -> IndexMap<GroupKey, LabelGroup> {
    let mut groups: IndexMap<GroupKey, LabelGroup> = IndexMap::new();

    for record in records {
        let key = GroupKey::from_record(record, roles);
        let group = groups
            .entry(key.clone())
            .or_insert_with(|| LabelGroup::from_record(record, roles, &key));
        group.quantity += 1;
        if group.size.is_empty() && !key.size.is_empty() {
            group.size = key.size;
        }
    }

    if mode == PrintMode::Bulk {
        for group in groups.values_mut() {
            group.quantity *= BULK_COPIES_PER_ROW;
        }
    }

    groups
}

/// One user edit, applied positionally to the aggregated groups.
///
/// `None` leaves the field untouched; `Some` replaces it outright, so an
/// explicit empty color clears the color line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupEdit {
    #[serde(default, deserialize_with = "deserialize_quantity")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Parse a user-supplied quantity value.
///
/// Accepts a non-negative integer, or a string holding one (HTML forms
/// deliver numbers as text). Anything else is a validation error; bad input
/// must never silently default.
pub fn parse_quantity(value: &Value) -> Result<u32, EtiquetaError> {
    match value {
        Value::Number(n) => {
            if let Some(q) = n.as_u64() {
                u32::try_from(q)
                    .map_err(|_| EtiquetaError::Validation(format!("quantity {q} is too large")))
            } else {
                Err(EtiquetaError::Validation(format!(
                    "quantity must be a non-negative integer, got {n}"
                )))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<u32>().map_err(|_| {
                EtiquetaError::Validation(format!(
                    "quantity must be a non-negative integer, got {trimmed:?}"
                ))
            })
        }
        other => Err(EtiquetaError::Validation(format!(
            "quantity must be a non-negative integer, got {other}"
        ))),
    }
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_quantity(&v).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Apply per-group user edits, positionally.
///
/// Edits beyond the group count are ignored; groups without an edit keep
/// their computed values.
pub fn apply_edits(groups: &mut IndexMap<GroupKey, LabelGroup>, edits: &[GroupEdit]) {
    for (group, edit) in groups.values_mut().zip(edits) {
        if let Some(quantity) = edit.quantity {
            group.quantity = quantity;
        }
        if let Some(color) = &edit.color {
            group.color = color.clone();
        }
        if let Some(size) = &edit.size {
            group.size = size.clone();
        }
    }
}

/// Apply the mode's final quantity policy and surrender the groups.
///
/// Bulk drops every group whose quantity ended up at zero; template forces
/// every quantity to exactly one and drops nothing.
pub fn finalize(groups: IndexMap<GroupKey, LabelGroup>, mode: PrintMode) -> Vec<LabelGroup> {
    match mode {
        PrintMode::Bulk => groups
            .into_values()
            .filter(|group| group.quantity > 0)
            .collect(),
        PrintMode::Template => groups
            .into_values()
            .map(|mut group| {
                group.quantity = 1;
                group
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn roles() -> RoleMapping {
        RoleMapping {
            barcode: "Barcode".into(),
            product_name: "Name".into(),
            article: "Article".into(),
            size: Some("Size".into()),
            color: None,
        }
    }

    fn record(article: &str, barcode: &str, color: &str, size: &str) -> RawRecord {
        [
            ("Article", article),
            ("Barcode", barcode),
            ("Color", color),
            ("Size", size),
            ("Name", "Cotton shirt"),
        ]
        .into_iter()
        .collect()
    }

    /// The §8-style scenario: two rows of one key, one of another, plus a
    /// case variant of the first.
    fn sample_records() -> Vec<RawRecord> {
        vec![
            record("A1", "111", "red", ""),
            record("A2", "222", "blue", "M"),
            record("A1", "111", "RED", ""),
            record("A1", "111", "red ", ""),
        ]
    }

    #[test]
    fn test_case_and_whitespace_collapse() {
        let groups = aggregate(&sample_records(), &roles(), PrintMode::Bulk);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_bulk_quantity_is_double_the_count() {
        let groups = aggregate(&sample_records(), &roles(), PrintMode::Bulk);
        let quantities: Vec<u32> = groups.values().map(|g| g.quantity).collect();
        assert_eq!(quantities, vec![6, 2]);
    }

    #[test]
    fn test_template_counts_are_raw() {
        let groups = aggregate(&sample_records(), &roles(), PrintMode::Template);
        let quantities: Vec<u32> = groups.values().map(|g| g.quantity).collect();
        assert_eq!(quantities, vec![3, 1]);
    }

    #[test]
    fn test_template_finalize_forces_one() {
        let groups = aggregate(&sample_records(), &roles(), PrintMode::Template);
        let finalized = finalize(groups, PrintMode::Template);
        assert!(finalized.iter().all(|g| g.quantity == 1));
        assert_eq!(finalized.len(), 2);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let groups = aggregate(&sample_records(), &roles(), PrintMode::Bulk);
        let barcodes: Vec<&str> = groups.values().map(|g| g.barcode.as_str()).collect();
        assert_eq!(barcodes, vec!["111", "222"]);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let records = sample_records();
        let first = aggregate(&records, &roles(), PrintMode::Bulk);
        let second = aggregate(&records, &roles(), PrintMode::Bulk);
        let a: Vec<_> = first.iter().collect();
        let b: Vec<_> = second.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attributes_come_from_first_record() {
        let mut records = sample_records();
        records[2].insert("Name", "Renamed later");
        let groups = aggregate(&records, &roles(), PrintMode::Bulk);
        assert_eq!(groups.values().next().unwrap().name, "Cotton shirt");
        // Display color keeps the first record's casing.
        assert_eq!(groups.values().next().unwrap().color, "red");
    }

    #[test]
    fn test_missing_role_column_is_empty_not_an_error() {
        let mut rec = RawRecord::new();
        rec.insert("Name", "Bare row");
        let groups = aggregate(&[rec], &roles(), PrintMode::Bulk);
        let group = groups.values().next().unwrap();
        assert_eq!(group.barcode, "");
        assert_eq!(group.article, "");
        assert_eq!(group.quantity, 2);
    }

    #[test]
    fn test_zero_quantity_dropped_in_bulk_only() {
        let mut bulk = aggregate(&sample_records(), &roles(), PrintMode::Bulk);
        apply_edits(
            &mut bulk,
            &[GroupEdit {
                quantity: Some(0),
                ..Default::default()
            }],
        );
        let bulk = finalize(bulk, PrintMode::Bulk);
        assert_eq!(bulk.len(), 1);
        assert_eq!(bulk[0].barcode, "222");

        let mut template = aggregate(&sample_records(), &roles(), PrintMode::Template);
        apply_edits(
            &mut template,
            &[GroupEdit {
                quantity: Some(0),
                ..Default::default()
            }],
        );
        let template = finalize(template, PrintMode::Template);
        assert_eq!(template.len(), 2);
        assert!(template.iter().all(|g| g.quantity == 1));
    }

    #[test]
    fn test_edit_replaces_not_accumulates() {
        let mut groups = aggregate(&sample_records(), &roles(), PrintMode::Bulk);
        apply_edits(
            &mut groups,
            &[GroupEdit {
                quantity: Some(10),
                color: Some(String::new()),
                size: Some("XL".into()),
            }],
        );
        let first = groups.values().next().unwrap();
        assert_eq!(first.quantity, 10);
        assert_eq!(first.color, "");
        assert_eq!(first.size, "XL");
        // Second group untouched.
        assert_eq!(groups.values().nth(1).unwrap().quantity, 2);
    }

    #[test]
    fn test_parse_quantity_accepts_int_and_numeric_string() {
        assert_eq!(parse_quantity(&json!(12)).unwrap(), 12);
        assert_eq!(parse_quantity(&json!("7")).unwrap(), 7);
        assert_eq!(parse_quantity(&json!(" 3 ")).unwrap(), 3);
        assert_eq!(parse_quantity(&json!(0)).unwrap(), 0);
    }

    #[test]
    fn test_parse_quantity_rejects_bad_input() {
        for bad in [json!("abc"), json!(-1), json!(3.5), json!([1]), json!("")] {
            assert!(
                matches!(parse_quantity(&bad), Err(EtiquetaError::Validation(_))),
                "expected validation error for {bad}"
            );
        }
    }

    #[test]
    fn test_group_edit_deserializes_form_style_values() {
        let edit: GroupEdit =
            serde_json::from_value(json!({"quantity": "4", "color": "navy"})).unwrap();
        assert_eq!(edit.quantity, Some(4));
        assert_eq!(edit.color.as_deref(), Some("navy"));
        assert_eq!(edit.size, None);

        let err = serde_json::from_value::<GroupEdit>(json!({"quantity": "lots"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_no_size_column_leaves_size_empty() {
        let mut no_size = roles();
        no_size.size = None;
        let groups = aggregate(&sample_records(), &no_size, PrintMode::Bulk);
        assert!(groups.values().all(|g| g.size.is_empty()));
        // Without the size key component the M row merges only by its
        // other fields; it still differs by article and barcode here.
        assert_eq!(groups.len(), 2);
    }
}
