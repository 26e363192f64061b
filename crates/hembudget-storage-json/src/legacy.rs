//! Import of data files written by earlier versions of the budgeting form.
//!
//! Two shapes exist, neither carrying a `schema_version`:
//!
//! * flat: `{ "<Month>": { "notes": "..", "<Category>": { "<Item>_<n>": { "Budget": x, "Faktiskt": y } } } }`
//! * keyed: `{ "<Month>": { "notes": { "text": ".." }, "values": { "<Month>_<Category>_<Item>": { "budget": x, "actual": y } } } }`
//!
//! Amounts that are not numbers or numeric strings become `0.0` and are
//! reported as warnings; they never fail the import.

use hembudget_core::CoreError;
use hembudget_domain::{
    amount, common::NamedEntity, CategoryTemplate, Ledger, LineAmounts, LineItem, Month,
    MonthRecord,
};
use serde_json::{Map, Value};

const BUDGET_KEYS: &[&str] = &["Budget", "budget"];
const ACTUAL_KEYS: &[&str] = &["Faktiskt", "faktiskt", "Actual", "actual"];
/// Row label the flat form used for blank subcategory slots.
const BLANK_ROW: &str = "Tom";

/// Result of converting a legacy data file.
#[derive(Debug, Clone)]
pub struct LegacyImport {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
    pub migration: String,
}

/// Current-format files are recognised by their `schema_version` field.
pub fn is_current_format(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("schema_version"))
}

pub fn import(
    value: &Value,
    owner: &str,
    template: &CategoryTemplate,
) -> Result<LegacyImport, CoreError> {
    let root = value
        .as_object()
        .ok_or_else(|| CoreError::Serde("ledger file must contain a JSON object".into()))?;
    let mut ledger = Ledger::new(owner, template.clone());
    let mut warnings = Vec::new();
    let mut keyed = false;

    for (key, entry) in root {
        let Ok(month) = key.parse::<Month>() else {
            warnings.push(format!("unknown month `{key}` skipped"));
            continue;
        };
        let Some(fields) = entry.as_object() else {
            warnings.push(format!("{month}: entry is not an object, skipped"));
            continue;
        };
        let mut record = match fields.get("values").and_then(Value::as_object) {
            Some(values) => {
                keyed = true;
                let mut record = MonthRecord::seeded(template);
                import_keyed(&mut record, month, values, template, &mut warnings);
                record
            }
            None => {
                let mut record = MonthRecord::default();
                import_flat(&mut record, month, fields, &mut warnings);
                record
            }
        };
        record.notes = legacy_notes(fields.get("notes"));
        ledger.months.insert(month, record);
    }

    let migration = if keyed {
        "imported legacy keyed data file"
    } else {
        "imported legacy flat data file"
    };
    Ok(LegacyImport {
        ledger,
        warnings,
        migration: migration.to_string(),
    })
}

fn import_flat(
    record: &mut MonthRecord,
    month: Month,
    fields: &Map<String, Value>,
    warnings: &mut Vec<String>,
) {
    for (category, items) in fields {
        if category == "notes" {
            continue;
        }
        let Some(items) = items.as_object() else {
            warnings.push(format!("{month}: category `{category}` is not an object, skipped"));
            continue;
        };
        record.ensure_category(category);
        for (key, values) in items {
            let name = legacy_item_name(key);
            let context = format!("{month}/{category}/{name}");
            let Some(values) = values.as_object() else {
                warnings.push(format!("{context}: values are not an object, skipped"));
                continue;
            };
            let amounts = legacy_amounts(values, &context, warnings);
            if name == BLANK_ROW && amounts.budget == 0.0 && amounts.actual == 0.0 {
                continue;
            }
            let unique = unique_item_name(record, category, name);
            if unique != name && name != BLANK_ROW {
                warnings.push(format!("{context}: repeated row kept as `{unique}`"));
            }
            let category = record.ensure_category(category);
            category.upsert_item(LineItem::with_amounts(&unique, amounts));
        }
    }
}

fn import_keyed(
    record: &mut MonthRecord,
    month: Month,
    values: &Map<String, Value>,
    template: &CategoryTemplate,
    warnings: &mut Vec<String>,
) {
    for (key, entry) in values {
        let Some((category, item)) = split_key(key, month, template) else {
            warnings.push(format!("{month}: key `{key}` has no category, skipped"));
            continue;
        };
        let context = format!("{month}/{category}/{item}");
        let Some(entry) = entry.as_object() else {
            warnings.push(format!("{context}: values are not an object, skipped"));
            continue;
        };
        let amounts = legacy_amounts(entry, &context, warnings);
        let category = category.to_string();
        record.ensure_category(&category);
        insert_item(record, &category, item, amounts, &context, warnings);
    }
}

fn insert_item(
    record: &mut MonthRecord,
    category: &str,
    item: &str,
    amounts: LineAmounts,
    context: &str,
    warnings: &mut Vec<String>,
) {
    let category = record.ensure_category(category);
    let previous = category.item(item).cloned();
    if let Some(previous) = previous {
        if previous.budget != 0.0 || previous.actual != 0.0 {
            warnings.push(format!("{context}: duplicate item overwritten"));
        }
    }
    category.upsert_item(LineItem::with_amounts(item, amounts));
}

/// Rows of the flat form are distinct slots even when their names repeat
/// (every blank slot is `Tom`), so later ones get a ` 2`, ` 3`.. suffix.
fn unique_item_name(record: &MonthRecord, category: &str, name: &str) -> String {
    let taken = |candidate: &str| {
        record
            .category(category)
            .is_some_and(|existing| existing.item(candidate).is_some())
    };
    if !taken(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{name} {n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Splits `<Month>_<Category>_<Item>` using the template's category names,
/// preferring the longest match; falls back to the first underscore.
fn split_key<'a>(
    key: &'a str,
    month: Month,
    template: &'a CategoryTemplate,
) -> Option<(&'a str, &'a str)> {
    let prefix = format!("{}_", month.name());
    let rest = key.strip_prefix(prefix.as_str()).unwrap_or(key);
    let known = template
        .categories()
        .iter()
        .map(|category| category.name())
        .filter(|name| {
            rest.len() > name.len() + 1
                && rest.starts_with(name)
                && rest[name.len()..].starts_with('_')
        })
        .max_by_key(|name| name.len());
    match known {
        Some(name) => Some((&rest[..name.len()], &rest[name.len() + 1..])),
        None => rest
            .split_once('_')
            .filter(|(category, item)| !category.is_empty() && !item.is_empty()),
    }
}

/// Strips the `_<n>` row index the flat form appended to item names.
fn legacy_item_name(key: &str) -> &str {
    match key.rsplit_once('_') {
        Some((name, index))
            if !name.is_empty()
                && !index.is_empty()
                && index.chars().all(|c| c.is_ascii_digit()) =>
        {
            name
        }
        _ => key,
    }
}

fn legacy_notes(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(map)) => map
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn legacy_amounts(
    values: &Map<String, Value>,
    context: &str,
    warnings: &mut Vec<String>,
) -> LineAmounts {
    LineAmounts::new(
        legacy_amount(values, BUDGET_KEYS, context, warnings),
        legacy_amount(values, ACTUAL_KEYS, context, warnings),
    )
}

fn legacy_amount(
    values: &Map<String, Value>,
    keys: &[&str],
    context: &str,
    warnings: &mut Vec<String>,
) -> f64 {
    let Some((key, raw)) = keys
        .iter()
        .find_map(|key| values.get(*key).map(|value| (*key, value)))
    else {
        return 0.0;
    };
    read_amount(raw).unwrap_or_else(|| {
        warnings.push(format!("{context}: {key} `{raw}` coerced to 0"));
        0.0
    })
}

/// A stored amount that can be kept as is: a non-negative number or numeric string.
pub(crate) fn read_amount(raw: &Value) -> Option<f64> {
    let parsed = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => amount::parse_text(text),
        _ => None,
    };
    parsed.filter(|value| amount::is_valid(*value))
}
