//! Best-effort structural repair of specs that failed validation.
//!
//! Repairs are deterministic and idempotent: running [`recover`] on its own
//! output yields the same value. Nothing substantive is invented; the only
//! synthesized text is [`PLACEHOLDER_TITLE`] and generic series names.

use serde_json::{Map, Number, Value};

use crate::domain::{ChartKind, DesignSettings, Layout};

pub const PLACEHOLDER_TITLE: &str = "Untitled Slide";

const WRAPPER_KEYS: [&str; 2] = ["slide", "spec"];
const TEXT_FIELDS: [&str; 4] = ["subtitle", "paragraph", "imagePrompt", "speakerNotes"];
const KEY_ALIASES: [(&str, &str); 5] = [
    ("image_prompt", "imagePrompt"),
    ("speaker_notes", "speakerNotes"),
    ("background_color", "backgroundColor"),
    ("accent_color", "accentColor"),
    ("font_family", "fontFamily"),
];
const BULLET_MARKERS: [&str; 4] = ["- ", "* ", "• ", "– "];

/// Repair `raw` into something the schema validator is likely to accept.
///
/// Values that are not objects carry no slide to repair and are returned as-is.
pub fn recover(raw: &Value) -> Value {
    let Some(source) = unwrap_container(raw).map(canonical_keys) else {
        return raw.clone();
    };
    let mut repaired = Map::new();

    repaired.insert("title".into(), Value::String(recover_title(source.get("title"))));

    for field in TEXT_FIELDS {
        repaired.insert(field.into(), Value::String(coerce_text(source.get(field))));
    }

    let layout = source
        .get("layout")
        .and_then(Value::as_str)
        .and_then(Layout::normalize)
        .unwrap_or_default();
    repaired.insert("layout".into(), Value::String(layout.as_str().into()));

    repaired.insert("bullets".into(), Value::Array(recover_bullets(source.get("bullets"))));

    if let Some(chart) = source.get("chart").and_then(Value::as_object) {
        repaired.insert("chart".into(), recover_chart(chart));
    }
    if let Some(table) = source.get("table").and_then(Value::as_object) {
        repaired.insert("table".into(), recover_table(table));
    }
    if let Some(quote) = source.get("quote").and_then(recover_quote) {
        repaired.insert("quote".into(), quote);
    }
    if let Some(design) = source.get("design").and_then(Value::as_object) {
        repaired.insert("design".into(), recover_design(&canonical_keys(design)));
    }

    Value::Object(repaired)
}

/// Models sometimes wrap the slide in `{"slide": {...}}` or `{"slides": [...]}`.
fn unwrap_container(raw: &Value) -> Option<&Map<String, Value>> {
    let object = raw.as_object()?;
    if object.contains_key("title") {
        return Some(object);
    }

    for key in WRAPPER_KEYS {
        if let Some(inner) = object.get(key).and_then(Value::as_object) {
            return Some(inner);
        }
    }

    object
        .get("slides")
        .and_then(Value::as_array)
        .and_then(|slides| slides.first())
        .and_then(Value::as_object)
        .or(Some(object))
}

fn canonical_keys(object: &Map<String, Value>) -> Map<String, Value> {
    let mut canonical = object.clone();
    for (alias, name) in KEY_ALIASES {
        if let Some(value) = canonical.remove(alias)
            && !canonical.contains_key(name)
        {
            canonical.insert(name.to_string(), value);
        }
    }
    canonical
}

fn recover_title(value: Option<&Value>) -> String {
    let title = coerce_text(value);
    let trimmed = title.trim();
    if trimmed.is_empty() { PLACEHOLDER_TITLE.to_string() } else { trimmed.to_string() }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Array(items)) => {
            items.iter().filter_map(scalar_text).collect::<Vec<_>>().join(" ")
        }
        Some(Value::Null) | Some(Value::Object(_)) | None => String::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn recover_bullets(value: Option<&Value>) -> Vec<Value> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(object) => object.get("text").and_then(scalar_text),
                other => scalar_text(other),
            })
            .collect(),
        Some(Value::String(text)) => text.lines().map(strip_bullet_marker).collect(),
        _ => Vec::new(),
    };

    items.into_iter().filter(|item| !item.trim().is_empty()).map(Value::String).collect()
}

fn strip_bullet_marker(line: &str) -> String {
    let trimmed = line.trim();
    BULLET_MARKERS
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

fn recover_chart(chart: &Map<String, Value>) -> Value {
    let kind = chart
        .get("type")
        .and_then(Value::as_str)
        .and_then(|kind| ChartKind::from_identifier(&kind.trim().to_ascii_lowercase()))
        .unwrap_or_default();

    let series = chart
        .get("series")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .enumerate()
                .map(|(index, entry)| {
                    let name = entry
                        .get("name")
                        .and_then(scalar_text)
                        .unwrap_or_else(|| format!("Series {}", index + 1));
                    let values = entry
                        .get("values")
                        .and_then(Value::as_array)
                        .map(|values| values.iter().filter_map(coerce_number).collect())
                        .unwrap_or_default();
                    let mut repaired = Map::new();
                    repaired.insert("name".into(), Value::String(name));
                    repaired.insert("values".into(), Value::Array(values));
                    Value::Object(repaired)
                })
                .collect()
        })
        .unwrap_or_default();

    let mut repaired = Map::new();
    repaired.insert("type".into(), Value::String(kind.as_str().into()));
    repaired.insert("labels".into(), Value::Array(string_array(chart.get("labels"))));
    repaired.insert("series".into(), Value::Array(series));
    Value::Object(repaired)
}

fn coerce_number(value: &Value) -> Option<Value> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            text.trim().trim_end_matches('%').replace(',', "").parse::<f64>().ok()?
        }
        _ => return None,
    };
    Number::from_f64(number).map(Value::Number)
}

fn recover_table(table: &Map<String, Value>) -> Value {
    let rows = table
        .get("rows")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_array)
                .map(|cells| {
                    Value::Array(
                        cells
                            .iter()
                            .map(|cell| Value::String(scalar_text(cell).unwrap_or_default()))
                            .collect(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let mut repaired = Map::new();
    repaired.insert("headers".into(), Value::Array(string_array(table.get("headers"))));
    repaired.insert("rows".into(), Value::Array(rows));
    Value::Object(repaired)
}

fn recover_quote(value: &Value) -> Option<Value> {
    let (text, attribution) = match value {
        Value::String(text) => (text.clone(), String::new()),
        Value::Object(quote) => {
            (coerce_text(quote.get("text")), coerce_text(quote.get("attribution")))
        }
        _ => return None,
    };

    let mut repaired = Map::new();
    repaired.insert("text".into(), Value::String(text));
    repaired.insert("attribution".into(), Value::String(attribution));
    Some(Value::Object(repaired))
}

fn recover_design(design: &Map<String, Value>) -> Value {
    let repaired = DesignSettings::FIELDS
        .iter()
        .filter_map(|field| {
            let text = design.get(*field).and_then(scalar_text)?;
            Some((field.to_string(), Value::String(text)))
        })
        .collect();
    Value::Object(repaired)
}

fn string_array(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_text).map(Value::String).collect())
        .unwrap_or_default()
}
