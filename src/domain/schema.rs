//! Schema validation for untyped model output.
//!
//! Model responses are parsed into a `serde_json::Value` first and only become a
//! typed [`PartialSpec`] after every check here passes. All violations are
//! collected so recovery and diagnostics see the full picture.

use serde_json::{Map, Value};

use crate::domain::{ChartKind, DesignSettings, Layout, PartialSpec};

const TEXT_FIELDS: [&str; 4] = ["subtitle", "paragraph", "imagePrompt", "speakerNotes"];

/// Validate `raw` against the slide schema.
pub fn validate(raw: &Value) -> Result<PartialSpec, Vec<String>> {
    let Some(object) = raw.as_object() else {
        return Err(vec![format!("spec must be a JSON object, found {}", type_name(raw))]);
    };

    let mut errors = Vec::new();
    check_object(object, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<PartialSpec>(raw.clone())
        .map_err(|e| vec![format!("spec does not match schema: {}", e)])
}

fn check_object(object: &Map<String, Value>, errors: &mut Vec<String>) {
    for key in object.keys() {
        if !PartialSpec::FIELDS.contains(&key.as_str()) {
            errors.push(format!("unknown field `{}`", key));
        }
    }

    match object.get("title") {
        None => errors.push("title is required".to_string()),
        Some(Value::String(title)) if title.trim().is_empty() => {
            errors.push("title must not be empty".to_string())
        }
        Some(Value::String(_)) => {}
        Some(other) => errors.push(format!("title must be a string, found {}", type_name(other))),
    }

    for field in TEXT_FIELDS {
        if let Some(value) = object.get(field)
            && !value.is_string()
        {
            errors.push(format!("{} must be a string, found {}", field, type_name(value)));
        }
    }

    if let Some(value) = object.get("layout") {
        match value.as_str() {
            Some(layout) if Layout::from_identifier(layout).is_some() => {}
            Some(layout) => errors.push(format!("layout `{}` is not a known layout", layout)),
            None => errors.push(format!("layout must be a string, found {}", type_name(value))),
        }
    }

    if let Some(value) = object.get("bullets") {
        check_string_array("bullets", value, errors);
    }

    check_optional_object(object, "chart", errors, check_chart);
    check_optional_object(object, "table", errors, check_table);
    check_optional_object(object, "quote", errors, check_quote);

    if let Some(value) = object.get("design") {
        match value.as_object() {
            Some(design) => check_design(design, errors),
            None => errors.push(format!("design must be an object, found {}", type_name(value))),
        }
    }
}

fn check_optional_object(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<String>,
    check: fn(&Map<String, Value>, &mut Vec<String>),
) {
    match object.get(field) {
        None | Some(Value::Null) => {}
        Some(Value::Object(inner)) => check(inner, errors),
        Some(other) => {
            errors.push(format!("{} must be an object or null, found {}", field, type_name(other)))
        }
    }
}

fn check_chart(chart: &Map<String, Value>, errors: &mut Vec<String>) {
    check_unknown_keys("chart", chart, &["type", "labels", "series"], errors);

    match chart.get("type") {
        None => {}
        Some(Value::String(kind)) if ChartKind::from_identifier(kind).is_some() => {}
        Some(Value::String(kind)) => {
            errors.push(format!("chart.type `{}` is not a known chart type", kind))
        }
        Some(other) => {
            errors.push(format!("chart.type must be a string, found {}", type_name(other)))
        }
    }

    if let Some(labels) = chart.get("labels") {
        check_string_array("chart.labels", labels, errors);
    }

    let Some(series) = chart.get("series") else {
        return;
    };
    let Some(series) = series.as_array() else {
        errors.push(format!("chart.series must be an array, found {}", type_name(series)));
        return;
    };

    for (index, entry) in series.iter().enumerate() {
        let path = format!("chart.series[{}]", index);
        let Some(entry) = entry.as_object() else {
            errors.push(format!("{} must be an object, found {}", path, type_name(entry)));
            continue;
        };
        check_unknown_keys(&path, entry, &["name", "values"], errors);

        match entry.get("name") {
            Some(Value::String(_)) => {}
            Some(other) => {
                errors.push(format!("{}.name must be a string, found {}", path, type_name(other)))
            }
            None => errors.push(format!("{}.name is required", path)),
        }

        match entry.get("values").and_then(Value::as_array) {
            Some(values) => {
                for (value_index, value) in values.iter().enumerate() {
                    if !value.is_number() {
                        errors.push(format!(
                            "{}.values[{}] must be a number, found {}",
                            path,
                            value_index,
                            type_name(value)
                        ));
                    }
                }
            }
            None => errors.push(format!("{}.values must be an array of numbers", path)),
        }
    }
}

fn check_table(table: &Map<String, Value>, errors: &mut Vec<String>) {
    check_unknown_keys("table", table, &["headers", "rows"], errors);

    if let Some(headers) = table.get("headers") {
        check_string_array("table.headers", headers, errors);
    }

    let Some(rows) = table.get("rows") else {
        return;
    };
    let Some(rows) = rows.as_array() else {
        errors.push(format!("table.rows must be an array, found {}", type_name(rows)));
        return;
    };
    for (index, row) in rows.iter().enumerate() {
        check_string_array(&format!("table.rows[{}]", index), row, errors);
    }
}

fn check_quote(quote: &Map<String, Value>, errors: &mut Vec<String>) {
    check_unknown_keys("quote", quote, &["text", "attribution"], errors);

    match quote.get("text") {
        Some(Value::String(_)) => {}
        Some(other) => {
            errors.push(format!("quote.text must be a string, found {}", type_name(other)))
        }
        None => errors.push("quote.text is required".to_string()),
    }
    if let Some(attribution) = quote.get("attribution")
        && !attribution.is_string()
    {
        errors.push(format!(
            "quote.attribution must be a string, found {}",
            type_name(attribution)
        ));
    }
}

fn check_design(design: &Map<String, Value>, errors: &mut Vec<String>) {
    check_unknown_keys("design", design, &DesignSettings::FIELDS, errors);
    for field in DesignSettings::FIELDS {
        match design.get(field) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => errors.push(format!(
                "design.{} must be a string, found {}",
                field,
                type_name(other)
            )),
        }
    }
}

fn check_string_array(path: &str, value: &Value, errors: &mut Vec<String>) {
    let Some(items) = value.as_array() else {
        errors.push(format!("{} must be an array of strings, found {}", path, type_name(value)));
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            errors.push(format!("{}[{}] must be a string, found {}", path, index, type_name(item)));
        }
    }
}

fn check_unknown_keys(
    path: &str,
    object: &Map<String, Value>,
    allowed: &[&str],
    errors: &mut Vec<String>,
) {
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("unknown field `{}.{}`", path, key));
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_minimal_spec() {
        let spec = validate(&json!({"title": "Launch"})).unwrap();
        assert_eq!(spec.title, "Launch");
        assert_eq!(spec.layout, Layout::TitleContent);
        assert!(spec.bullets.is_empty());
    }

    #[test]
    fn accepts_full_spec() {
        let raw = json!({
            "title": "Revenue",
            "subtitle": "FY24",
            "layout": "chart",
            "bullets": [],
            "paragraph": "",
            "chart": {
                "type": "line",
                "labels": ["Q1", "Q2"],
                "series": [{"name": "EMEA", "values": [1.5, 2]}]
            },
            "table": null,
            "quote": {"text": "Growth", "attribution": "CFO"},
            "imagePrompt": "",
            "speakerNotes": "Mention churn",
            "design": {"theme": "dark", "accentColor": "#ff0000"}
        });

        let spec = validate(&raw).unwrap();
        assert_eq!(spec.layout, Layout::Chart);
        let chart = spec.chart.unwrap();
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.series[0].values, vec![1.5, 2.0]);
        assert_eq!(spec.design.accent_color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn reports_every_violation() {
        let raw = json!({
            "title": "",
            "layout": "hexagon",
            "bullets": ["ok", 3],
            "paragraph": null,
            "mood": "happy"
        });

        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.len(), 5, "{:?}", errors);
        assert!(errors.contains(&"unknown field `mood`".to_string()));
        assert!(errors.contains(&"title must not be empty".to_string()));
        assert!(errors.contains(&"layout `hexagon` is not a known layout".to_string()));
        assert!(errors.contains(&"bullets[1] must be a string, found number".to_string()));
        assert!(errors.contains(&"paragraph must be a string, found null".to_string()));
    }

    #[test]
    fn rejects_non_object_root() {
        let errors = validate(&json!(["title"])).unwrap_err();
        assert_eq!(errors, vec!["spec must be a JSON object, found array".to_string()]);
    }

    #[test]
    fn checks_nested_shapes() {
        let raw = json!({
            "title": "Nested",
            "chart": {"type": "radar", "series": [{"values": ["x"]}]},
            "table": {"headers": "A,B", "rows": [["1", 2]]},
            "quote": {"attribution": 7}
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.contains(&"chart.type `radar` is not a known chart type".to_string()));
        assert!(errors.contains(&"chart.series[0].name is required".to_string()));
        assert!(errors.contains(&"chart.series[0].values[0] must be a number, found string".to_string()));
        assert!(errors.contains(&"table.headers must be an array of strings, found string".to_string()));
        assert!(errors.contains(&"table.rows[0][1] must be a string, found number".to_string()));
        assert!(errors.contains(&"quote.text is required".to_string()));
        assert!(errors.contains(&"quote.attribution must be a string, found number".to_string()));
    }
}
