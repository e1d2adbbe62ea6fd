// JSON <-> Firestore typed values.
// https://cloud.google.com/firestore/docs/reference/rest/v1/Value
use serde_json::{json, Map, Number, Value};

#[must_use]
pub fn to_firestore(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": to_fields(map) } }),
    }
}

#[must_use]
pub fn to_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), to_firestore(value)))
        .collect()
}

/// Unknown value kinds (references, geo points) decode as `null`.
#[must_use]
pub fn from_firestore(value: &Value) -> Value {
    let Some(typed) = value.as_object() else {
        return Value::Null;
    };

    if let Some(b) = typed.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if let Some(raw) = typed.get("integerValue") {
        let parsed = match raw {
            Value::String(s) => s.parse::<i64>().ok(),
            other => other.as_i64(),
        };
        return parsed.map_or(Value::Null, Value::from);
    }
    if let Some(d) = typed.get("doubleValue").and_then(Value::as_f64) {
        return Number::from_f64(d).map_or(Value::Null, Value::Number);
    }
    if let Some(s) = typed
        .get("stringValue")
        .or_else(|| typed.get("timestampValue"))
        .and_then(Value::as_str)
    {
        return Value::String(s.to_string());
    }
    if let Some(array) = typed.get("arrayValue") {
        let values = array["values"]
            .as_array()
            .map(|items| items.iter().map(from_firestore).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = typed.get("mapValue") {
        return Value::Object(from_fields(&map["fields"]));
    }

    Value::Null
}

#[must_use]
pub fn from_fields(fields: &Value) -> Map<String, Value> {
    fields
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), from_firestore(value)))
                .collect()
        })
        .unwrap_or_default()
}
