//! Typed value encoding used by the hosted document REST API.
//!
//! Every field value is an object with a single key naming its type,
//! e.g. `{"integerValue": "3"}` or `{"mapValue": {"fields": {...}}}`.
//! 64-bit integers travel as strings.

use serde_json::{Map, Value, json};

use brawl_application::DocumentError;
use brawl_domain::{FieldValue, Fields, Timestamp};

/// Encodes document fields into the REST `fields` object.
#[must_use]
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    )
}

/// Encodes a single field value.
#[must_use]
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(n) => json!({ "integerValue": n.to_string() }),
        FieldValue::Double(d) if d.is_nan() => json!({ "doubleValue": "NaN" }),
        FieldValue::Double(d) if d.is_infinite() => {
            let raw = if d.is_sign_positive() { "Infinity" } else { "-Infinity" };
            json!({ "doubleValue": raw })
        }
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => json!({ "timestampValue": ts.to_rfc3339() }),
        FieldValue::Reference(path) => json!({ "referenceValue": path }),
        FieldValue::GeoPoint { latitude, longitude } => {
            json!({ "geoPointValue": { "latitude": latitude, "longitude": longitude } })
        }
        FieldValue::Bytes(data) => json!({ "bytesValue": data }),
        FieldValue::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

/// Value types the codec understands.
const VALUE_KINDS: [&str; 11] = [
    "nullValue",
    "booleanValue",
    "integerValue",
    "doubleValue",
    "stringValue",
    "timestampValue",
    "referenceValue",
    "geoPointValue",
    "bytesValue",
    "arrayValue",
    "mapValue",
];

/// Decodes the REST `fields` object of a document.
///
/// Fields of a value type this codec does not know are skipped with a
/// warning so the rest of the document stays readable.
///
/// # Errors
///
/// Returns `Codec` if any known value is malformed.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, DocumentError> {
    fields
        .iter()
        .filter(|(name, value)| match unknown_kind(value) {
            Some(kind) => {
                tracing::warn!(field = %name, kind, "skipping field of unsupported value type");
                false
            }
            None => true,
        })
        .map(|(name, value)| {
            decode_value(value)
                .map(|v| (name.clone(), v))
                .map_err(|e| DocumentError::Codec(format!("field '{name}': {e}")))
        })
        .collect()
}

/// Decodes a single typed value.
///
/// # Errors
///
/// Returns `Codec` if the value is malformed or of an unsupported type.
pub fn decode_value(value: &Value) -> Result<FieldValue, DocumentError> {
    let object = value
        .as_object()
        .ok_or_else(|| codec("expected a typed value object"))?;
    let (kind, inner) = match (object.len(), object.iter().next()) {
        (1, Some(entry)) => entry,
        _ => return Err(codec("expected exactly one value type")),
    };

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| codec("booleanValue is not a boolean")),
        "integerValue" => decode_integer(inner).map(FieldValue::Integer),
        "doubleValue" => decode_double(inner).map(FieldValue::Double),
        "stringValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .ok_or_else(|| codec("stringValue is not a string")),
        "timestampValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| codec("timestampValue is not a string"))?;
            Timestamp::parse_rfc3339(raw)
                .map(FieldValue::Timestamp)
                .map_err(|e| codec(&e.to_string()))
        }
        "referenceValue" => inner
            .as_str()
            .map(|s| FieldValue::Reference(s.to_string()))
            .ok_or_else(|| codec("referenceValue is not a string")),
        "geoPointValue" => {
            // Zero coordinates are omitted on the wire.
            let coordinate = |name: &str| match inner.get(name) {
                None => Ok(0.0),
                Some(v) => v
                    .as_f64()
                    .ok_or_else(|| codec(&format!("geoPointValue.{name} is not a number"))),
            };
            Ok(FieldValue::GeoPoint {
                latitude: coordinate("latitude")?,
                longitude: coordinate("longitude")?,
            })
        }
        "bytesValue" => inner
            .as_str()
            .map(|s| FieldValue::Bytes(s.to_string()))
            .ok_or_else(|| codec("bytesValue is not a string")),
        "arrayValue" => {
            let values = match inner.get("values") {
                None | Some(Value::Null) => return Ok(FieldValue::Array(Vec::new())),
                Some(Value::Array(values)) => values,
                Some(_) => return Err(codec("arrayValue.values is not a list")),
            };
            values
                .iter()
                .map(decode_value)
                .collect::<Result<_, _>>()
                .map(FieldValue::Array)
        }
        "mapValue" => match inner.get("fields") {
            None | Some(Value::Null) => Ok(FieldValue::Map(Fields::new())),
            Some(Value::Object(fields)) => decode_fields(fields).map(FieldValue::Map),
            Some(_) => Err(codec("mapValue.fields is not an object")),
        },
        other => Err(codec(&format!("unsupported value type '{other}'"))),
    }
}

/// The type key of a well-formed typed value, if the codec does not know it.
fn unknown_kind(value: &Value) -> Option<&str> {
    let object = value.as_object().filter(|o| o.len() == 1)?;
    let kind = object.keys().next()?;
    (!VALUE_KINDS.contains(&kind.as_str())).then_some(kind.as_str())
}

fn decode_integer(value: &Value) -> Result<i64, DocumentError> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| codec(&format!("invalid integerValue '{s}'"))),
        Value::Number(n) => n.as_i64().ok_or_else(|| codec("integerValue out of range")),
        _ => Err(codec("integerValue is not a number")),
    }
}

fn decode_double(value: &Value) -> Result<f64, DocumentError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| codec("doubleValue out of range")),
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(codec(&format!("invalid doubleValue '{s}'"))),
        },
        _ => Err(codec("doubleValue is not a number")),
    }
}

fn codec(message: &str) -> DocumentError {
    DocumentError::Codec(message.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_user_profile_shape() {
        let fields = Fields::from([
            ("name".to_string(), FieldValue::from("Ada")),
            ("remainingFreeDebates".to_string(), FieldValue::Integer(3)),
            (
                "createdAt".to_string(),
                FieldValue::Timestamp(Timestamp::new(1_700_000_000, 0).unwrap()),
            ),
        ]);

        assert_eq!(
            encode_fields(&fields),
            json!({
                "createdAt": { "timestampValue": "2023-11-14T22:13:20Z" },
                "name": { "stringValue": "Ada" },
                "remainingFreeDebates": { "integerValue": "3" },
            })
        );
    }

    #[test]
    fn test_decode_nested_values() {
        let raw = json!({
            "tags": { "arrayValue": { "values": [{ "stringValue": "a" }, { "booleanValue": true }] } },
            "empty": { "arrayValue": {} },
            "meta": { "mapValue": { "fields": { "score": { "doubleValue": 1.5 } } } },
            "count": { "integerValue": 7 },
            "gone": { "nullValue": null },
        });

        let fields = decode_fields(raw.as_object().unwrap()).unwrap();
        assert_eq!(
            fields["tags"],
            FieldValue::Array(vec![FieldValue::from("a"), FieldValue::Boolean(true)])
        );
        assert_eq!(fields["empty"], FieldValue::Array(Vec::new()));
        assert_eq!(
            fields["meta"],
            FieldValue::Map(Fields::from([("score".to_string(), FieldValue::Double(1.5))]))
        );
        assert_eq!(fields["count"], FieldValue::Integer(7));
        assert_eq!(fields["gone"], FieldValue::Null);
    }

    #[test]
    fn test_non_finite_doubles_use_string_form() {
        assert_eq!(
            encode_value(&FieldValue::Double(f64::NEG_INFINITY)),
            json!({ "doubleValue": "-Infinity" })
        );
        let decoded = decode_value(&json!({ "doubleValue": "NaN" })).unwrap();
        assert!(matches!(decoded, FieldValue::Double(d) if d.is_nan()));
    }

    #[test]
    fn test_decode_reference_geo_point_and_bytes() {
        let raw = json!({
            "team": { "referenceValue": "projects/p/databases/(default)/documents/teams/t1" },
            "home": { "geoPointValue": { "latitude": 51.5 } },
            "avatar": { "bytesValue": "aGk=" },
        });

        let fields = decode_fields(raw.as_object().unwrap()).unwrap();
        assert_eq!(
            fields["team"],
            FieldValue::Reference("projects/p/databases/(default)/documents/teams/t1".into())
        );
        assert_eq!(
            fields["home"],
            FieldValue::GeoPoint {
                latitude: 51.5,
                longitude: 0.0
            }
        );
        assert_eq!(fields["avatar"], FieldValue::Bytes("aGk=".into()));
        assert_eq!(encode_value(&fields["avatar"]), json!({ "bytesValue": "aGk=" }));
    }

    #[test]
    fn test_unknown_field_type_does_not_hide_other_fields() {
        let raw = json!({
            "remainingFreeDebates": { "integerValue": "5" },
            "layout": { "vectorValue": { "values": [1.0, 2.0] } },
            "meta": { "mapValue": { "fields": { "shape": { "vectorValue": {} } } } },
        });

        let fields = decode_fields(raw.as_object().unwrap()).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["remainingFreeDebates"], FieldValue::Integer(5));
        assert_eq!(fields["meta"], FieldValue::Map(Fields::new()));
    }

    #[test]
    fn test_decode_rejects_unsupported_and_malformed() {
        let err = decode_value(&json!({ "vectorValue": {} })).unwrap_err();
        assert!(matches!(err, DocumentError::Codec(m) if m.contains("vectorValue")));

        assert!(decode_value(&json!({ "integerValue": "3.5" })).is_err());
        assert!(decode_value(&json!({ "referenceValue": 3 })).is_err());
        assert!(decode_value(&json!("plain")).is_err());
        assert!(decode_value(&json!({ "stringValue": "a", "booleanValue": true })).is_err());
    }
}
