//! Entity description and the shared payload-normalization rules.
//!
//! # Design
//! Each entity kind ships a static `EntityDescriptor`: its collection path,
//! the fields eligible for outbound payloads, and the field used to address a
//! single resource. The mapper is driven entirely by this table; there is no
//! runtime field discovery. Entity kinds implement the `Entity` trait to wire
//! the descriptor up, expose the lookup value and persisted flag, and may
//! override `normalize` when the wire format demands extra shape rules (the
//! contact kind does).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Static configuration for one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    /// Collection resource name, e.g. `"contacts"`.
    pub base_path: &'static str,
    /// Fields eligible for outbound create/update payloads.
    pub writable_fields: &'static [&'static str],
    /// Field addressing a single resource, e.g. `"email"`.
    pub lookup_field: &'static str,
}

/// A record mirroring one remote resource instance.
///
/// The `persisted` flag tracks whether the entity's data originated from (or
/// was confirmed by) a successful server response; it is never serialized.
pub trait Entity: Serialize + DeserializeOwned + Default {
    fn descriptor() -> &'static EntityDescriptor;

    /// Current value of the descriptor's lookup field, if set and non-empty.
    fn lookup_value(&self) -> Option<&str>;

    fn is_persisted(&self) -> bool;

    /// Normally only the mapper flips this; callers may force it to `true`
    /// to make `save` issue a partial update for a hand-built entity.
    fn set_persisted(&mut self, persisted: bool);

    /// Build the outbound write payload. The default keeps exactly the
    /// writable fields that currently hold a non-empty value.
    fn normalize(&self) -> Result<Map<String, Value>, ApiError> {
        normalize_writable(self)
    }
}

/// Copy the writable fields of `entity` into a payload map, dropping fields
/// whose value is null, an empty string, an empty array, or an empty object.
/// Numbers and booleans are always kept.
pub fn normalize_writable<E: Entity>(entity: &E) -> Result<Map<String, Value>, ApiError> {
    let value =
        serde_json::to_value(entity).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(ApiError::SerializationError(
            "entity did not serialize to a JSON object".to_string(),
        ));
    };

    let mut data = Map::new();
    for &field in E::descriptor().writable_fields {
        if let Some(value) = fields.remove(field) {
            if !is_empty_value(&value) {
                data.insert(field.to_string(), value);
            }
        }
    }
    Ok(data)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Sample {
        #[serde(skip)]
        persisted: bool,
        name: Option<String>,
        tags: Option<Vec<String>>,
        weight: Option<u64>,
        enabled: Option<bool>,
        secret: Option<String>,
    }

    const SAMPLE_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        base_path: "samples",
        writable_fields: &["name", "tags", "weight", "enabled"],
        lookup_field: "name",
    };

    impl Entity for Sample {
        fn descriptor() -> &'static EntityDescriptor {
            &SAMPLE_DESCRIPTOR
        }

        fn lookup_value(&self) -> Option<&str> {
            self.name.as_deref().filter(|v| !v.is_empty())
        }

        fn is_persisted(&self) -> bool {
            self.persisted
        }

        fn set_persisted(&mut self, persisted: bool) {
            self.persisted = persisted;
        }
    }

    #[test]
    fn normalize_keeps_only_set_writable_fields() {
        let sample = Sample {
            name: Some("a".to_string()),
            weight: Some(3),
            ..Sample::default()
        };
        let data = normalize_writable(&sample).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["name"], "a");
        assert_eq!(data["weight"], 3);
    }

    #[test]
    fn normalize_drops_empty_strings_and_collections() {
        let sample = Sample {
            name: Some(String::new()),
            tags: Some(Vec::new()),
            ..Sample::default()
        };
        let data = normalize_writable(&sample).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn normalize_keeps_false_and_zero() {
        let sample = Sample {
            weight: Some(0),
            enabled: Some(false),
            ..Sample::default()
        };
        let data = normalize_writable(&sample).unwrap();
        assert_eq!(data["weight"], 0);
        assert_eq!(data["enabled"], false);
    }

    #[test]
    fn normalize_ignores_non_writable_fields() {
        let sample = Sample {
            secret: Some("hidden".to_string()),
            ..Sample::default()
        };
        let data = normalize_writable(&sample).unwrap();
        assert!(data.get("secret").is_none());
    }

    #[test]
    fn lookup_value_treats_empty_string_as_unset() {
        let sample = Sample {
            name: Some(String::new()),
            ..Sample::default()
        };
        assert!(sample.lookup_value().is_none());
    }
}
