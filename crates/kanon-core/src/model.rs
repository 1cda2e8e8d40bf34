//! Tolerant model binding.
//!
//! A [`ModelSchema`] names a record and declares its fields in order. Binding
//! JSON to a schema never fails on shape mismatches:
//!
//! - fields in the JSON but not in the schema are dropped
//! - fields in the schema but not in the JSON bind absent
//! - `null` and type-mismatched values bind absent
//!
//! Absence only becomes an error when an assertion needs the value. The only
//! failure of binding itself is malformed JSON ([`ParseError`]).
//!
//! For statically typed models, [`bind_as`] deserializes through serde; give
//! such models `Option<_>` fields to get the same tolerance.
//!
//! # Example
//!
//! ```
//! use kanon_core::{FieldType, ModelSchema};
//! use serde_json::json;
//!
//! let schema = ModelSchema::builder("UserResponse")
//!     .field("name", FieldType::String)
//!     .field("job", FieldType::String)
//!     .field("id", FieldType::String)
//!     .build();
//!
//! let model = schema
//!     .bind(&json!({"name": "darya", "job": "Middle QA", "extra": true}))
//!     .unwrap();
//!
//! assert_eq!(model.get_str("name"), Some("darya"));
//! assert!(model.get("id").is_none());
//! assert_eq!(model.serialize(), r#"{"name":"darya","job":"Middle QA"}"#);
//! ```

use crate::error::{value_type_name, ModelError, ParseError};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Semantic type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// Any non-null JSON value.
    Any,
}

impl FieldType {
    /// Returns true if `value` fits this type.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => !value.is_null(),
        }
    }

    /// Returns the lowercase type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDef {
    /// JSON key.
    pub name: String,
    /// Semantic type.
    pub field_type: FieldType,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SchemaInner {
    name: String,
    fields: Vec<FieldDef>,
}

/// A named record type with an ordered, fixed set of fields.
///
/// Cloning is cheap; the field list is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelSchema {
    inner: Arc<SchemaInner>,
}

impl ModelSchema {
    /// Creates a schema builder.
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder::new(name)
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.inner.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.inner.fields.iter().find(|f| f.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.inner.fields.iter().position(|f| f.name == name)
    }

    /// Creates an instance with every field absent.
    #[must_use]
    pub fn instance(&self) -> Model {
        Model {
            schema: self.clone(),
            values: vec![None; self.inner.fields.len()],
        }
    }

    /// Binds a parsed JSON value to this schema.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `json` is not an object.
    pub fn bind(&self, json: &Value) -> Result<Model, ParseError> {
        let object = json.as_object().ok_or_else(|| {
            ParseError::shape(
                format!(
                    "expected a JSON object for model '{}', found {}",
                    self.name(),
                    value_type_name(json)
                ),
                json.to_string(),
            )
        })?;

        let values = self
            .inner
            .fields
            .iter()
            .map(|field| match object.get(&field.name) {
                None | Some(Value::Null) => None,
                Some(value) if field.field_type.accepts(value) => Some(value.clone()),
                Some(value) => {
                    debug!(
                        model = %self.name(),
                        field = %field.name,
                        expected = field.field_type.name(),
                        actual = value_type_name(value),
                        "type mismatch, binding field as absent"
                    );
                    None
                }
            })
            .collect();

        Ok(Model {
            schema: self.clone(),
            values,
        })
    }

    /// Parses JSON text and binds it to this schema.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `raw` is not well-formed JSON or not an object.
    pub fn bind_str(&self, raw: &str) -> Result<Model, ParseError> {
        let json: Value =
            serde_json::from_str(raw).map_err(|e| ParseError::from_json(&e, raw))?;
        self.bind(&json)
    }
}

/// Builder for [`ModelSchema`].
#[must_use]
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl ModelSchemaBuilder {
    /// Creates a builder for a schema called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declares a field. Redeclaring a name replaces its type in place.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.field_type = field_type,
            None => self.fields.push(FieldDef { name, field_type }),
        }
        self
    }

    /// Builds the schema.
    pub fn build(self) -> ModelSchema {
        ModelSchema {
            inner: Arc::new(SchemaInner {
                name: self.name,
                fields: self.fields,
            }),
        }
    }
}

/// An instance of a [`ModelSchema`]; every field is present or absent.
#[derive(Clone, PartialEq)]
pub struct Model {
    schema: ModelSchema,
    values: Vec<Option<Value>>,
}

impl Model {
    /// Returns the schema of this instance.
    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Returns a field value, or `None` if absent or undeclared.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .position(field)
            .and_then(|idx| self.values[idx].as_ref())
    }

    /// Returns a string field value.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns true if the field is declared and present.
    #[must_use]
    pub fn is_present(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Returns true if every declared field is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Sets a field. Setting `null` makes the field absent.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] if the schema has no such field and
    /// [`ModelError::TypeMismatch`] if the value does not fit its type.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let idx = self
            .schema
            .position(field)
            .ok_or_else(|| ModelError::UnknownField {
                model: self.schema.name().to_string(),
                field: field.to_string(),
            })?;

        let value = value.into();
        if value.is_null() {
            self.values[idx] = None;
            return Ok(());
        }

        let field_type = self.schema.fields()[idx].field_type;
        if !field_type.accepts(&value) {
            return Err(ModelError::TypeMismatch {
                model: self.schema.name().to_string(),
                field: field.to_string(),
                expected: field_type.name(),
                actual: value_type_name(&value),
            });
        }

        self.values[idx] = Some(value);
        Ok(())
    }

    /// Chaining form of [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self, ModelError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Makes a field absent. Undeclared names are ignored.
    pub fn clear(&mut self, field: &str) {
        if let Some(idx) = self.schema.position(field) {
            self.values[idx] = None;
        }
    }

    /// Iterates over present fields in declaration order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .filter_map(|(def, value)| value.as_ref().map(|v| (def.name.as_str(), v)))
    }

    /// Converts to a JSON object, omitting absent fields.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.present_fields()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }

    /// Serializes to compact JSON text in schema field order, omitting absent
    /// fields.
    #[must_use]
    pub fn serialize(&self) -> String {
        // string keys and JSON values never fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<_> = self.present_fields().collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (name, value) in present {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("schema", &self.schema.name())
            .field("body", &self.serialize())
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.schema.name(), self.serialize())
    }
}

/// Binds a parsed JSON value to a schema. See [`ModelSchema::bind`].
///
/// # Errors
///
/// Returns [`ParseError`] if `json` is not an object.
pub fn bind(json: &Value, schema: &ModelSchema) -> Result<Model, ParseError> {
    schema.bind(json)
}

/// Serializes a model to compact JSON text. See [`Model::serialize`].
#[must_use]
pub fn serialize(model: &Model) -> String {
    model.serialize()
}

/// Deserializes a JSON value into a typed model.
///
/// Unknown fields are ignored unless the type opts into
/// `#[serde(deny_unknown_fields)]`; `Option` fields bind `None` when missing.
///
/// # Errors
///
/// Returns [`ParseError`] if the value does not fit `T`.
pub fn bind_as<T: DeserializeOwned>(json: &Value) -> Result<T, ParseError> {
    T::deserialize(json).map_err(|e| ParseError::shape(e.to_string(), json.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> ModelSchema {
        ModelSchema::builder("UserResponse")
            .field("name", FieldType::String)
            .field("job", FieldType::String)
            .field("id", FieldType::String)
            .field("createdAt", FieldType::String)
            .build()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct LoginResponse {
        token: Option<String>,
        error: Option<String>,
    }

    #[test]
    fn test_bind_ignores_unknown_fields() {
        let model = user_schema()
            .bind(&json!({"name": "morpheus", "job": "leader", "salary": 10}))
            .unwrap();
        assert_eq!(model.get_str("name"), Some("morpheus"));
        assert!(model.get("salary").is_none());
        assert!(!model.to_value().as_object().unwrap().contains_key("salary"));
    }

    #[test]
    fn test_bind_missing_and_null_fields_are_absent() {
        let model = user_schema()
            .bind(&json!({"name": "morpheus", "id": null}))
            .unwrap();
        assert!(model.is_present("name"));
        assert!(!model.is_present("id"));
        assert!(!model.is_present("job"));
        assert!(!model.is_complete());
    }

    #[test]
    fn test_bind_type_mismatch_is_absent() {
        let model = user_schema().bind(&json!({"id": 42})).unwrap();
        assert!(!model.is_present("id"));
    }

    #[test]
    fn test_bind_str_malformed() {
        let err = user_schema().bind_str("{name: 'alex'}").unwrap_err();
        assert_eq!(err.raw, "{name: 'alex'}");
        assert_eq!(err.line, 1);
        assert!(err.offset.is_some());
    }

    #[test]
    fn test_bind_non_object_is_parse_error() {
        let err = user_schema().bind(&json!([1, 2])).unwrap_err();
        assert!(err.message.contains("found array"));
    }

    #[test]
    fn test_serialize_schema_order_and_omits_absent() {
        let model = user_schema()
            .instance()
            .with("job", "zion resident")
            .unwrap()
            .with("name", "morpheus")
            .unwrap();
        assert_eq!(
            model.serialize(),
            r#"{"name":"morpheus","job":"zion resident"}"#
        );
        assert_eq!(serde_json::to_string(&model).unwrap(), model.serialize());
    }

    #[test]
    fn test_serialize_escapes_strings() {
        let model = user_schema().instance().with("name", "say \"hi\"").unwrap();
        assert_eq!(model.serialize(), r#"{"name":"say \"hi\""}"#);
    }

    #[test]
    fn test_round_trip_complete_model() {
        let schema = user_schema();
        let model = schema
            .bind(&json!({
                "name": "morpheus",
                "job": "leader",
                "id": "42",
                "createdAt": "2024-01-01T00:00:00.000Z"
            }))
            .unwrap();
        assert!(model.is_complete());
        assert_eq!(schema.bind_str(&model.serialize()).unwrap(), model);
    }

    #[test]
    fn test_set_unknown_field() {
        let err = user_schema().instance().with("salary", 10).unwrap_err();
        assert!(matches!(err, ModelError::UnknownField { .. }));
    }

    #[test]
    fn test_set_type_mismatch() {
        let err = user_schema().instance().with("name", 10).unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { expected: "string", .. }));
    }

    #[test]
    fn test_set_null_clears() {
        let mut model = user_schema().instance().with("name", "neo").unwrap();
        model.set("name", Value::Null).unwrap();
        assert!(!model.is_present("name"));
    }

    #[test]
    fn test_redeclared_field_keeps_position() {
        let schema = ModelSchema::builder("M")
            .field("a", FieldType::String)
            .field("b", FieldType::String)
            .field("a", FieldType::Integer)
            .build();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].field_type, FieldType::Integer);
    }

    #[test]
    fn test_bind_as_typed_model() {
        let login: LoginResponse =
            bind_as(&json!({"token": "QpwL5tke4Pnpja7X4", "unused": 1})).unwrap();
        assert_eq!(login.token.as_deref(), Some("QpwL5tke4Pnpja7X4"));
        assert_eq!(login.error, None);
    }

    #[test]
    fn test_bind_as_wrong_shape() {
        let err = bind_as::<LoginResponse>(&json!({"token": 5})).unwrap_err();
        assert!(err.raw.contains("\"token\""));
    }
}
