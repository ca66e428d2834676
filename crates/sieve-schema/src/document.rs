//! # Document Model
//!
//! The subset of an OpenAPI 3.0 / 3.1 document that the compiler reads,
//! deserialized with serde from JSON or YAML. References must already be
//! resolved; a remaining `$ref` is reported at compile time.
//!
//! Maps whose order is observable (paths, responses, content, properties)
//! use [`OrderedMap`], which keeps document order. Unknown fields such as
//! `description` or `example` are ignored.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::error::DocumentError;

/// String-keyed map that keeps entries in document order.
///
/// Keys may be written as YAML integers (`200:` in a responses map); they
/// are read back as their decimal text.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T>(Vec<(String, T)>);

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> OrderedMap<T> {
    pub fn new(entries: Vec<(String, T)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = MapKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer map key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<MapKey, E> {
                Ok(MapKey(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = OrderedMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((MapKey(key), value)) = access.next_entry::<MapKey, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Read a scalar as text, so an unquoted YAML `openapi: 3.1` still parses.
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    MapKey::deserialize(deserializer).map(|MapKey(text)| text)
}

/// Root of an OpenAPI document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Document {
    /// Declared OpenAPI version, e.g. `3.0.3` or `3.1.0`.
    #[serde(default, deserialize_with = "scalar_text")]
    pub openapi: String,
    #[serde(default)]
    pub paths: OrderedMap<PathItem>,
}

impl Document {
    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load a document, choosing the format from the file extension
    /// (`.yaml`/`.yml` for YAML, anything else as JSON).
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let parse_error = |reason: String| DocumentError::Parse {
            path: path.display().to_string(),
            reason,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content).map_err(|e| parse_error(e.to_string())),
            _ => Self::from_json_str(&content).map_err(|e| parse_error(e.to_string())),
        }
    }

    pub fn path_item(&self, template: &str) -> Option<&PathItem> {
        self.paths.get(template)
    }
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    /// All methods in the order a path item lists them.
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
        Method::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| format!("unknown HTTP method: {s}"))
    }
}

/// Operations and shared parameters of one path template.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Put => self.put.as_ref(),
            Method::Post => self.post.as_ref(),
            Method::Delete => self.delete.as_ref(),
            Method::Options => self.options.as_ref(),
            Method::Head => self.head.as_ref(),
            Method::Patch => self.patch.as_ref(),
            Method::Trace => self.trace.as_ref(),
        }
    }

    /// Declared operations in method order.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        Method::ALL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: OrderedMap<Response>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// In request-value order.
    pub const ALL: [ParameterLocation; 4] = [
        ParameterLocation::Path,
        ParameterLocation::Query,
        ParameterLocation::Header,
        ParameterLocation::Cookie,
    ];

    /// Key of this location in the request value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }

    /// Serialization style used when a parameter declares none.
    pub fn default_style(&self) -> ParameterStyle {
        match self {
            Self::Path | Self::Header => ParameterStyle::Simple,
            Self::Query | Self::Cookie => ParameterStyle::Form,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Label => "label",
            Self::Form => "form",
            Self::Simple => "simple",
            Self::SpaceDelimited => "spaceDelimited",
            Self::PipeDelimited => "pipeDelimited",
            Self::DeepObject => "deepObject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    pub style: Option<ParameterStyle>,
    pub explode: Option<bool>,
    pub schema: Option<Schema>,
}

impl Parameter {
    pub fn style(&self) -> ParameterStyle {
        self.style.unwrap_or_else(|| self.location.default_style())
    }

    /// `explode` defaults to true for `form` and false otherwise.
    pub fn explode(&self) -> bool {
        self.explode.unwrap_or(self.style() == ParameterStyle::Form)
    }

    /// Path parameters are always required.
    pub fn is_required(&self) -> bool {
        self.required || self.location == ParameterLocation::Path
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: OrderedMap<MediaType>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Response {
    pub content: Option<OrderedMap<MediaType>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// Primitive JSON Schema type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `type` is a single name (3.0) or a list of names (3.1).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    One(Type),
    Many(Vec<Type>),
}

/// `exclusiveMinimum` / `exclusiveMaximum`: a flag modifying
/// `minimum`/`maximum` (3.0) or a bound of its own (3.1).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Exclusive {
    Flag(bool),
    Limit(Number),
}

/// `additionalProperties`: a permission flag or a schema for extra keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// One schema node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub types: Option<TypeSet>,
    #[serde(default)]
    pub nullable: bool,
    pub format: Option<String>,
    #[serde(rename = "enum")]
    pub enumeration: Option<Vec<Value>>,

    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Exclusive>,
    pub exclusive_maximum: Option<Exclusive>,
    pub multiple_of: Option<Number>,

    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,

    pub items: Option<Box<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    #[serde(default)]
    pub unique_items: bool,

    #[serde(default)]
    pub properties: OrderedMap<Schema>,
    #[serde(default)]
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,

    #[serde(default)]
    pub all_of: Vec<Schema>,
    #[serde(default)]
    pub any_of: Vec<Schema>,
    #[serde(default)]
    pub one_of: Vec<Schema>,
    pub not: Option<Box<Schema>>,

    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

impl Schema {
    /// Schema declaring a single type.
    pub fn typed(ty: Type) -> Self {
        Self {
            types: Some(TypeSet::One(ty)),
            ..Self::default()
        }
    }

    /// Every declared type name, `null` included.
    pub fn declared_types(&self) -> Vec<Type> {
        match &self.types {
            None => Vec::new(),
            Some(TypeSet::One(ty)) => vec![*ty],
            Some(TypeSet::Many(types)) => types.clone(),
        }
    }

    /// Declared types other than `null`, without duplicates.
    pub fn value_types(&self) -> Vec<Type> {
        let mut types = Vec::new();
        for ty in self.declared_types() {
            if ty != Type::Null && !types.contains(&ty) {
                types.push(ty);
            }
        }
        types
    }

    pub fn declares(&self, ty: Type) -> bool {
        self.declared_types().contains(&ty)
    }

    /// `nullable: true` (3.0) or `null` among the types (3.1).
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.declares(Type::Null)
    }

    /// Rendering of the declared types for messages.
    pub fn describe_types(&self) -> String {
        let types = self.declared_types();
        if types.is_empty() {
            return "no type".to_string();
        }
        types
            .iter()
            .map(Type::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Escape one JSON pointer token (`~` and `/`).
pub fn pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE: &str = r#"
openapi: 3.0.3
paths:
  /pets:
    parameters:
      - name: X-Trace
        in: header
        schema: { type: string }
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema: { type: integer, format: int32, maximum: 100 }
      responses:
        200:
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items: { type: string }
        default:
          description: Error
"#;

    #[test]
    fn test_yaml_document_keeps_order_and_integer_keys() {
        let doc = Document::from_yaml_str(PETSTORE).unwrap();
        let item = doc.path_item("/pets").unwrap();
        let op = item.operation(Method::Get).unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("listPets"));
        assert_eq!(op.responses.keys().collect::<Vec<_>>(), vec!["200", "default"]);
        assert!(op.responses.get("default").unwrap().content.is_none());
        assert_eq!(item.parameters[0].location, ParameterLocation::Header);
    }

    #[test]
    fn test_exclusive_bounds_in_both_versions() {
        let v30: Schema =
            serde_json::from_str(r#"{"type":"number","minimum":0,"exclusiveMinimum":true}"#).unwrap();
        assert_eq!(v30.exclusive_minimum, Some(Exclusive::Flag(true)));

        let v31: Schema = serde_json::from_str(r#"{"type":"number","exclusiveMinimum":0}"#).unwrap();
        assert!(matches!(v31.exclusive_minimum, Some(Exclusive::Limit(_))));
    }

    #[test]
    fn test_type_lists_and_nullability() {
        let schema: Schema = serde_json::from_str(r#"{"type":["string","null"]}"#).unwrap();
        assert_eq!(schema.value_types(), vec![Type::String]);
        assert!(schema.is_nullable());
        assert_eq!(schema.describe_types(), "string | null");

        let schema: Schema = serde_json::from_str(r#"{"type":"string","nullable":true}"#).unwrap();
        assert!(schema.is_nullable());
    }

    #[test]
    fn test_additional_properties_forms() {
        let schema: Schema =
            serde_json::from_str(r#"{"type":"object","additionalProperties":false}"#).unwrap();
        assert_eq!(schema.additional_properties, Some(AdditionalProperties::Allowed(false)));

        let schema: Schema =
            serde_json::from_str(r#"{"type":"object","additionalProperties":{"type":"integer"}}"#).unwrap();
        assert!(matches!(schema.additional_properties, Some(AdditionalProperties::Schema(_))));
    }

    #[test]
    fn test_parameter_defaults() {
        let param: Parameter =
            serde_json::from_str(r#"{"name":"id","in":"path","schema":{"type":"integer"}}"#).unwrap();
        assert_eq!(param.style(), ParameterStyle::Simple);
        assert!(!param.explode());
        assert!(param.is_required());

        let param: Parameter = serde_json::from_str(r#"{"name":"tags","in":"query"}"#).unwrap();
        assert_eq!(param.style(), ParameterStyle::Form);
        assert!(param.explode());
        assert!(!param.is_required());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert!("fetch".parse::<Method>().is_err());
    }

    #[test]
    fn test_pointer_token_escaping() {
        assert_eq!(pointer_token("/pets/{id}"), "~1pets~1{id}");
        assert_eq!(pointer_token("a~b"), "a~0b");
    }
}
