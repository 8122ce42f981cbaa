//! Entity model shared by every HBnB class
//!
//! An [`Entity`] carries the identity every class has (`id`, `created_at`,
//! `updated_at`) plus an open attribute map for everything set through
//! `create` or `update`. Attribute values are a closed [`AttrValue`] union, so
//! the storage layer never has to guess at types beyond string, int and float.

use crate::engine::storage::FileStorage;
use crate::error::{HbnbError, Result};
use crate::types::EntityKind;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Timestamp layout written to the backing store (ISO 8601, microseconds)
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepted on reload; the fractional part is optional
const TIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Tag naming the entity class inside a serialized record
pub const CLASS_TAG: &str = "__class__";

/// Attribute names owned by the entity itself, never stored in the open map
pub const RESERVED_ATTRIBUTES: [&str; 4] = ["id", "created_at", "updated_at", CLASS_TAG];

/// Returns true if `name` is managed by the entity and cannot be set directly
pub fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Convert a stored JSON value, `None` for types the model cannot hold.
    /// Integers that fit in `i64` come back as `Int`, other numbers as `Float`.
    pub fn from_json(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Str(s) => Value::String(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    /// Renders the value the way it appears inside an entity's display string
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on whole floats
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Str(s) => write!(f, "{}", quote(s)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// Single-quote a string for display, switching to double quotes when the
/// text contains a single quote but no double quote.
fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Current local time, truncated to the microsecond precision of [`TIME_FORMAT`]
fn now() -> NaiveDateTime {
    let stamp = Local::now().naive_local();
    let micros = stamp.nanosecond() / 1_000;
    stamp.with_nanosecond(micros * 1_000).unwrap_or(stamp)
}

fn parse_timestamp(record: &Map<String, Value>, field: &str) -> Result<NaiveDateTime> {
    let raw = record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| HbnbError::storage(format!("missing or non-string '{}'", field)))?;
    NaiveDateTime::parse_from_str(raw, TIME_PARSE_FORMAT)
        .map_err(|e| HbnbError::storage(format!("bad '{}' value {:?}: {}", field, raw, e)))
}

/// One persisted domain object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    attributes: BTreeMap<String, AttrValue>,
}

impl Entity {
    /// Create a fresh entity with a new unique id and both timestamps set to now
    pub fn new(kind: EntityKind) -> Self {
        let stamp = now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: stamp,
            updated_at: stamp,
            attributes: BTreeMap::new(),
        }
    }

    /// Rebuild an entity from its serialized record (the reload path).
    ///
    /// The class comes from the `__class__` tag. `id` is taken verbatim and the
    /// timestamps are parsed from [`TIME_FORMAT`] text; every other field
    /// becomes an attribute.
    pub fn from_dict(record: &Map<String, Value>) -> Result<Self> {
        let class_name = record
            .get(CLASS_TAG)
            .and_then(Value::as_str)
            .ok_or_else(|| HbnbError::storage("record has no __class__ tag"))?;
        let kind = EntityKind::lookup(class_name)
            .ok_or_else(|| HbnbError::storage(format!("unknown class {:?}", class_name)))?;
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| HbnbError::storage("missing or non-string 'id'"))?
            .to_string();

        let mut attributes = BTreeMap::new();
        for (name, value) in record {
            if is_reserved(name) {
                continue;
            }
            let value = AttrValue::from_json(value).ok_or_else(|| {
                HbnbError::storage(format!("unsupported value for attribute '{}'", name))
            })?;
            attributes.insert(name.clone(), value);
        }

        Ok(Self {
            kind,
            id,
            created_at: parse_timestamp(record, "created_at")?,
            updated_at: parse_timestamp(record, "updated_at")?,
            attributes,
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Composite storage key, `"ClassName.id"`
    pub fn key(&self) -> String {
        self.kind.key(&self.id)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Set an attribute. Returns false, leaving the entity untouched, when
    /// `name` is reserved.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> bool {
        if is_reserved(name) {
            return false;
        }
        self.attributes.insert(name.to_string(), value.into());
        true
    }

    /// Refresh `updated_at` to the current instant
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Refresh `updated_at`, register this entity with `storage` and persist
    /// the whole object set.
    pub fn save(&mut self, storage: &mut FileStorage) -> Result<()> {
        self.touch();
        storage.new(self.clone());
        storage.save()
    }

    /// Serializable form: every attribute plus the `__class__` tag, with
    /// timestamps rendered as [`TIME_FORMAT`] strings.
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        for (name, value) in &self.attributes {
            dict.insert(name.clone(), value.to_json());
        }
        dict.insert("id".to_string(), Value::String(self.id.clone()));
        dict.insert(
            "created_at".to_string(),
            Value::String(self.created_at.format(TIME_FORMAT).to_string()),
        );
        dict.insert(
            "updated_at".to_string(),
            Value::String(self.updated_at.format(TIME_FORMAT).to_string()),
        );
        dict.insert(CLASS_TAG.to_string(), Value::String(self.kind.to_string()));
        dict
    }
}

impl fmt::Display for Entity {
    /// `[ClassName] (id) {attr: value, ...}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'id': {}, 'created_at': {}, 'updated_at': {}",
            self.kind,
            self.id,
            quote(&self.id),
            quote(&self.created_at.format(TIME_FORMAT).to_string()),
            quote(&self.updated_at.format(TIME_FORMAT).to_string()),
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", {}: {}", quote(name), value)?;
        }
        write!(f, "}}")
    }
}
