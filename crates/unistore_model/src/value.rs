//! Dynamic value type shared by the query model and the backends.
//!
//! Every value a stored entity can carry is one variant of [`Value`]. The
//! translators match exhaustively over these variants, so adding a variant
//! forces every backend dialect to handle it at compile time.

use crate::error::{ModelError, ModelResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Reserved token standing in for an explicit null in string-typed storage
/// layouts (the file and table backends). Used identically on the write and
/// read paths so null comparisons survive a round trip.
pub const NULL_SENTINEL: &str = "__unistore_null__";

/// Format used for [`Value::DateTime`] string encoding (ISO-8601, nanosecond
/// precision, no offset).
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

/// The declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Double,
    /// Raw bytes.
    Bytes,
    /// UUID identifier.
    Guid,
    /// Date-time without offset.
    DateTime,
    /// Date-time with offset.
    DateTimeOffset,
    /// Complex object, held in serialized JSON form.
    Complex,
}

impl FieldKind {
    /// Returns the zero value for this kind.
    ///
    /// The projector fills unselected fields with these so consumers always
    /// see a fully shaped record.
    #[must_use]
    pub fn zero_value(self) -> Value {
        match self {
            FieldKind::Text => Value::Text(String::new()),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int => Value::Int(0),
            FieldKind::Long => Value::Long(0),
            FieldKind::Double => Value::Double(0.0),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Guid => Value::Guid(Uuid::nil()),
            FieldKind::DateTime => Value::DateTime(NaiveDateTime::MIN),
            FieldKind::DateTimeOffset => {
                Value::DateTimeOffset(DateTime::<Utc>::MIN_UTC.fixed_offset())
            }
            FieldKind::Complex => Value::Null,
        }
    }

    /// True when this kind stores a numeric value.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Int | FieldKind::Long | FieldKind::Double)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Long => "long",
            FieldKind::Double => "double",
            FieldKind::Bytes => "bytes",
            FieldKind::Guid => "guid",
            FieldKind::DateTime => "datetime",
            FieldKind::DateTimeOffset => "datetimeoffset",
            FieldKind::Complex => "complex",
        };
        f.write_str(name)
    }
}

/// A dynamic value.
///
/// This is the backend-neutral form of every stored property and every
/// where-condition literal. `Complex` carries the serialized JSON string of
/// an arbitrary object; complex values compare by that string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UUID identifier.
    Guid(Uuid),
    /// Date-time without offset.
    DateTime(NaiveDateTime),
    /// Date-time with offset.
    DateTimeOffset(DateTime<FixedOffset>),
    /// Complex object in serialized JSON form.
    Complex(String),
}

impl Value {
    /// Returns the kind of this value, or `None` for null (null carries no
    /// kind of its own; the schema decides).
    #[must_use]
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(FieldKind::Bool),
            Value::Int(_) => Some(FieldKind::Int),
            Value::Long(_) => Some(FieldKind::Long),
            Value::Double(_) => Some(FieldKind::Double),
            Value::Text(_) => Some(FieldKind::Text),
            Value::Bytes(_) => Some(FieldKind::Bytes),
            Value::Guid(_) => Some(FieldKind::Guid),
            Value::DateTime(_) => Some(FieldKind::DateTime),
            Value::DateTimeOffset(_) => Some(FieldKind::DateTimeOffset),
            Value::Complex(_) => Some(FieldKind::Complex),
        }
    }

    /// True for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text content if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content widened to `i64` for `Int`/`Long`.
    #[must_use]
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Equality with the query engine's semantics.
    ///
    /// Null equals only null. Numeric values compare after widening
    /// (Int → Long → Double). Complex values compare by serialized string.
    /// Values of unrelated kinds are never equal.
    #[must_use]
    pub fn query_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            _ => self.query_cmp(other) == Some(Ordering::Equal),
        }
    }

    /// Ordering with the query engine's semantics.
    ///
    /// Returns `None` when either side is null or the kinds are not
    /// comparable; range operators never match in that case.
    #[must_use]
    pub fn query_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Guid(a), Value::Guid(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => Some(a.cmp(b)),
            (Value::Complex(a), Value::Complex(b)) => Some(a.cmp(b)),
            _ => match (self.as_integral(), other.as_integral()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => {
                    let a = self.as_f64()?;
                    let b = other.as_f64()?;
                    Some(a.total_cmp(&b))
                }
            },
        }
    }

    /// Total order used for result sorting: null sorts before every non-null
    /// value; values of unrelated kinds order by kind tag so the sort stays
    /// deterministic.
    #[must_use]
    pub fn cmp_sort(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        if let Some(ord) = self.query_cmp(other) {
            return ord;
        }
        self.kind_tag().cmp(&other.kind_tag())
    }

    fn kind_tag(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Long(_) => 3,
            Value::Double(_) => 4,
            Value::Text(_) => 5,
            Value::Bytes(_) => 6,
            Value::Guid(_) => 7,
            Value::DateTime(_) => 8,
            Value::DateTimeOffset(_) => 9,
            Value::Complex(_) => 10,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(f64::from(*n)),
            Value::Long(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Encodes this value into the flat string form used by string-typed
    /// storage layouts (one JSON file per entity; table rows).
    ///
    /// Null encodes as [`NULL_SENTINEL`]. Datetimes encode with round-trip
    /// precision, bytes as base64.
    #[must_use]
    pub fn encode_field(&self) -> String {
        match self {
            Value::Null => NULL_SENTINEL.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Double(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => BASE64.encode(b),
            Value::Guid(g) => g.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::DateTimeOffset(dto) => dto.to_rfc3339_opts(SecondsFormat::Nanos, false),
            Value::Complex(s) => s.clone(),
        }
    }

    /// Decodes a flat string back into a value of the declared kind.
    ///
    /// [`NULL_SENTINEL`] decodes to null for every kind. A `Complex` string
    /// must be valid JSON; the caller decides whether a decode failure is
    /// fatal (the backends recover it as null).
    pub fn decode_field(raw: &str, kind: FieldKind) -> ModelResult<Value> {
        if raw == NULL_SENTINEL {
            return Ok(Value::Null);
        }
        match kind {
            FieldKind::Text => Ok(Value::Text(raw.to_string())),
            FieldKind::Bool => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|e| ModelError::decode("bool", e.to_string())),
            FieldKind::Int => raw
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|e| ModelError::decode("int", e.to_string())),
            FieldKind::Long => raw
                .parse::<i64>()
                .map(Value::Long)
                .map_err(|e| ModelError::decode("long", e.to_string())),
            FieldKind::Double => raw
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|e| ModelError::decode("double", e.to_string())),
            FieldKind::Bytes => BASE64
                .decode(raw)
                .map(Value::Bytes)
                .map_err(|e| ModelError::decode("bytes", e.to_string())),
            FieldKind::Guid => raw
                .parse::<Uuid>()
                .map(Value::Guid)
                .map_err(|e| ModelError::decode("guid", e.to_string())),
            FieldKind::DateTime => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(Value::DateTime)
                .map_err(|e| ModelError::decode("datetime", e.to_string())),
            FieldKind::DateTimeOffset => DateTime::parse_from_rfc3339(raw)
                .map(Value::DateTimeOffset)
                .map_err(|e| ModelError::decode("datetimeoffset", e.to_string())),
            FieldKind::Complex => {
                serde_json::from_str::<serde_json::Value>(raw)
                    .map_err(|e| ModelError::decode("complex", e.to_string()))?;
                Ok(Value::Complex(raw.to_string()))
            }
        }
    }

    /// Rewrites a `Complex` value's JSON into its canonical text form; every
    /// other variant passes through unchanged.
    ///
    /// Complex values compare and store by their serialized string, so the
    /// string must be identical no matter which storage layout a value
    /// crossed. Layouts that embed the JSON structurally (the document
    /// emulator) re-serialize on read, which strips insignificant whitespace
    /// and sorts object keys; canonicalizing on the way in makes that
    /// round trip the identity. A string that is not valid JSON is left
    /// unchanged, kind validation rejects it separately.
    #[must_use]
    pub fn canonical(self) -> Value {
        match self {
            Value::Complex(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(json) => match serde_json::to_string(&json) {
                    Ok(text) => Value::Complex(text),
                    Err(_) => Value::Complex(raw),
                },
                Err(_) => Value::Complex(raw),
            },
            other => other,
        }
    }

    /// True when this value can be stored in a field of the given kind.
    ///
    /// Null is storable in any kind; numeric literals may be narrower than
    /// the declared numeric kind (an `Int` literal against a `Long` field).
    #[must_use]
    pub fn fits_kind(&self, kind: FieldKind) -> bool {
        match self.kind() {
            None => true,
            Some(own) if own == kind => true,
            Some(own) => own.is_numeric() && kind.is_numeric(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dto: DateTime<FixedOffset>) -> Self {
        Value::DateTimeOffset(dto)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dto: DateTime<Utc>) -> Self {
        Value::DateTimeOffset(dto.fixed_offset())
    }
}
