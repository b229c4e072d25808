//! Dynamic value types carried by entity messages

use crate::identity::{DefId, EntityId};
use crate::resolver::EntityResolver;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag naming which payload a [`Value`] carries
///
/// `Passthrough` is never held by a value. It is only a conversion target
/// meaning "accept whatever arrives".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValueKind {
    Void = 0,
    Bool = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Float = 5,
    String = 6,
    Color32 = 7,
    Vector3 = 8,
    EntityRef = 9,
    ClassRef = 10,
    Passthrough = 11,
}

impl ValueKind {
    /// Every kind, in tag order
    pub const ALL: [ValueKind; 12] = [
        ValueKind::Void,
        ValueKind::Bool,
        ValueKind::Char,
        ValueKind::Short,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::String,
        ValueKind::Color32,
        ValueKind::Vector3,
        ValueKind::EntityRef,
        ValueKind::ClassRef,
        ValueKind::Passthrough,
    ];

    /// Numeric tag used in raw records
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up a kind by its tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Get the type name of this kind
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Bool => "bool",
            ValueKind::Char => "char",
            ValueKind::Short => "short",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Color32 => "color32",
            ValueKind::Vector3 => "vector",
            ValueKind::EntityRef => "entity_ref",
            ValueKind::ClassRef => "class_ref",
            ValueKind::Passthrough => "passthrough",
        }
    }

    /// Size in bytes of the raw payload for fixed-size kinds
    ///
    /// Returns `None` for the string-backed kinds, whose records are sized by
    /// their content.
    pub fn payload_size(self) -> Option<usize> {
        match self {
            ValueKind::Void | ValueKind::Passthrough => Some(0),
            ValueKind::Bool => Some(1),
            ValueKind::Short => Some(2),
            ValueKind::Char | ValueKind::Int | ValueKind::Float | ValueKind::Color32 => Some(4),
            ValueKind::EntityRef => Some(8),
            ValueKind::Vector3 => Some(12),
            ValueKind::String | ValueKind::ClassRef => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A three-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// An 8-bit-per-channel RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color32 {
    fn default() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

/// A single typed payload carried by a message
///
/// Serialized as a [`ValueRecord`]: the kind tag followed by the raw payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "ValueRecord", from = "ValueRecord")]
pub enum Value {
    /// No value
    #[default]
    Void,
    Bool(bool),
    Char(char),
    Short(i16),
    Int(i32),
    Float(f32),
    String(String),
    Color32(Color32),
    Vector3(Vector3),
    /// Weak reference to an entity; `None` is the null reference
    EntityRef(Option<EntityId>),
    /// Reference to an entity class
    ClassRef(DefId),
}

/// A map of string keys to dynamic values
///
/// Uses IndexMap to preserve insertion order (useful for deterministic serialization)
pub type ValueMap = IndexMap<String, Value>;

/// How a value of one kind becomes a value of another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionRule {
    /// Source and target kinds already match
    Identity,
    /// Target is void: drop the payload
    Clear,
    /// Target accepts anything: keep the payload
    Passthrough,
    IntToFloat,
    IntToBool,
    FloatToInt,
    FloatToBool,
    BoolToInt,
    BoolToFloat,
    ParseInt,
    ParseFloat,
    ParseBool,
    ParseVector,
    ParseColor,
    /// Look the string up as an entity name
    ResolveEntity,
    /// Replace an entity reference with the entity's name
    EntityName,
    /// No conversion exists
    Unsupported,
}

/// The closed conversion table
pub fn conversion_rule(from: ValueKind, to: ValueKind) -> ConversionRule {
    use ValueKind as K;

    if from == to {
        return ConversionRule::Identity;
    }
    match (from, to) {
        (_, K::Void) => ConversionRule::Clear,
        (_, K::Passthrough) => ConversionRule::Passthrough,
        (K::Int, K::Float) => ConversionRule::IntToFloat,
        (K::Int, K::Bool) => ConversionRule::IntToBool,
        (K::Float, K::Int) => ConversionRule::FloatToInt,
        (K::Float, K::Bool) => ConversionRule::FloatToBool,
        (K::Bool, K::Int) => ConversionRule::BoolToInt,
        (K::Bool, K::Float) => ConversionRule::BoolToFloat,
        (K::String, K::Int) => ConversionRule::ParseInt,
        (K::String, K::Float) => ConversionRule::ParseFloat,
        (K::String, K::Bool) => ConversionRule::ParseBool,
        (K::String, K::Vector3) => ConversionRule::ParseVector,
        (K::String, K::Color32) => ConversionRule::ParseColor,
        (K::String, K::EntityRef) => ConversionRule::ResolveEntity,
        (K::EntityRef, K::String) => ConversionRule::EntityName,
        _ => ConversionRule::Unsupported,
    }
}

impl Value {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Void => ValueKind::Void,
            Value::Bool(_) => ValueKind::Bool,
            Value::Char(_) => ValueKind::Char,
            Value::Short(_) => ValueKind::Short,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Color32(_) => ValueKind::Color32,
            Value::Vector3(_) => ValueKind::Vector3,
            Value::EntityRef(_) => ValueKind::EntityRef,
            Value::ClassRef(_) => ValueKind::ClassRef,
        }
    }

    /// Check if this value is void
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Short(s) => Some(*s as i32),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            Value::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color32> {
        match self {
            Value::Color32(c) => Some(*c),
            _ => None,
        }
    }

    /// The referenced entity, if this is a non-null entity reference
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Value::EntityRef(id) => *id,
            _ => None,
        }
    }

    /// Convert this value in place
    ///
    /// Returns `true` when the value now has kind `to` (or `to` is
    /// passthrough). On `false` the value is left untouched.
    pub fn convert<R: EntityResolver + ?Sized>(&mut self, to: ValueKind, resolver: &R) -> bool {
        let converted = match conversion_rule(self.kind(), to) {
            ConversionRule::Identity | ConversionRule::Passthrough => return true,
            ConversionRule::Unsupported => return false,
            ConversionRule::Clear => Value::Void,
            ConversionRule::IntToFloat => Value::Float(self.as_int().unwrap_or(0) as f32),
            ConversionRule::IntToBool => Value::Bool(self.as_int().unwrap_or(0) != 0),
            ConversionRule::FloatToInt => Value::Int(self.as_float().unwrap_or(0.0) as i32),
            ConversionRule::FloatToBool => Value::Bool(self.as_float().unwrap_or(0.0) != 0.0),
            ConversionRule::BoolToInt => Value::Int(self.as_bool().unwrap_or(false) as i32),
            ConversionRule::BoolToFloat => {
                Value::Float(if self.as_bool().unwrap_or(false) { 1.0 } else { 0.0 })
            }
            ConversionRule::ParseInt => Value::Int(parse_int_prefix(self.as_str().unwrap_or(""))),
            ConversionRule::ParseFloat => {
                Value::Float(parse_float_prefix(self.as_str().unwrap_or("")))
            }
            ConversionRule::ParseBool => {
                Value::Bool(parse_int_prefix(self.as_str().unwrap_or("")) != 0)
            }
            ConversionRule::ParseVector => {
                Value::Vector3(parse_vector(self.as_str().unwrap_or("")))
            }
            ConversionRule::ParseColor => Value::Color32(parse_color(self.as_str().unwrap_or(""))),
            ConversionRule::ResolveEntity => {
                let name = self.as_str().unwrap_or("").trim();
                if name.is_empty() {
                    Value::EntityRef(None)
                } else {
                    Value::EntityRef(resolver.find_by_name(name, None, None, None))
                }
            }
            ConversionRule::EntityName => {
                let name = self
                    .as_entity()
                    .and_then(|id| resolver.name_of(id))
                    .unwrap_or("");
                Value::String(name.to_string())
            }
        };
        *self = converted;
        true
    }

    /// Debug text, naming referenced entities through `resolver`
    pub fn describe<R: EntityResolver + ?Sized>(&self, resolver: &R) -> String {
        match self {
            Value::EntityRef(Some(id)) => match resolver.name_of(*id) {
                Some(name) if !name.is_empty() => name.to_string(),
                Some(_) => resolver.class_of(*id).unwrap_or("").to_string(),
                None => "null".to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Encode the payload as its raw little-endian record
    pub fn to_raw(&self) -> Vec<u8> {
        match self {
            Value::Void => Vec::new(),
            Value::Bool(b) => vec![*b as u8],
            Value::Char(c) => (*c as u32).to_le_bytes().to_vec(),
            Value::Short(s) => s.to_le_bytes().to_vec(),
            Value::Int(i) => i.to_le_bytes().to_vec(),
            Value::Float(f) => f.to_le_bytes().to_vec(),
            Value::String(s) => s.as_bytes().to_vec(),
            Value::Color32(c) => vec![c.r, c.g, c.b, c.a],
            Value::Vector3(v) => {
                let mut raw = Vec::with_capacity(12);
                raw.extend_from_slice(&v.x.to_le_bytes());
                raw.extend_from_slice(&v.y.to_le_bytes());
                raw.extend_from_slice(&v.z.to_le_bytes());
                raw
            }
            Value::EntityRef(id) => id.map_or(u64::MAX, |id| id.to_bits()).to_le_bytes().to_vec(),
            Value::ClassRef(class) => class.as_str().as_bytes().to_vec(),
        }
    }

    /// Decode a value from a kind tag and raw record
    ///
    /// An unknown tag, or a record too short for its kind, yields `Void`.
    pub fn from_raw(tag: u8, raw: &[u8]) -> Self {
        let Some(kind) = ValueKind::from_tag(tag) else {
            return Value::Void;
        };
        if let Some(size) = kind.payload_size() {
            if raw.len() < size {
                return Value::Void;
            }
        }
        let word = |at: usize| [raw[at], raw[at + 1], raw[at + 2], raw[at + 3]];
        match kind {
            ValueKind::Void | ValueKind::Passthrough => Value::Void,
            ValueKind::Bool => Value::Bool(raw[0] != 0),
            ValueKind::Char => char::from_u32(u32::from_le_bytes(word(0)))
                .map(Value::Char)
                .unwrap_or(Value::Void),
            ValueKind::Short => Value::Short(i16::from_le_bytes([raw[0], raw[1]])),
            ValueKind::Int => Value::Int(i32::from_le_bytes(word(0))),
            ValueKind::Float => Value::Float(f32::from_le_bytes(word(0))),
            ValueKind::String => Value::String(String::from_utf8_lossy(raw).into_owned()),
            ValueKind::Color32 => Value::Color32(Color32::new(raw[0], raw[1], raw[2], raw[3])),
            ValueKind::Vector3 => Value::Vector3(Vector3::new(
                f32::from_le_bytes(word(0)),
                f32::from_le_bytes(word(4)),
                f32::from_le_bytes(word(8)),
            )),
            ValueKind::EntityRef => {
                let mut bits = [0u8; 8];
                bits.copy_from_slice(&raw[..8]);
                let bits = u64::from_le_bytes(bits);
                Value::EntityRef((bits != u64::MAX).then(|| EntityId::from_bits(bits)))
            }
            ValueKind::ClassRef => {
                Value::ClassRef(DefId::new(String::from_utf8_lossy(raw).into_owned()))
            }
        }
    }

    /// Replace this value with one decoded from a raw record
    pub fn set_raw(&mut self, tag: u8, raw: &[u8]) {
        *self = Value::from_raw(tag, raw);
    }
}

/// Persisted form of a [`Value`]: kind tag plus raw payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub kind: u8,
    pub payload: Vec<u8>,
}

impl From<Value> for ValueRecord {
    fn from(value: Value) -> Self {
        Self {
            kind: value.kind().tag(),
            payload: value.to_raw(),
        }
    }
}

impl From<ValueRecord> for Value {
    fn from(record: ValueRecord) -> Self {
        Value::from_raw(record.kind, &record.payload)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => f.write_str(s),
            Value::Color32(c) => write!(f, "{} {} {} {}", c.r, c.g, c.b, c.a),
            Value::Vector3(v) => write!(f, "[{} {} {}]", v.x, v.y, v.z),
            Value::EntityRef(Some(id)) => write!(f, "{}", id),
            Value::EntityRef(None) => f.write_str("null"),
            Value::ClassRef(class) => write!(f, "{}", class),
        }
    }
}

/// `atoi`: optional sign and leading digits, 0 when there are none
fn parse_int_prefix(text: &str) -> i32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    text[..end]
        .parse::<i64>()
        .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        .unwrap_or(0)
}

/// `atof`: the longest leading decimal literal, 0 when there is none
fn parse_float_prefix(text: &str) -> f32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            end = digits_from(exp);
        }
    }
    text[..end].parse::<f32>().unwrap_or(0.0)
}

/// `"[x y z]"` or `"x y z"`, zero vector on failure
fn parse_vector(text: &str) -> Vector3 {
    let text = text.trim();
    let text = text.strip_prefix('[').unwrap_or(text);
    let text = text.strip_suffix(']').unwrap_or(text);

    let parts: Vec<f32> = text
        .split_whitespace()
        .map_while(|part| part.parse::<f32>().ok())
        .take(3)
        .collect();
    match parts.as_slice() {
        [x, y, z] => Vector3::new(*x, *y, *z),
        _ => Vector3::ZERO,
    }
}

/// Up to four integer channels; missing color channels are 0, missing alpha 255
fn parse_color(text: &str) -> Color32 {
    let mut channels = [0u8, 0, 0, 255];
    for (slot, part) in channels.iter_mut().zip(text.split_whitespace()) {
        *slot = parse_int_prefix(part).clamp(0, 255) as u8;
    }
    Color32::new(channels[0], channels[1], channels[2], channels[3])
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<i16> for Value {
    fn from(s: i16) -> Self {
        Value::Short(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Value::Vector3(v)
    }
}

impl From<Color32> for Value {
    fn from(c: Color32) -> Self {
        Value::Color32(c)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::EntityRef(Some(id))
    }
}

impl From<DefId> for Value {
    fn from(class: DefId) -> Self {
        Value::ClassRef(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityStore;

    fn sample(kind: ValueKind, store: &EntityStore, target: EntityId) -> Value {
        match kind {
            ValueKind::Void | ValueKind::Passthrough => Value::Void,
            ValueKind::Bool => Value::Bool(true),
            ValueKind::Char => Value::Char('x'),
            ValueKind::Short => Value::Short(-7),
            ValueKind::Int => Value::Int(42),
            ValueKind::Float => Value::Float(2.5),
            ValueKind::String => Value::String(store.name_of(target).unwrap_or("").into()),
            ValueKind::Color32 => Value::Color32(Color32::new(1, 2, 3, 4)),
            ValueKind::Vector3 => Value::Vector3(Vector3::new(1.0, 2.0, 3.0)),
            ValueKind::EntityRef => Value::EntityRef(Some(target)),
            ValueKind::ClassRef => Value::ClassRef(DefId::new("func_door")),
        }
    }

    #[test]
    fn test_conversion_closure() {
        let mut store = EntityStore::new();
        let target = store.create("relay_1", "logic_relay").id;

        for from in ValueKind::ALL {
            for to in ValueKind::ALL {
                let original = sample(from, &store, target);
                let mut value = original.clone();
                let ok = value.convert(to, &store);

                assert_eq!(
                    ok,
                    conversion_rule(original.kind(), to) != ConversionRule::Unsupported,
                    "{} -> {}",
                    from,
                    to
                );
                if !ok {
                    assert_eq!(value, original, "{} -> {} mutated on failure", from, to);
                } else if to == ValueKind::Passthrough {
                    assert_eq!(value, original);
                } else {
                    assert_eq!(value.kind(), to, "{} -> {}", from, to);
                }
            }
        }
    }

    #[test]
    fn test_convert_same_kind_is_noop() {
        let store = EntityStore::new();
        let mut value = Value::Vector3(Vector3::new(0.5, 1.5, -2.0));
        assert!(value.convert(ValueKind::Vector3, &store));
        assert_eq!(value, Value::Vector3(Vector3::new(0.5, 1.5, -2.0)));
    }

    #[test]
    fn test_numeric_conversions() {
        let store = EntityStore::new();

        let mut value = Value::Float(3.9);
        assert!(value.convert(ValueKind::Int, &store));
        assert_eq!(value, Value::Int(3));

        let mut value = Value::Int(0);
        assert!(value.convert(ValueKind::Bool, &store));
        assert_eq!(value, Value::Bool(false));

        let mut value = Value::Bool(true);
        assert!(value.convert(ValueKind::Float, &store));
        assert_eq!(value, Value::Float(1.0));

        let mut value = Value::Float(-0.25);
        assert!(value.convert(ValueKind::Bool, &store));
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_string_parsing() {
        let store = EntityStore::new();
        let convert = |text: &str, kind| {
            let mut value = Value::from(text);
            assert!(value.convert(kind, &store));
            value
        };

        assert_eq!(convert("  -17abc", ValueKind::Int), Value::Int(-17));
        assert_eq!(convert("", ValueKind::Int), Value::Int(0));
        assert_eq!(convert("nope", ValueKind::Float), Value::Float(0.0));
        assert_eq!(convert("1.5e1x", ValueKind::Float), Value::Float(15.0));
        assert_eq!(convert("2", ValueKind::Bool), Value::Bool(true));
        assert_eq!(convert("true", ValueKind::Bool), Value::Bool(false));
        assert_eq!(
            convert("[1 2.5 -3]", ValueKind::Vector3),
            Value::Vector3(Vector3::new(1.0, 2.5, -3.0))
        );
        assert_eq!(
            convert("4 5 6", ValueKind::Vector3),
            Value::Vector3(Vector3::new(4.0, 5.0, 6.0))
        );
        assert_eq!(convert("1 2", ValueKind::Vector3), Value::Vector3(Vector3::ZERO));
        assert_eq!(
            convert("255 128 0", ValueKind::Color32),
            Value::Color32(Color32::new(255, 128, 0, 255))
        );
        assert_eq!(
            convert("10 20 30 40", ValueKind::Color32),
            Value::Color32(Color32::new(10, 20, 30, 40))
        );
    }

    #[test]
    fn test_entity_conversions() {
        let mut store = EntityStore::new();
        let door = store.create("door_a", "func_door").id;

        let mut value = Value::from("door_a");
        assert!(value.convert(ValueKind::EntityRef, &store));
        assert_eq!(value.as_entity(), Some(door));

        assert!(value.convert(ValueKind::String, &store));
        assert_eq!(value.as_str(), Some("door_a"));

        let mut missing = Value::from("nobody");
        assert!(missing.convert(ValueKind::EntityRef, &store));
        assert_eq!(missing, Value::EntityRef(None));

        store.remove(door);
        let mut stale = Value::from(door);
        assert!(stale.convert(ValueKind::String, &store));
        assert_eq!(stale.as_str(), Some(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Vector3(Vector3::new(1.0, 2.0, 3.5)).to_string(), "[1 2 3.5]");
        assert_eq!(Value::Color32(Color32::new(1, 2, 3, 255)).to_string(), "1 2 3 255");
        assert_eq!(Value::Void.to_string(), "");
        assert_eq!(Value::EntityRef(None).to_string(), "null");
    }

    #[test]
    fn test_raw_records() {
        let values = [
            Value::Bool(true),
            Value::Char('é'),
            Value::Short(-300),
            Value::Int(123456),
            Value::Float(0.75),
            Value::from("hello"),
            Value::Color32(Color32::new(9, 8, 7, 6)),
            Value::Vector3(Vector3::new(1.0, -1.0, 0.5)),
            Value::EntityRef(Some(EntityId::new(3, 2))),
            Value::EntityRef(None),
            Value::ClassRef(DefId::new("light")),
        ];
        for value in values {
            let restored = Value::from_raw(value.kind().tag(), &value.to_raw());
            assert_eq!(restored, value);
        }
    }

    #[test]
    fn test_set_raw_rejects_bad_records() {
        let mut value = Value::Int(5);
        value.set_raw(200, &[1, 2, 3, 4]);
        assert!(value.is_void());

        let mut value = Value::Int(5);
        value.set_raw(ValueKind::Vector3.tag(), &[0; 4]);
        assert!(value.is_void());

        let mut value = Value::Void;
        value.set_raw(ValueKind::Passthrough.tag(), &[]);
        assert!(value.is_void());
    }

    #[test]
    fn test_ron_uses_record_form() {
        let value = Value::Short(2);
        let text = ron::to_string(&value).unwrap();
        let back: Value = ron::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
