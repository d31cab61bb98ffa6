//! The host data model rendered by the Evoke Templating Engine.
// Copyright (C) 2024  Frankie Baffa
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

mod ser;

pub use ser::to_value;

use {
    serde::ser::{
        Serialize,
        SerializeMap,
        SerializeSeq,
        Serializer,
    },
    serde_json::Value as JsonValue,
    std::{
        collections::BTreeMap,
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
    },
};

/// How a value can be stepped into by a selector or iterated by a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub
enum Shape {
    Mapping,
    Record,
    Sequence,
    Scalar,
}

impl Display for Shape {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_str(match self {
            Self::Mapping => "mapping",
            Self::Record => "record",
            Self::Sequence => "sequence",
            Self::Scalar => "scalar",
        })
    }
}

/// A named value with ordered, named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub
struct Record {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub
    fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field insertion.
    pub
    fn field<S, V>(mut self, name: S, value: V) -> Self
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.push(name, value);
        self
    }

    pub
    fn push<S, V>(&mut self, name: S, value: V)
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.fields.push((name.into(), value.into()));
    }

    pub
    fn name(&self) -> &str {
        &self.name
    }

    pub
    fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub
    fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub
    fn len(&self) -> usize {
        self.fields.len()
    }

    pub
    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A dynamically shaped host value.
#[derive(Debug, Clone, PartialEq, Default)]
pub
enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Record(Record),
}

impl Value {
    pub
    fn shape(&self) -> Shape {
        match self {
            Self::Map(_) => Shape::Mapping,
            Self::Record(_) => Shape::Record,
            Self::Seq(_) => Shape::Sequence,
            _ => Shape::Scalar,
        }
    }

    /// Step into a mapping by key or a record by field name.
    ///
    /// `Ok(None)` means the value is accessible but has no such key; an
    /// `Err` carries the shape that does not support keyed access.
    pub
    fn access(&self, key: &str) -> Result<Option<&Value>, Shape> {
        match self {
            Self::Map(map) => Ok(map.get(key)),
            Self::Record(rec) => Ok(rec.get(key)),
            other => Err(other.shape()),
        }
    }

    /// The boolean interpretation used by conditionals.
    ///
    /// Empty strings and collections are false, numbers are false at zero,
    /// nil is false and records are always true.
    pub
    fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Seq(seq) => !seq.is_empty(),
            Self::Map(map) => !map.is_empty(),
            Self::Record(_) => true,
        }
    }

    pub
    fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub
    fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub
    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number of items in a string, sequence, mapping or record.
    pub
    fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::Seq(seq) => Some(seq.len()),
            Self::Map(map) => Some(map.len()),
            Self::Record(rec) => Some(rec.len()),
            _ => None,
        }
    }
}

/// Floats print in full unless their magnitude is at least `1e21` or below
/// `1e-4`, where they switch to exponent form (`1e21`, `2.5e-7`).
fn write_float(fmtr: &mut Formatter<'_>, f: f64) -> FmtResult {
    let abs = f.abs();
    if abs.is_finite() && abs != 0.0 && !(1e-4..1e21).contains(&abs) {
        fmtr.write_fmt(format_args!("{:e}", f))
    }
    else {
        fmtr.write_fmt(format_args!("{}", f))
    }
}

impl Display for Value {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Nil => Ok(()),
            Self::Bool(b) => fmtr.write_fmt(format_args!("{}", b)),
            Self::Int(i) => fmtr.write_fmt(format_args!("{}", i)),
            Self::Float(f) => write_float(fmtr, *f),
            Self::Str(s) => fmtr.write_str(s),
            composite => {
                let json = serde_json::to_string(composite).map_err(|_| std::fmt::Error)?;
                fmtr.write_str(&json)
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Seq(seq) => {
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for item in seq {
                    out.serialize_element(item)?;
                }
                out.end()
            },
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            },
            Self::Record(rec) => {
                let mut out = serializer.serialize_map(Some(rec.len()))?;
                for (k, v) in rec.fields() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            },
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Nil,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Self::Str(s),
            JsonValue::Array(arr) => Self::Seq(arr.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => Self::Map(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map(Self::Int).unwrap_or(Self::Float(i as f64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Record> for Value {
    fn from(rec: Record) -> Self {
        Self::Record(rec)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(seq: Vec<V>) -> Self {
        Self::Seq(seq.into_iter().map(Into::into).collect())
    }
}

impl<K, V> From<BTreeMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(opt: Option<V>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Nil)
    }
}
