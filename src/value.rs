//! Value normalization.
//!
//! Captured values are round-tripped through JSON into a [`serde_json::Value`]
//! before they are stored or compared. The round trip gives every snapshot the
//! same canonical shape no matter which Rust type produced it:
//!
//! - object keys come back sorted, so `HashMap` iteration order never leaks
//!   into a golden file;
//! - integral floats collapse to integers, so `1_u8`, `1_i64` and `1.0_f64`
//!   all normalize to `1`;
//! - anything JSON cannot represent (maps with non-string keys, NaN and
//!   infinite floats, failing `Serialize` impls) is rejected at capture time.
//!
//! # Examples
//!
//! ```rust
//! use snapshotter::value::normalize;
//! let a = normalize(&1.0_f64).unwrap();
//! let b = normalize(&1_u8).unwrap();
//! assert_eq!(a, b);
//! ```

use serde::ser::{self, Error as _, Serialize, Serializer};
use serde_json::{Number, Value};

/// Largest magnitude (exclusive) at which an integral `f64` still fits an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Anything that can be captured in a snapshot.
///
/// Object-safe stand-in for [`Serialize`], so that values of different types
/// can be captured together through `&[&dyn SnapshotValue]`. Implemented for
/// every `T: Serialize`.
pub trait SnapshotValue {
    /// Serializes the value to compact JSON bytes.
    fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>>;

    /// A short description used when the value fails to serialize.
    fn describe(&self) -> String;
}

impl<T: Serialize + ?Sized> SnapshotValue for T {
    fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        // serde_json writes non-finite floats as `null`; refuse them instead.
        self.serialize(FiniteFloats)?;
        serde_json::to_vec(self)
    }

    fn describe(&self) -> String {
        format!("of type `{}`", std::any::type_name::<T>())
    }
}

/// Round-trips `value` through JSON and canonicalizes the result.
///
/// # Examples
///
/// ```rust
/// use snapshotter::value::normalize;
/// use std::collections::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("b", 2.0_f32);
/// map.insert("a", 1.0_f32);
/// let v = normalize(&map).unwrap();
/// assert_eq!(v.to_string(), r#"{"a":1,"b":2}"#);
///
/// let mut bad = HashMap::new();
/// bad.insert((1, 2), "tuple keys are not JSON");
/// assert!(normalize(&bad).is_err());
/// ```
pub fn normalize<T: SnapshotValue + ?Sized>(value: &T) -> serde_json::Result<Value> {
    let bytes = value.to_json_bytes()?;
    let roundtripped: Value = serde_json::from_slice(&bytes)?;
    Ok(canonicalize(roundtripped))
}

/// Collapses integral floats into integers, recursively.
///
/// Applied to captured values by [`normalize`] and to values decoded from
/// golden files, so both sides of a comparison agree on numeric form.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(canonical_number(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect(),
        ),
        other => other,
    }
}

fn canonical_number(n: Number) -> Number {
    if !n.is_f64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND => Number::from(f as i64),
        _ => n,
    }
}

// ============================================================================
// NON-FINITE FLOAT CHECK
// ============================================================================

/// A serializer that produces nothing and fails on the first NaN or
/// infinite float anywhere in the value.
#[derive(Clone, Copy)]
struct FiniteFloats;

fn check_float(f: f64) -> serde_json::Result<()> {
    if f.is_finite() {
        Ok(())
    } else {
        Err(serde_json::Error::custom(format!(
            "non-finite float {f} cannot be represented in JSON"
        )))
    }
}

impl Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_i128(self, _: i128) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_u128(self, _: u128) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_f32(self, v: f32) -> serde_json::Result<()> {
        check_float(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> serde_json::Result<()> {
        check_float(v)
    }
    fn serialize_char(self, _: char) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_none(self) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> serde_json::Result<()> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> serde_json::Result<()> {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> serde_json::Result<Self> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> serde_json::Result<Self> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> serde_json::Result<Self> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> serde_json::Result<Self> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> serde_json::Result<Self> {
        Ok(self)
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> serde_json::Result<Self> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> serde_json::Result<Self> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> serde_json::Result<()> {
        key.serialize(*self)
    }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        value.serialize(*self)
    }
    fn end(self) -> serde_json::Result<()> {
        Ok(())
    }
}

/// Returns the string when `values` holds exactly one value and it is a string.
pub fn single_string(values: &[Value]) -> Option<&str> {
    match values {
        [Value::String(s)] => Some(s.as_str()),
        _ => None,
    }
}
