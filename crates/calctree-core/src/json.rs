//! JSON encoding for arbitrarily deep calculation trees.
//!
//! Every tree level nests an object and a `children` array, and serde walks
//! them recursively. These helpers grow the stack on demand while walking and
//! lift serde_json's default nesting limit of 128.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Serialise `value` to JSON bytes without a depth limit.
pub fn to_vec<T>(value: &T) -> serde_json::Result<Vec<u8>>
where
  T: Serialize + ?Sized,
{
  let mut out = Vec::new();
  let mut ser = serde_json::Serializer::new(&mut out);
  value.serialize(serde_stacker::Serializer::new(&mut ser))?;
  Ok(out)
}

/// Deserialise JSON bytes without a depth limit.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
  let mut de = serde_json::Deserializer::from_slice(bytes);
  de.disable_recursion_limit();
  let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
  de.end()?;
  Ok(value)
}
