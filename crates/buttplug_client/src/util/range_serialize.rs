// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Serde helpers for inclusive ranges, which go over the wire as [start, end]
//! pairs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::RangeInclusive;

pub fn range_sequence_serialize<S, T>(
  range_vec: &[RangeInclusive<T>],
  serializer: S,
) -> Result<S::Ok, S::Error>
where
  S: Serializer,
  T: Serialize + Copy,
{
  let arrays: Vec<[T; 2]> = range_vec.iter().map(|r| [*r.start(), *r.end()]).collect();
  arrays.serialize(serializer)
}

pub fn range_sequence_deserialize<'de, D, T>(
  deserializer: D,
) -> Result<Vec<RangeInclusive<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Copy,
{
  let arrays: Vec<[T; 2]> = Vec::deserialize(deserializer)?;
  Ok(arrays.iter().map(|pair| pair[0]..=pair[1]).collect())
}

pub fn option_range_sequence_serialize<S, T>(
  range_vec: &Option<Vec<RangeInclusive<T>>>,
  serializer: S,
) -> Result<S::Ok, S::Error>
where
  S: Serializer,
  T: Serialize + Copy,
{
  match range_vec {
    Some(ranges) => range_sequence_serialize(ranges, serializer),
    None => serializer.serialize_none(),
  }
}

pub fn option_range_sequence_deserialize<'de, D, T>(
  deserializer: D,
) -> Result<Option<Vec<RangeInclusive<T>>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Copy,
{
  let arrays: Option<Vec<[T; 2]>> = Option::deserialize(deserializer)?;
  Ok(arrays.map(|v| v.iter().map(|pair| pair[0]..=pair[1]).collect()))
}

#[cfg(test)]
mod test {
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
  struct RangeHolder {
    #[serde(
      serialize_with = "range_sequence_serialize",
      deserialize_with = "range_sequence_deserialize"
    )]
    ranges: Vec<RangeInclusive<i32>>,
  }

  #[test]
  fn test_range_pair_round_trip() {
    let holder = RangeHolder {
      ranges: vec![0..=100, -40..=85],
    };
    let json = serde_json::to_string(&holder).expect("Test, assuming infallible.");
    assert_eq!(json, r#"{"ranges":[[0,100],[-40,85]]}"#);
    let holder2: RangeHolder = serde_json::from_str(&json).expect("Test, assuming infallible.");
    assert_eq!(holder, holder2);
  }
}
