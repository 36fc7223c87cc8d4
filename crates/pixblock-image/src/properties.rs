/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image properties
//!
//! Every image carries an open, string-keyed property map for side-band
//! data the pixel buffer itself does not express: origin URLs, cache keys,
//! decode hints and so on. Values are a closed set of shapes rather than
//! arbitrary type-erased objects, which keeps lookups safe and gives the
//! map a lossless JSON form for the serialized image header.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The property map stored on every image.
///
/// Insertion order is irrelevant; keys sort for a stable serialized form.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// One property value.
///
/// The untagged serde representation maps each variant onto the natural
/// JSON shape, so `{"ID": "1001", "prio": 3}` round-trips as written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Map(BTreeMap<String, PropertyValue>)
}

impl PropertyValue {
    /// The string behind this value, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None
        }
    }

    /// The integer behind this value, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None
        }
    }

    /// The float behind this value; integers widen losslessly enough for
    /// telemetry-style reads.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None
        }
    }

    /// The boolean behind this value, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None
        }
    }

    /// The nested map behind this value, if it is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(m) => Some(m),
            _ => None
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyValue {
    fn from(value: BTreeMap<String, PropertyValue>) -> Self {
        PropertyValue::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{PropertyMap, PropertyValue};

    #[test]
    fn json_round_trip_keeps_shapes() {
        let mut nested = BTreeMap::new();
        nested.insert("w".to_string(), PropertyValue::from(320));

        let mut map = PropertyMap::new();
        map.insert("id".to_string(), PropertyValue::from("1001"));
        map.insert("ratio".to_string(), PropertyValue::from(1.5));
        map.insert("cached".to_string(), PropertyValue::from(true));
        map.insert("hits".to_string(), PropertyValue::from(42_i64));
        map.insert("thumb".to_string(), PropertyValue::from(nested));

        let json = serde_json::to_string(&map).unwrap();
        let back: PropertyMap = serde_json::from_str(&json).unwrap();

        assert_eq!(map, back);
        assert_eq!(back["id"].as_str(), Some("1001"));
        assert_eq!(back["hits"].as_int(), Some(42));
        assert_eq!(back["ratio"].as_float(), Some(1.5));
        assert_eq!(back["cached"].as_bool(), Some(true));
        assert_eq!(
            back["thumb"].as_map().and_then(|m| m["w"].as_int()),
            Some(320)
        );
    }
}
