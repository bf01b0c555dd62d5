// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON geometry with structurally decoded coordinates.
//!
//! The declared `type` says how deep the coordinate arrays nest, but payloads
//! are not trusted to agree with it. Every level is classified by shape: an
//! array whose first element is not itself an array is a leaf position.

use geo::{LineString, MultiLineString, MultiPolygon, Polygon};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A feature geometry as delivered by the dataset endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Coordinate,
}

/// A `[longitude, latitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

/// Recursive coordinate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    Leaf(Position),
    Nested(Vec<Coordinate>),
    /// Anything that is neither a numeric pair nor an array of coordinates.
    Malformed,
}

impl Default for Coordinate {
    fn default() -> Self {
        Coordinate::Nested(Vec::new())
    }
}

impl Coordinate {
    /// Classify a JSON value.
    ///
    /// Depth is bounded by the JSON parser's recursion limit.
    pub fn from_json(value: &Value) -> Self {
        let Value::Array(items) = value else {
            return Coordinate::Malformed;
        };
        match items.first() {
            None => Coordinate::Nested(Vec::new()),
            Some(Value::Array(_)) => Coordinate::Nested(items.iter().map(Self::from_json).collect()),
            Some(_) => match (
                items.first().and_then(Value::as_f64),
                items.get(1).and_then(Value::as_f64),
            ) {
                (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                    Coordinate::Leaf(Position { lon, lat })
                }
                _ => Coordinate::Malformed,
            },
        }
    }

    /// Iterate every leaf position in document order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Interpret this node as a ring or line: all leaves below it, in order.
    pub fn to_line_string(&self) -> LineString<f64> {
        self.leaves().map(|p| (p.lon, p.lat)).collect::<Vec<_>>().into()
    }

    /// Interpret this node as polygon rings (exterior first).
    pub fn to_polygon(&self) -> Option<Polygon<f64>> {
        let Coordinate::Nested(rings) = self else {
            return None;
        };
        let mut rings = rings.iter().map(Coordinate::to_line_string);
        let exterior = rings.next().filter(|ring| !ring.0.is_empty())?;
        Some(Polygon::new(exterior, rings.collect()))
    }

    /// Interpret this node according to a declared polygonal geometry type.
    pub fn to_multi_polygon(&self, kind: &str) -> MultiPolygon<f64> {
        match (kind, self) {
            ("MultiPolygon", Coordinate::Nested(polygons)) => {
                polygons.iter().filter_map(Coordinate::to_polygon).collect()
            }
            _ => self.to_polygon().into_iter().collect(),
        }
    }

    /// Interpret this node according to a declared linear geometry type.
    pub fn to_multi_line_string(&self, kind: &str) -> MultiLineString<f64> {
        match (kind, self) {
            ("MultiLineString", Coordinate::Nested(lines)) => {
                MultiLineString::new(lines.iter().map(Coordinate::to_line_string).collect())
            }
            _ => MultiLineString::new(vec![self.to_line_string()]),
        }
    }
}

/// Depth-first leaf iterator backed by an explicit stack.
pub struct Leaves<'a> {
    stack: Vec<&'a Coordinate>,
}

impl Iterator for Leaves<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        while let Some(node) = self.stack.pop() {
            match node {
                Coordinate::Leaf(position) => return Some(*position),
                Coordinate::Nested(children) => self.stack.extend(children.iter().rev()),
                Coordinate::Malformed => {}
            }
        }
        None
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Coordinate::from_json(&value))
    }
}

impl Serialize for Coordinate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Coordinate::Leaf(p) => [p.lon, p.lat].serialize(serializer),
            Coordinate::Nested(children) => {
                let mut seq = serializer.serialize_seq(Some(children.len()))?;
                for child in children {
                    seq.serialize_element(child)?;
                }
                seq.end()
            }
            Coordinate::Malformed => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_detection_is_structural() {
        let point = Coordinate::from_json(&json!([5.1, 52.0]));
        assert_eq!(point, Coordinate::Leaf(Position { lon: 5.1, lat: 52.0 }));

        let altitude = Coordinate::from_json(&json!([5.1, 52.0, 3.0]));
        assert_eq!(altitude, Coordinate::Leaf(Position { lon: 5.1, lat: 52.0 }));

        let nested = Coordinate::from_json(&json!([[[[1.0, 2.0]]]]));
        assert_eq!(nested.leaves().count(), 1);
    }

    #[test]
    fn test_malformed_leaves_are_skipped() {
        let coords = Coordinate::from_json(&json!([[1.0, 2.0], ["a", "b"], [3.0], "x", [4.0, 5.0]]));
        let leaves: Vec<_> = coords.leaves().collect();
        assert_eq!(
            leaves,
            vec![Position { lon: 1.0, lat: 2.0 }, Position { lon: 4.0, lat: 5.0 }]
        );
    }

    #[test]
    fn test_leaves_preserve_document_order() {
        let coords = Coordinate::from_json(&json!([[[0.0, 0.0], [1.0, 0.0]], [[2.0, 0.0]]]));
        let lons: Vec<f64> = coords.leaves().map(|p| p.lon).collect();
        assert_eq!(lons, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse_during_walk() {
        let mut coord = Coordinate::Leaf(Position { lon: 1.0, lat: 1.0 });
        for _ in 0..10_000 {
            coord = Coordinate::Nested(vec![coord]);
        }
        assert_eq!(coord.leaves().count(), 1);
        // Unwind without recursive drop.
        let mut node = coord;
        while let Coordinate::Nested(mut children) = node {
            node = children.pop().unwrap_or(Coordinate::Malformed);
        }
    }

    #[test]
    fn test_polygon_conversion() {
        let coords = Coordinate::from_json(&json!([[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 0.0]]]));
        let polygon = coords.to_polygon().expect("polygon");
        assert_eq!(polygon.exterior().0.len(), 4);
        assert!(polygon.interiors().is_empty());

        let multi = coords.to_multi_polygon("Polygon");
        assert_eq!(multi.0.len(), 1);
    }

    #[test]
    fn test_serialize_round_shape() {
        let value = json!([[1.0, 2.0], [3.0, 4.0]]);
        let coords: Coordinate = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&coords).unwrap(), value);
    }
}
