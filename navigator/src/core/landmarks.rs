//! Named landmark table built from the simulator's spawn-point list.
//!
//! Landmarks are the only trip endpoints the supervisor accepts. The table is
//! built once per session from the canonical name-to-spawn-index mapping and
//! never mutated afterwards.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::geometry::Pose;

/// Canonical landmark names and their spawn-point indices on the session map.
pub const CANONICAL_LANDMARKS: [(&str, usize); 10] = [
    ("home", 109),
    ("cottageArea", 72),
    ("hospital", 235),
    ("school", 51),
    ("market", 283),
    ("officeParking", 219),
    ("shoppingMall", 27),
    ("office", 258),
    ("parking", 21),
    ("railway", 138),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("landmark '{name}' wants spawn point {index} but the map only has {available}")]
    SpawnIndexOutOfRange {
        name: String,
        index: usize,
        available: usize,
    },
}

/// Read-only mapping from landmark name to world pose.
///
/// Iteration order is the name's lexicographic order so listings and logs
/// stay deterministic across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkTable {
    entries: BTreeMap<String, Pose>,
}

impl LandmarkTable {
    /// Build the canonical table from the simulator's spawn-point list.
    pub fn from_spawn_points(spawn_points: &[Pose]) -> Result<Self, LandmarkError> {
        let mut entries = BTreeMap::new();
        for (name, index) in CANONICAL_LANDMARKS {
            let pose = spawn_points.get(index).ok_or_else(|| {
                LandmarkError::SpawnIndexOutOfRange {
                    name: name.to_string(),
                    index,
                    available: spawn_points.len(),
                }
            })?;
            entries.insert(name.to_string(), *pose);
        }
        Ok(Self { entries })
    }

    /// Build a table from explicit entries. Intended for tests and for
    /// sessions that define their own points of interest.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Pose)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Pose> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pose)> {
        self.entries.iter().map(|(name, pose)| (name.as_str(), pose))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
