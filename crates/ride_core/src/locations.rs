//! Static location table: rider spawn points and their index-aligned markers.
//!
//! Entries below `city_boundary` are city locations, the rest countryside.
//! Pickup scans walk the spawn points; drop-off scans walk the markers. The
//! pickup marker for a spawn point is the marker at the same index.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::geo::{GeoPoint, SpawnPoint};

#[derive(Debug, Error)]
pub enum LocationTableError {
    #[error("spawn points ({spawns}) and markers ({markers}) differ in length")]
    LengthMismatch { spawns: usize, markers: usize },
    #[error("location table needs at least 2 entries, got {0}")]
    TooFewEntries(usize),
    #[error("city boundary {boundary} is outside the table of {len} entries")]
    BoundaryOutOfRange { boundary: usize, len: usize },
    #[error("failed to read location table: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    City,
    Countryside,
}

impl Region {
    pub fn opposite(self) -> Self {
        match self {
            Region::City => Region::Countryside,
            Region::Countryside => Region::City,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationTable {
    spawns: Vec<SpawnPoint>,
    markers: Vec<GeoPoint>,
    city_boundary: usize,
}

/// One CSV row; the header names match these fields.
#[derive(Debug, Deserialize)]
struct LocationRow {
    spawn_x: f32,
    spawn_y: f32,
    spawn_z: f32,
    heading: f32,
    marker_x: f32,
    marker_y: f32,
    marker_z: f32,
}

impl LocationTable {
    pub fn new(
        spawns: Vec<SpawnPoint>,
        markers: Vec<GeoPoint>,
        city_boundary: usize,
    ) -> Result<Self, LocationTableError> {
        if spawns.len() != markers.len() {
            return Err(LocationTableError::LengthMismatch {
                spawns: spawns.len(),
                markers: markers.len(),
            });
        }
        if spawns.len() < 2 {
            return Err(LocationTableError::TooFewEntries(spawns.len()));
        }
        if city_boundary > spawns.len() {
            return Err(LocationTableError::BoundaryOutOfRange {
                boundary: city_boundary,
                len: spawns.len(),
            });
        }
        Ok(Self {
            spawns,
            markers,
            city_boundary,
        })
    }

    /// Read `spawn_x,spawn_y,spawn_z,heading,marker_x,marker_y,marker_z` rows.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        city_boundary: usize,
    ) -> Result<Self, LocationTableError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut spawns = Vec::new();
        let mut markers = Vec::new();
        for row in csv_reader.deserialize::<LocationRow>() {
            let row = row?;
            spawns.push(SpawnPoint {
                position: GeoPoint::new(row.spawn_x, row.spawn_y, row.spawn_z),
                heading: row.heading,
            });
            markers.push(GeoPoint::new(row.marker_x, row.marker_y, row.marker_z));
        }
        Self::new(spawns, markers, city_boundary)
    }

    pub fn from_csv_path(
        path: impl AsRef<Path>,
        city_boundary: usize,
    ) -> Result<Self, LocationTableError> {
        let file = File::open(path).map_err(csv::Error::from)?;
        Self::from_csv_reader(file, city_boundary)
    }

    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }

    pub fn city_boundary(&self) -> usize {
        self.city_boundary
    }

    pub fn spawn(&self, idx: usize) -> SpawnPoint {
        self.spawns[idx]
    }

    pub fn marker(&self, idx: usize) -> GeoPoint {
        self.markers[idx]
    }

    pub fn region_of(&self, idx: usize) -> Region {
        if idx < self.city_boundary {
            Region::City
        } else {
            Region::Countryside
        }
    }
}
