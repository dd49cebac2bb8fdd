//! Persistence of the global track collection.
//!
//! The persisted unit is one JSON document holding the run identifier, the
//! run configuration echo, and the track records. Writing then reading back
//! reproduces every field: indices and identifiers exactly, floating-point
//! values to round-trip precision.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MatchingError;
use crate::track::TrackState;

/// A persisted global-track collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSetFile {
    /// Identifier of the run that produced this collection.
    pub run_id: Uuid,

    /// Matching-plane coordinate the tracks are valid at (cm).
    pub matching_plane_z: f64,

    /// Field value the run was performed with (kGauss).
    pub field_z: f64,

    /// The global track records.
    pub tracks: Vec<TrackState>,
}

impl TrackSetFile {
    /// Packages a track collection under a fresh run identifier.
    pub fn new(matching_plane_z: f64, field_z: f64, tracks: Vec<TrackState>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            matching_plane_z,
            field_z,
            tracks,
        }
    }

    /// Serializes the collection to a writer.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), MatchingError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Deserializes a collection from a reader.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, MatchingError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the collection to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), MatchingError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Reads a collection back from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, MatchingError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix5, Vector5};

    fn sample_set() -> TrackSetFile {
        let mut matched = TrackState::new(
            Vector5::new(1.0 / 3.0, -2.0 / 7.0, 0.123456789, -0.05, 0.25),
            Matrix5::identity() * 0.4,
            -77.5,
        );
        matched.set_match_chi2(3.14159);
        matched.set_best_match(5);

        let unmatched = TrackState::new(
            Vector5::new(2.0, 1.0, 0.0, 0.0, -0.1),
            Matrix5::identity(),
            -77.5,
        );

        TrackSetFile::new(-77.5, -5.0, vec![matched, unmatched])
    }

    #[test]
    fn round_trip_reproduces_every_field() {
        let set = sample_set();

        let mut buffer = Vec::new();
        set.write_to(&mut buffer).unwrap();
        let back = TrackSetFile::read_from(buffer.as_slice()).unwrap();

        assert_eq!(back.run_id, set.run_id);
        assert_relative_eq!(back.matching_plane_z, set.matching_plane_z, max_relative = 1e-9);
        assert_relative_eq!(back.field_z, set.field_z, max_relative = 1e-9);
        assert_eq!(back.tracks.len(), set.tracks.len());

        for (a, b) in back.tracks.iter().zip(&set.tracks) {
            assert_relative_eq!(*a.parameters(), *b.parameters(), max_relative = 1e-9);
            assert_relative_eq!(*a.covariance(), *b.covariance(), max_relative = 1e-9);
            assert_relative_eq!(a.z(), b.z(), max_relative = 1e-9);
            assert_eq!(a.best_match(), b.best_match());
            match (a.match_chi2(), b.match_chi2()) {
                (Some(x), Some(y)) => assert_relative_eq!(x, y, max_relative = 1e-9),
                (None, None) => {}
                other => panic!("chi2 mismatch after round trip: {other:?}"),
            }
        }
    }

    #[test]
    fn unmatched_tracks_round_trip_without_a_score() {
        let set = sample_set();

        let mut buffer = Vec::new();
        set.write_to(&mut buffer).unwrap();
        let back = TrackSetFile::read_from(buffer.as_slice()).unwrap();

        assert!(back.tracks[1].match_chi2().is_none());
        assert!(back.tracks[1].best_match().is_none());
        assert_eq!(back.tracks[1].score(), f64::INFINITY);
    }

    #[test]
    fn file_round_trip() {
        let set = sample_set();
        let path = std::env::temp_dir().join(format!(
            "trackfuse_persist_test_{}.json",
            std::process::id()
        ));

        set.write_to_file(&path).unwrap();
        let back = TrackSetFile::read_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.run_id, set.run_id);
        assert_eq!(back.tracks.len(), 2);
    }
}
