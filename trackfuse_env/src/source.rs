//! Track and cluster record loading.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::EnvError;
use crate::types::{RawCluster, TrackParameters};

/// Supplies the raw track and cluster collections for one matching run.
///
/// A loader failure means the run cannot proceed; callers must abort with
/// the diagnostic rather than substitute empty collections.
pub trait TrackSource {
    /// Loads the spectrometer track records (the matching seeds).
    fn load_spectrometer(&self) -> Result<Vec<TrackParameters>, EnvError>;

    /// Loads the telescope track records (the measurement side).
    fn load_telescope(&self) -> Result<Vec<TrackParameters>, EnvError>;

    /// Loads the decoded cluster records attached to the telescope tracks.
    fn load_clusters(&self) -> Result<Vec<RawCluster>, EnvError>;
}

/// File-backed source reading one JSON array per collection.
#[derive(Debug, Clone)]
pub struct JsonTrackSource {
    spectrometer: PathBuf,
    telescope: PathBuf,
    clusters: PathBuf,
}

impl JsonTrackSource {
    /// Creates a source from the three collection files.
    pub fn new(
        spectrometer: impl Into<PathBuf>,
        telescope: impl Into<PathBuf>,
        clusters: impl Into<PathBuf>,
    ) -> Self {
        Self {
            spectrometer: spectrometer.into(),
            telescope: telescope.into(),
            clusters: clusters.into(),
        }
    }
}

fn read_json_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EnvError> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            EnvError::missing(path.display().to_string())
        } else {
            EnvError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&text)?)
}

impl TrackSource for JsonTrackSource {
    fn load_spectrometer(&self) -> Result<Vec<TrackParameters>, EnvError> {
        read_json_records(&self.spectrometer)
    }

    fn load_telescope(&self) -> Result<Vec<TrackParameters>, EnvError> {
        read_json_records(&self.telescope)
    }

    fn load_clusters(&self) -> Result<Vec<RawCluster>, EnvError> {
        read_json_records(&self.clusters)
    }
}

/// In-memory source for simulation and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrackSource {
    pub spectrometer: Vec<TrackParameters>,
    pub telescope: Vec<TrackParameters>,
    pub clusters: Vec<RawCluster>,
}

impl TrackSource for MemoryTrackSource {
    fn load_spectrometer(&self) -> Result<Vec<TrackParameters>, EnvError> {
        Ok(self.spectrometer.clone())
    }

    fn load_telescope(&self) -> Result<Vec<TrackParameters>, EnvError> {
        Ok(self.telescope.clone())
    }

    fn load_clusters(&self) -> Result<Vec<RawCluster>, EnvError> {
        Ok(self.clusters.clone())
    }
}
