//! Run orchestration: owns the per-run collections and sequences
//! load → propagate-to-plane → match → persist.

use tracing::{debug, info};

use trackfuse_env::{FieldMap, Propagator, TrackParameters, TrackSource};

use crate::assign;
use crate::config::MatchingConfig;
use crate::convert::FrameTransform;
use crate::error::MatchingError;
use crate::persist::TrackSetFile;
use crate::track::{Cluster, TrackState};

/// One matching run over one pair of track collections.
///
/// A `MatchingRun` is a plain constructible value: independent runs (and
/// parallel test cases) each build their own and cannot interfere. All
/// collections are cleared and rebuilt by [`MatchingRun::load`]; only the
/// configuration and the frame transform survive across invocations.
#[derive(Debug)]
pub struct MatchingRun {
    config: MatchingConfig,
    frame: FrameTransform,

    /// Field value sampled once per run at `config.field_point` (kGauss);
    /// `None` until propagation has run.
    field_z: Option<f64>,

    raw_spectrometer: Vec<TrackParameters>,
    raw_telescope: Vec<TrackParameters>,

    spectrometer: Vec<TrackState>,
    telescope: Vec<TrackState>,
    clusters: Vec<Cluster>,
    global: Vec<TrackState>,
}

impl MatchingRun {
    /// Creates a run with the given configuration and an identity frame
    /// transform.
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            frame: FrameTransform::identity(),
            field_z: None,
            raw_spectrometer: Vec::new(),
            raw_telescope: Vec::new(),
            spectrometer: Vec::new(),
            telescope: Vec::new(),
            clusters: Vec::new(),
            global: Vec::new(),
        }
    }

    /// Creates a run with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MatchingConfig::default())
    }

    /// Sets the spectrometer-to-common-frame transform.
    pub fn with_frame_transform(mut self, frame: FrameTransform) -> Self {
        self.frame = frame;
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Drops every per-run collection and the sampled field value.
    pub fn clear(&mut self) {
        self.field_z = None;
        self.raw_spectrometer.clear();
        self.raw_telescope.clear();
        self.spectrometer.clear();
        self.telescope.clear();
        self.clusters.clear();
        self.global.clear();
    }

    /// Loads the raw collections for this run.
    ///
    /// Clears any previous run first. A loader failure (missing file,
    /// undecodable records) aborts the run; it is never treated as an empty
    /// collection.
    pub fn load<S: TrackSource>(&mut self, source: &S) -> Result<(), MatchingError> {
        self.clear();

        self.raw_spectrometer = source.load_spectrometer()?;
        self.raw_telescope = source.load_telescope()?;
        self.clusters = source
            .load_clusters()?
            .iter()
            .enumerate()
            .map(|(id, raw)| Cluster::from_raw(id, raw))
            .collect();

        info!(
            spectrometer = self.raw_spectrometer.len(),
            telescope = self.raw_telescope.len(),
            clusters = self.clusters.len(),
            "loaded input collections"
        );
        Ok(())
    }

    /// Extrapolates both raw collections to the matching plane and converts
    /// them to the common representation.
    ///
    /// The field is sampled once at the configured reference point and held
    /// constant for every track of the run. A propagation failure aborts
    /// the run.
    pub fn propagate_to_plane<P: Propagator, F: FieldMap>(
        &mut self,
        propagator: &P,
        field: &F,
    ) -> Result<(), MatchingError> {
        let field_z = field.field_z(self.config.field_point);
        self.field_z = Some(field_z);
        info!(bz_kgauss = field_z, "sampled field at reference point");

        let plane_z = self.config.matching_plane_z;

        for mut raw in std::mem::take(&mut self.raw_spectrometer) {
            propagator.extrapolate_to_z(&mut raw, plane_z, field_z)?;
            self.spectrometer.push(self.frame.to_track_state(&raw));
        }
        for mut raw in std::mem::take(&mut self.raw_telescope) {
            propagator.extrapolate_to_z(&mut raw, plane_z, field_z)?;
            self.telescope.push(TrackState::from(raw));
        }

        debug!(
            plane_z,
            spectrometer = self.spectrometer.len(),
            telescope = self.telescope.len(),
            "collections at matching plane"
        );
        Ok(())
    }

    /// Scores all pairs and commits each seed's best candidate as a global
    /// track.
    pub fn run_matching(&mut self) {
        self.global = assign::run_matching(&self.spectrometer, &self.telescope, &self.config);

        let matched = self.global.iter().filter(|t| t.is_matched()).count();
        info!(
            matched,
            seeds = self.spectrometer.len(),
            telescope = self.telescope.len(),
            "matching complete"
        );
    }

    /// Full pipeline: load, propagate to the plane, match.
    pub fn run<S, P, F>(
        &mut self,
        source: &S,
        propagator: &P,
        field: &F,
    ) -> Result<(), MatchingError>
    where
        S: TrackSource,
        P: Propagator,
        F: FieldMap,
    {
        self.load(source)?;
        self.propagate_to_plane(propagator, field)?;
        self.run_matching();
        Ok(())
    }

    /// Spectrometer seeds at the matching plane.
    pub fn spectrometer_tracks(&self) -> &[TrackState] {
        &self.spectrometer
    }

    /// Telescope tracks at the matching plane.
    pub fn telescope_tracks(&self) -> &[TrackState] {
        &self.telescope
    }

    /// The clusters loaded for this run.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The global tracks produced by the last [`MatchingRun::run_matching`].
    pub fn global_tracks(&self) -> &[TrackState] {
        &self.global
    }

    /// Field value sampled for this run, if propagation has run.
    pub fn field_z(&self) -> Option<f64> {
        self.field_z
    }

    /// Resolves a global track's committed match back to the telescope
    /// track it was combined with. This is the entry point a downstream
    /// anchored refit starts from.
    pub fn matched_telescope_track(&self, global: &TrackState) -> Option<&TrackState> {
        self.telescope.get(global.best_match()?)
    }

    /// Packages the global collection for persistence.
    pub fn to_track_set(&self) -> TrackSetFile {
        TrackSetFile::new(
            self.config.matching_plane_z,
            self.field_z.unwrap_or(0.0),
            self.global.clone(),
        )
    }

    /// Writes the global collection to a JSON file.
    pub fn save_global(&self, path: impl AsRef<std::path::Path>) -> Result<(), MatchingError> {
        let set = self.to_track_set();
        set.write_to_file(&path)?;
        info!(
            tracks = set.tracks.len(),
            path = %path.as_ref().display(),
            "persisted global tracks"
        );
        Ok(())
    }
}
