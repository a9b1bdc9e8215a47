use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use facelog_faceid::{BBox, FaceEmbedder, Gallery, MatchOutcome, Matcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{Accumulator, AttendanceError, FlushEvent, FlushStats, Flusher, FlusherConfig, LogStore};

/// Match result for one face of a frame, for drawing overlays.
#[derive(Debug, Clone)]
pub struct FaceMatch {
    pub bbox: BBox,
    pub outcome: MatchOutcome,
}

/// One attendance-taking run: a gallery snapshot, a matcher, and a flush
/// timer writing to a log store.
///
/// The frame path ([`Session::observe`], [`Session::process_frame`]) only
/// matches and buffers; persistence happens on the flusher's own schedule.
/// The gallery is fixed for the session unless replaced with
/// [`Session::reload`].
pub struct Session {
    gallery: Gallery,
    matcher: Matcher,
    accumulator: Arc<Accumulator>,
    flusher: Flusher,
}

impl Session {
    /// Starts a session and its flush timer. Must be called from within a
    /// tokio runtime.
    pub fn start(gallery: Gallery, matcher: Matcher, store: LogStore, cfg: FlusherConfig) -> Self {
        let accumulator = Arc::new(Accumulator::new());
        let flusher = Flusher::spawn(accumulator.clone(), store, cfg);
        debug!(identities = gallery.len(), threshold = matcher.threshold(), "session started");
        Self {
            gallery,
            matcher,
            accumulator,
            flusher,
        }
    }

    /// Matches one probe at the current local time and buffers the result.
    pub fn observe(&self, probe: &[f32]) -> Result<MatchOutcome, AttendanceError> {
        self.observe_at(probe, Local::now().naive_local())
    }

    /// Matches one probe and buffers the result with the given timestamp.
    /// A probe of the wrong dimension is rejected and nothing is buffered.
    pub fn observe_at(&self, probe: &[f32], at: NaiveDateTime) -> Result<MatchOutcome, AttendanceError> {
        let outcome = self.matcher.identify(probe, &self.gallery)?;
        self.accumulator.record(outcome.resolution.clone(), at);
        Ok(outcome)
    }

    /// Extracts every face in `frame` and observes each one.
    ///
    /// All faces of a frame share one timestamp. A face that fails to match
    /// (wrong dimension) is logged and skipped; the others still count.
    pub fn process_frame<E: FaceEmbedder>(
        &self,
        embedder: &E,
        frame: &E::Frame,
    ) -> Result<Vec<FaceMatch>, AttendanceError> {
        let at = Local::now().naive_local();
        let faces = embedder.extract(frame)?;

        let mut matches = Vec::with_capacity(faces.len());
        for face in faces {
            match self.observe_at(&face.embedding, at) {
                Ok(outcome) => matches.push(FaceMatch {
                    bbox: face.bbox,
                    outcome,
                }),
                Err(e) => warn!(error = %e, "skipping face"),
            }
        }
        Ok(matches)
    }

    /// Replaces the gallery, e.g. after new registrations were committed.
    pub fn reload(&mut self, gallery: Gallery) {
        debug!(identities = gallery.len(), "gallery reloaded");
        self.gallery = gallery;
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Observations buffered since the last flush.
    pub fn pending(&self) -> usize {
        self.accumulator.len()
    }

    /// See [`Flusher::take_events`].
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<FlushEvent>> {
        self.flusher.take_events()
    }

    pub fn stats(&self) -> FlushStats {
        self.flusher.stats()
    }

    /// Stops the flush timer and writes out the last partial interval.
    pub async fn finish(self) -> Result<FlushStats, AttendanceError> {
        self.flusher.shutdown().await
    }
}
