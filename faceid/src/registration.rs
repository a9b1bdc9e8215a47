use crate::cosine::mean_vector;
use crate::{FaceEmbedder, FaceError, FeatureStore, Identity};

/// Default number of samples required before an enrollment can be committed.
pub const DEFAULT_MIN_SAMPLES: usize = 20;

/// Controls enrollment behavior.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationConfig {
    /// Embedding dimension (e.g. 512).
    pub dim: usize,

    /// Samples required before [`Registration::commit`] is permitted.
    /// Default: 20.
    pub min_samples: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            dim: 512,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Collects embedding samples for one person and commits their mean as the
/// reference vector.
///
/// Averaging many frames smooths out single-frame noise (pose, lighting,
/// blur). The session is reset after a successful commit; a failed commit
/// leaves the collected samples untouched so the caller can fix the input
/// or add samples and retry.
pub struct Registration {
    cfg: RegistrationConfig,
    embeddings: Vec<Vec<f32>>,
}

impl Registration {
    /// Creates an empty enrollment session. Panics if `cfg.dim` is 0.
    pub fn new(cfg: RegistrationConfig) -> Self {
        assert!(cfg.dim > 0, "faceid: RegistrationConfig.dim must be positive");
        Self {
            cfg,
            embeddings: Vec::new(),
        }
    }

    /// Adds one sample. Returns the new sample count.
    pub fn add_sample(&mut self, emb: &[f32]) -> Result<usize, FaceError> {
        if emb.len() != self.cfg.dim {
            return Err(FaceError::DimensionMismatch {
                expected: self.cfg.dim,
                got: emb.len(),
            });
        }
        self.embeddings.push(emb.to_vec());
        Ok(self.embeddings.len())
    }

    /// Extracts faces from `frame` and adds the first one as a sample.
    ///
    /// Returns `Ok(None)` when the frame holds no face.
    pub fn add_frame<E: FaceEmbedder>(
        &mut self,
        embedder: &E,
        frame: &E::Frame,
    ) -> Result<Option<usize>, FaceError> {
        match embedder.extract(frame)?.into_iter().next() {
            Some(face) => self.add_sample(&face.embedding).map(Some),
            None => Ok(None),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.embeddings.len()
    }

    /// Samples still needed before commit is permitted.
    pub fn remaining(&self) -> usize {
        self.cfg.min_samples.saturating_sub(self.embeddings.len())
    }

    pub fn is_ready(&self) -> bool {
        self.remaining() == 0 && !self.embeddings.is_empty()
    }

    /// Element-wise mean of the collected samples, or `None` if empty.
    pub fn mean(&self) -> Option<Vec<f32>> {
        if self.embeddings.is_empty() {
            return None;
        }
        Some(mean_vector(&self.embeddings))
    }

    /// Writes the averaged vector for `identity` to `store` and resets.
    ///
    /// Fails with [`FaceError::InsufficientSamples`] below `min_samples`, and
    /// with [`FaceError::InvalidIdentity`] for a blank or malformed identity,
    /// both before the store is touched. Returns the committed vector.
    pub fn commit(&mut self, identity: &Identity, store: &FeatureStore) -> Result<Vec<f32>, FaceError> {
        if !self.is_ready() {
            return Err(FaceError::InsufficientSamples {
                need: self.cfg.min_samples.max(1),
                got: self.embeddings.len(),
            });
        }
        identity.validate()?;

        let mean = mean_vector(&self.embeddings);
        store.upsert(identity, &mean)?;
        self.reset();
        Ok(mean)
    }

    /// Discards all collected samples.
    pub fn reset(&mut self) {
        self.embeddings.clear();
    }
}

impl Default for Registration {
    fn default() -> Self {
        Self::new(RegistrationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{BBox, DetectedFace, Matcher, MatcherConfig, Resolution, Role};
    use facelog_kv::MemoryStore;

    fn store(dim: usize) -> FeatureStore {
        FeatureStore::new(Arc::new(MemoryStore::new()), dim)
    }

    fn session(dim: usize, min_samples: usize) -> Registration {
        Registration::new(RegistrationConfig { dim, min_samples })
    }

    fn alice() -> Identity {
        Identity::new("Alice", Role::Student).unwrap()
    }

    #[test]
    fn commit_requires_min_samples() {
        let store = store(2);
        let mut reg = session(2, DEFAULT_MIN_SAMPLES);
        for _ in 0..19 {
            reg.add_sample(&[1.0, 0.0]).unwrap();
        }
        let err = reg.commit(&alice(), &store).unwrap_err();
        assert!(matches!(err, FaceError::InsufficientSamples { need: 20, got: 19 }));
        assert_eq!(reg.sample_count(), 19, "failed commit keeps samples");
        assert_eq!(reg.remaining(), 1);
        assert!(store.load().unwrap().is_empty());

        assert_eq!(reg.add_sample(&[1.0, 0.0]).unwrap(), 20);
        assert!(reg.is_ready());
        reg.commit(&alice(), &store).unwrap();
        assert_eq!(reg.sample_count(), 0, "successful commit resets");
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn commit_invalid_identity_does_not_touch_store() {
        let store = store(2);
        let mut reg = session(2, 1);
        reg.add_sample(&[1.0, 0.0]).unwrap();

        let blank = Identity {
            name: " ".into(),
            role: Role::Teacher,
        };
        assert!(matches!(
            reg.commit(&blank, &store),
            Err(FaceError::InvalidIdentity(_))
        ));
        assert_eq!(reg.sample_count(), 1);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn commit_writes_mean() {
        let store = store(2);
        let mut reg = session(2, 2);
        reg.add_sample(&[1.0, 0.0]).unwrap();
        reg.add_sample(&[0.0, 1.0]).unwrap();
        assert_eq!(reg.mean().unwrap(), vec![0.5, 0.5]);

        let committed = reg.commit(&alice(), &store).unwrap();
        assert_eq!(committed, vec![0.5, 0.5]);
        assert_eq!(store.load().unwrap().get(&alice()).unwrap().vector, vec![0.5, 0.5]);
        assert!(reg.mean().is_none());
    }

    #[test]
    fn reregistration_keeps_single_entry_with_second_average() {
        let store = store(2);
        let mut reg = session(2, 20);

        for _ in 0..20 {
            reg.add_sample(&[1.0, 0.0]).unwrap();
        }
        reg.commit(&alice(), &store).unwrap();

        for i in 0..20 {
            let x = if i % 2 == 0 { 0.0 } else { 2.0 };
            reg.add_sample(&[x, 1.0]).unwrap();
        }
        reg.commit(&alice(), &store).unwrap();

        let gallery = store.load().unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.get(&alice()).unwrap().vector, vec![1.0, 1.0]);
    }

    #[test]
    fn add_sample_rejects_wrong_dim() {
        let mut reg = session(3, 20);
        assert!(matches!(
            reg.add_sample(&[1.0]),
            Err(FaceError::DimensionMismatch { expected: 3, got: 1 })
        ));
        assert_eq!(reg.sample_count(), 0);
    }

    #[test]
    fn empty_session_cannot_commit() {
        let mut reg = session(2, 0);
        assert!(matches!(
            reg.commit(&alice(), &store(2)),
            Err(FaceError::InsufficientSamples { .. })
        ));
    }

    #[test]
    fn reset_cancels_enrollment() {
        let mut reg = session(2, 20);
        reg.add_sample(&[1.0, 0.0]).unwrap();
        reg.reset();
        assert_eq!(reg.sample_count(), 0);
        assert_eq!(reg.remaining(), 20);
    }

    struct FixedEmbedder(Vec<Vec<f32>>);

    impl FaceEmbedder for FixedEmbedder {
        type Frame = ();

        fn extract(&self, _frame: &()) -> Result<Vec<DetectedFace>, FaceError> {
            Ok(self
                .0
                .iter()
                .map(|e| DetectedFace {
                    bbox: BBox::default(),
                    embedding: e.clone(),
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    #[test]
    fn add_frame_takes_first_face() {
        let mut reg = session(3, 1);
        let two_faces = FixedEmbedder(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
        assert_eq!(reg.add_frame(&two_faces, &()).unwrap(), Some(1));
        assert_eq!(reg.mean().unwrap(), vec![1.0, 0.0, 0.0]);

        let no_faces = FixedEmbedder(vec![]);
        assert_eq!(reg.add_frame(&no_faces, &()).unwrap(), None);
        assert_eq!(reg.sample_count(), 1);
    }

    #[test]
    fn enroll_then_match_end_to_end() {
        let store = store(3);
        let mut reg = session(3, 3);
        for emb in [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.99, 0.01, 0.0]] {
            reg.add_sample(&emb).unwrap();
        }
        let bob = Identity::new("Bob", Role::Teacher).unwrap();
        reg.commit(&bob, &store).unwrap();

        let gallery = store.load().unwrap();
        let m = Matcher::new(MatcherConfig { threshold: 0.62 });
        let out = m.identify(&[1.0, 0.0, 0.0], &gallery).unwrap();
        assert_eq!(out.resolution, Resolution::Known(bob));
        assert!((out.score - 1.0).abs() < 1e-3);
    }
}
