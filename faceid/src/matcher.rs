use std::fmt;

use crate::cosine::cosine_similarity;
use crate::{FaceError, Gallery, Identity};

/// Default minimum cosine similarity for a match.
pub const DEFAULT_THRESHOLD: f32 = 0.62;

/// Label shown for probes that match nobody.
pub const UNKNOWN_LABEL: &str = "Unknown Person";

/// Controls matcher behavior.
#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    /// Minimum cosine similarity to accept the best candidate (inclusive).
    /// Lower = more lenient, higher = stricter (more unknowns).
    /// Default: 0.62.
    pub threshold: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Who a probe resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    Known(Identity),
    Unknown,
}

impl Resolution {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Known(id) => Some(id),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(id) => f.write_str(&id.name),
            Self::Unknown => f.write_str(UNKNOWN_LABEL),
        }
    }
}

/// Result of [`Matcher::identify`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub resolution: Resolution,

    /// Best cosine similarity found, in `[-1, 1]`.
    /// Reported for unknowns too; 0 when the gallery is empty or the probe
    /// compares with nothing (NaN components).
    pub score: f32,
}

/// Resolves probe embeddings to registered identities by brute-force
/// cosine similarity over a [`Gallery`].
///
/// O(N·D) per probe. Stateless apart from the threshold, so one matcher can
/// serve any number of galleries and threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    threshold: f32,
}

impl Matcher {
    pub fn new(cfg: MatcherConfig) -> Self {
        Self {
            threshold: cfg.threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Adjusts matching strictness.
    pub fn set_threshold(&mut self, t: f32) {
        self.threshold = t;
    }

    /// Returns the best-matching identity for `probe`.
    ///
    /// The highest-similarity entry wins; on exact ties the earlier entry in
    /// gallery order wins. The winner is accepted when its similarity is
    /// `>= threshold`, otherwise the result is [`Resolution::Unknown`].
    /// An empty gallery always yields `Unknown`.
    pub fn identify(&self, probe: &[f32], gallery: &Gallery) -> Result<MatchOutcome, FaceError> {
        if gallery.is_empty() {
            return Ok(MatchOutcome {
                resolution: Resolution::Unknown,
                score: 0.0,
            });
        }
        if probe.len() != gallery.dim() {
            return Err(FaceError::DimensionMismatch {
                expected: gallery.dim(),
                got: probe.len(),
            });
        }

        let mut best_sim = f32::NEG_INFINITY;
        let mut best: Option<&Identity> = None;
        for entry in gallery.iter() {
            let sim = cosine_similarity(probe, &entry.vector);
            if sim > best_sim {
                best_sim = sim;
                best = Some(&entry.identity);
            }
        }

        match best {
            Some(id) if best_sim >= self.threshold => Ok(MatchOutcome {
                resolution: Resolution::Known(id.clone()),
                score: best_sim,
            }),
            Some(_) => Ok(MatchOutcome {
                resolution: Resolution::Unknown,
                score: best_sim,
            }),
            // Nothing compared (NaN probe).
            None => Ok(MatchOutcome {
                resolution: Resolution::Unknown,
                score: 0.0,
            }),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn student(name: &str) -> Identity {
        Identity::new(name, Role::Student).unwrap()
    }

    #[test]
    fn empty_gallery_is_unknown() {
        let m = Matcher::default();
        let out = m.identify(&[1.0, 0.0, 0.0], &Gallery::new(3)).unwrap();
        assert_eq!(out.resolution, Resolution::Unknown);
        assert_eq!(out.score, 0.0);
    }

    #[test]
    fn best_match_wins() {
        let mut g = Gallery::new(3);
        g.insert(student("a"), vec![1.0, 0.0, 0.0]).unwrap();
        g.insert(student("b"), vec![0.0, 1.0, 0.0]).unwrap();
        g.insert(student("c"), vec![0.9, 0.1, 0.0]).unwrap();

        let out = Matcher::default().identify(&[0.1, 1.0, 0.0], &g).unwrap();
        assert_eq!(out.resolution, Resolution::Known(student("b")));
        assert!(out.score > 0.99);
    }

    #[test]
    fn below_threshold_is_unknown() {
        let mut g = Gallery::new(2);
        g.insert(student("a"), vec![1.0, 0.0]).unwrap();

        // cos(60°) = 0.5
        let probe = [0.5, 3f32.sqrt() / 2.0];
        let out = Matcher::default().identify(&probe, &g).unwrap();
        assert_eq!(out.resolution, Resolution::Unknown);
        assert!((out.score - 0.5).abs() < 1e-5);
        assert_eq!(out.resolution.to_string(), UNKNOWN_LABEL);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut g = Gallery::new(2);
        g.insert(student("a"), vec![1.0, 0.0]).unwrap();
        let probe = [0.6, 0.8];
        let score = cosine_similarity(&probe, &[1.0, 0.0]);

        let mut m = Matcher::new(MatcherConfig { threshold: score });
        let out = m.identify(&probe, &g).unwrap();
        assert!(out.resolution.is_known(), "score == threshold should match");

        m.set_threshold(score + 1e-4);
        assert!(!m.identify(&probe, &g).unwrap().resolution.is_known());
    }

    #[test]
    fn ties_resolve_to_first_entry() {
        let mut g = Gallery::new(2);
        g.insert(student("first"), vec![1.0, 0.0]).unwrap();
        g.insert(student("second"), vec![2.0, 0.0]).unwrap();

        let out = Matcher::default().identify(&[3.0, 0.0], &g).unwrap();
        assert_eq!(out.resolution.identity().unwrap().name, "first");
    }

    #[test]
    fn role_is_part_of_identity() {
        let mut g = Gallery::new(2);
        g.insert(student("Sam"), vec![1.0, 0.0]).unwrap();
        g.insert(Identity::new("Sam", Role::Teacher).unwrap(), vec![0.0, 1.0])
            .unwrap();

        let out = Matcher::default().identify(&[0.0, 1.0], &g).unwrap();
        assert_eq!(out.resolution.identity().unwrap().role, Role::Teacher);
    }

    #[test]
    fn nan_probe_is_unknown_with_zero_score() {
        let mut g = Gallery::new(2);
        g.insert(student("a"), vec![1.0, 0.0]).unwrap();

        let out = Matcher::default().identify(&[f32::NAN, 0.0], &g).unwrap();
        assert_eq!(out.resolution, Resolution::Unknown);
        assert_eq!(out.score, 0.0);
    }

    #[test]
    fn probe_dimension_mismatch() {
        let mut g = Gallery::new(3);
        g.insert(student("a"), vec![1.0, 0.0, 0.0]).unwrap();
        let err = Matcher::default().identify(&[1.0, 0.0], &g).unwrap_err();
        assert!(matches!(err, FaceError::DimensionMismatch { expected: 3, got: 2 }));
    }
}
