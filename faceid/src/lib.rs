//! Face identity resolution against a registered set of people.
//!
//! # Pipeline
//!
//! 1. [`Registration`]: repeated samples of one face -> mean reference vector
//! 2. [`FeatureStore`]: persists reference vectors keyed by `(name, role)`
//! 3. [`FeatureStore::load`]: store -> [`Gallery`] snapshot
//! 4. [`Matcher::identify`]: probe embedding + gallery -> [`MatchOutcome`]
//!
//! ```
//! use std::sync::Arc;
//! use facelog_faceid::{FeatureStore, Identity, Matcher, Registration, RegistrationConfig, Role};
//! use facelog_kv::MemoryStore;
//!
//! let store = FeatureStore::new(Arc::new(MemoryStore::new()), 3);
//! let mut reg = Registration::new(RegistrationConfig { dim: 3, min_samples: 2 });
//! reg.add_sample(&[1.0, 0.0, 0.0]).unwrap();
//! reg.add_sample(&[0.98, 0.02, 0.0]).unwrap();
//! reg.commit(&Identity::new("Bob", Role::Teacher).unwrap(), &store).unwrap();
//!
//! let gallery = store.load().unwrap();
//! let out = Matcher::default().identify(&[1.0, 0.0, 0.0], &gallery).unwrap();
//! assert!(out.resolution.is_known());
//! ```
//!
//! # Snapshots
//!
//! A [`Gallery`] is an owned copy. Registrations committed after it was
//! loaded are only seen after another [`FeatureStore::load`].

pub mod codec;
mod cosine;
mod embedder;
mod error;
mod gallery;
mod identity;
mod matcher;
mod registration;
mod store;

pub use cosine::{cosine_similarity, mean_vector};
pub use embedder::{BBox, DetectedFace, FaceEmbedder};
pub use error::FaceError;
pub use gallery::{Gallery, ReferenceEmbedding};
pub use identity::{Identity, Role, KEY_SEPARATOR};
pub use matcher::{MatchOutcome, Matcher, MatcherConfig, Resolution, DEFAULT_THRESHOLD, UNKNOWN_LABEL};
pub use registration::{Registration, RegistrationConfig, DEFAULT_MIN_SAMPLES};
pub use store::{FeatureStore, DEFAULT_NAMESPACE};
