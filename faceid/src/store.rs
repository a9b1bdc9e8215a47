use std::sync::Arc;

use facelog_kv::KVStore;
use tracing::warn;

use crate::codec::{decode_vector, encode_vector};
use crate::{FaceError, Gallery, Identity, ReferenceEmbedding};

/// Default hash name holding registrations.
pub const DEFAULT_NAMESPACE: &str = "academy:register";

/// Persistent registry of reference embeddings.
///
/// Entries live in one hash of the backing [`KVStore`]: the field is
/// `"{name}@{role}"`, the value is the raw little-endian f32 vector.
/// The handle is cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct FeatureStore {
    kv: Arc<dyn KVStore>,
    namespace: String,
    dim: usize,
}

impl FeatureStore {
    /// Creates a store handle over `kv` using [`DEFAULT_NAMESPACE`].
    /// Panics if `dim` is 0.
    pub fn new(kv: Arc<dyn KVStore>, dim: usize) -> Self {
        assert!(dim > 0, "faceid: FeatureStore dim must be positive");
        Self {
            kv,
            namespace: DEFAULT_NAMESPACE.to_string(),
            dim,
        }
    }

    /// Uses a different hash name.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reads every registration, decoding each entry independently.
    ///
    /// An unreachable backend fails the whole call with
    /// [`FaceError::StoreUnavailable`]. A bad entry only yields an `Err`
    /// in its own slot.
    pub fn list(&self) -> Result<Vec<Result<ReferenceEmbedding, FaceError>>, FaceError> {
        let fields = self.kv.hgetall(&self.namespace)?;
        Ok(fields
            .into_iter()
            .map(|(key, value)| self.decode_entry(&key, &value))
            .collect())
    }

    /// Loads a matching snapshot.
    ///
    /// Malformed entries are logged and skipped. An empty namespace is a
    /// valid, empty gallery. The returned gallery does not observe later
    /// [`FeatureStore::upsert`] calls; call `load` again to refresh.
    pub fn load(&self) -> Result<Gallery, FaceError> {
        let mut gallery = Gallery::new(self.dim);
        for entry in self.list()? {
            match entry {
                Ok(r) => gallery.insert(r.identity, r.vector)?,
                Err(e) => warn!(namespace = %self.namespace, error = %e, "skipping registration"),
            }
        }
        Ok(gallery)
    }

    /// Reads one registration. `Ok(None)` if `identity` is not registered.
    pub fn get(&self, identity: &Identity) -> Result<Option<ReferenceEmbedding>, FaceError> {
        let key = identity.field_key();
        match self.kv.hget(&self.namespace, &key)? {
            Some(value) => self.decode_entry(&key, &value).map(Some),
            None => Ok(None),
        }
    }

    /// Writes the reference vector for `identity`, replacing any previous one.
    pub fn upsert(&self, identity: &Identity, vector: &[f32]) -> Result<(), FaceError> {
        identity.validate()?;
        if vector.len() != self.dim {
            return Err(FaceError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }
        self.kv
            .hset(&self.namespace, &identity.field_key(), &encode_vector(vector))?;
        Ok(())
    }

    fn decode_entry(&self, key: &str, value: &[u8]) -> Result<ReferenceEmbedding, FaceError> {
        let identity = Identity::from_field_key(key)?;
        let vector = decode_vector(value, self.dim)
            .map_err(|e| FaceError::MalformedRecord(format!("key {key:?}: {e}")))?;
        Ok(ReferenceEmbedding { identity, vector })
    }
}
