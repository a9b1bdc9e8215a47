use std::fmt;

use crate::{FaceError, Identity};

/// A registered identity and its reference vector.
#[derive(Clone, PartialEq)]
pub struct ReferenceEmbedding {
    pub identity: Identity,
    pub vector: Vec<f32>,
}

impl fmt::Debug for ReferenceEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceEmbedding")
            .field("identity", &self.identity)
            .field("vector_len", &self.vector.len())
            .finish()
    }
}

/// An immutable-by-default snapshot of registered identities.
///
/// A `Gallery` is what the matcher searches. It is an owned copy: writes to
/// the [`FeatureStore`](crate::FeatureStore) after it was loaded are not
/// visible until the store is loaded again.
///
/// Iteration order is fixed: entries keep the position they were first
/// inserted at, and replacing an identity keeps its position.
#[derive(Debug, Clone)]
pub struct Gallery {
    dim: usize,
    entries: Vec<ReferenceEmbedding>,
}

impl Gallery {
    /// Creates an empty gallery. Panics if `dim` is 0.
    pub fn new(dim: usize) -> Self {
        assert!(dim > 0, "faceid: gallery dim must be positive");
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the vector for `identity`.
    pub fn insert(&mut self, identity: Identity, vector: Vec<f32>) -> Result<(), FaceError> {
        identity.validate()?;
        if vector.len() != self.dim {
            return Err(FaceError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }
        match self.entries.iter_mut().find(|e| e.identity == identity) {
            Some(existing) => existing.vector = vector,
            None => self.entries.push(ReferenceEmbedding { identity, vector }),
        }
        Ok(())
    }

    /// Returns the entry for `identity`, if registered.
    pub fn get(&self, identity: &Identity) -> Option<&ReferenceEmbedding> {
        self.entries.iter().find(|e| &e.identity == identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEmbedding> {
        self.entries.iter()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn id(name: &str) -> Identity {
        Identity::new(name, Role::Student).unwrap()
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut g = Gallery::new(2);
        g.insert(id("a"), vec![1.0, 0.0]).unwrap();
        g.insert(id("b"), vec![0.0, 1.0]).unwrap();
        g.insert(id("a"), vec![0.5, 0.5]).unwrap();

        assert_eq!(g.len(), 2);
        let order: Vec<&str> = g.iter().map(|e| e.identity.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(g.get(&id("a")).unwrap().vector, vec![0.5, 0.5]);
    }

    #[test]
    fn insert_rejects_wrong_dim() {
        let mut g = Gallery::new(3);
        let err = g.insert(id("a"), vec![1.0]).unwrap_err();
        assert!(matches!(err, FaceError::DimensionMismatch { expected: 3, got: 1 }));
        assert!(g.is_empty());
    }

    #[test]
    fn insert_rejects_invalid_identity() {
        let mut g = Gallery::new(1);
        let bad = Identity {
            name: String::new(),
            role: Role::Teacher,
        };
        assert!(matches!(g.insert(bad, vec![1.0]), Err(FaceError::InvalidIdentity(_))));
    }
}
