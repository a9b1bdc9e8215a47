use crate::FaceError;

/// Face bounding box in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One face found in a frame.
#[derive(Debug, Clone)]
pub struct DetectedFace {
    pub bbox: BBox,
    pub embedding: Vec<f32>,
}

/// Detects faces in a frame and computes their embeddings.
///
/// Detection and inference are not part of this crate; implementations
/// wrap whatever model produces the vectors. A frame may contain zero or
/// more faces.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait FaceEmbedder: Send + Sync {
    /// Frame type accepted by this embedder (image buffer, decoded packet...).
    type Frame: ?Sized;

    /// Returns every face found in `frame`, most prominent first.
    fn extract(&self, frame: &Self::Frame) -> Result<Vec<DetectedFace>, FaceError>;

    /// Returns the dimensionality of the embedding vectors (e.g., 512).
    fn dimension(&self) -> usize;
}
