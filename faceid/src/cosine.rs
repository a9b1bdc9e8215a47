/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Uses f64 intermediate precision. Returns 0 when either vector has zero
/// norm. Callers are expected to pass equal-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot: f64 = 0.0;
    let mut na: f64 = 0.0;
    let mut nb: f64 = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let ai = x as f64;
        let bi = y as f64;
        dot += ai * bi;
        na += ai * ai;
        nb += bi * bi;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Element-wise arithmetic mean of equal-length vectors.
/// Returns an empty vector when `vectors` is empty.
pub fn mean_vector(vectors: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0f64; first.len()];
    for v in vectors {
        for (s, &x) in sum.iter_mut().zip(v.iter()) {
            *s += x as f64;
        }
    }
    let n = vectors.len() as f64;
    sum.into_iter().map(|s| (s / n) as f32).collect()
}
