//! Vector similarity

/// Signature shared by similarity functions accepted by the store
pub type SimilarityFn = fn(&[f32], &[f32]) -> f64;

/// Cosine similarity `dot(a, b) / (‖a‖·‖b‖)`, computed in f64.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ.
/// Symmetric in its arguments, and exactly 1.0 for any non-zero vector
/// compared with itself.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_sq_a = 0.0_f64;
    let mut norm_sq_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_sq_a += x * x;
        norm_sq_b += y * y;
    }

    if norm_sq_a == 0.0 || norm_sq_b == 0.0 {
        return 0.0;
    }

    // sqrt of the product keeps cosine(a, a) exact: sqrt(d·d) == d
    (dot / (norm_sq_a * norm_sq_b).sqrt()).clamp(-1.0, 1.0)
}
