/// Cosine similarity in [-1, 1].
///
/// Returns `0.0` instead of NaN when either vector has zero norm, when the
/// dimensions differ, or when the result is not finite. Mismatches are reported
/// by the caller, once per catalog pass.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        sim
    } else {
        0.0
    }
}
