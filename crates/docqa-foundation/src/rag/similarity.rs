//! Similarity scoring for embedding vectors

use docqa_kernel::rag::SimilarityMetric;

/// Score two vectors under `metric`; higher always means more similar.
///
/// Euclidean distance is mapped through `1 / (1 + d)`. Vectors of different
/// length score `0.0` rather than being silently truncated.
pub fn compute_similarity(a: &[f32], b: &[f32], metric: SimilarityMetric) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    match metric {
        SimilarityMetric::Cosine => cosine(a, b),
        SimilarityMetric::DotProduct => dot(a, b),
        SimilarityMetric::Euclidean => 1.0 / (1.0 + euclidean(a, b)),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Zero-magnitude input scores `0.0`.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    dot(a, b) / denom
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}
