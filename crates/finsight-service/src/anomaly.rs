//! Anomaly flagging over transaction embeddings.
//!
//! Treated as an opaque function by the rest of the system: it takes a
//! batch of vectors and returns the indices it considers outliers. The
//! current implementation flags vectors whose distance from the batch
//! centroid exceeds the mean distance by more than [`Z_THRESHOLD`]
//! standard deviations.

use finsight_provider::Embedding;

/// Distance z-score above which a vector is flagged.
const Z_THRESHOLD: f32 = 2.0;

/// Batches smaller than this carry no usable distribution.
const MIN_BATCH: usize = 3;

/// Flag outlier vectors, returning their indices in input order.
pub fn flag_outliers(embeddings: &[Embedding]) -> Vec<usize> {
    if embeddings.len() < MIN_BATCH {
        return Vec::new();
    }

    let dim = embeddings[0].dimension();
    let mut centroid = vec![0.0_f32; dim];
    for emb in embeddings {
        for (c, v) in centroid.iter_mut().zip(emb.values.iter()) {
            *c += v;
        }
    }
    let n = embeddings.len() as f32;
    for c in centroid.iter_mut() {
        *c /= n;
    }
    let centroid = Embedding::new(centroid);

    let distances: Vec<f32> = embeddings.iter().map(|e| e.l2_sq(&centroid).sqrt()).collect();

    let mean = distances.iter().sum::<f32>() / n;
    let variance = distances.iter().map(|d| (d - mean) * (d - mean)).sum::<f32>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return Vec::new();
    }

    distances
        .iter()
        .enumerate()
        .filter(|(_, d)| (*d - mean) / std_dev > Z_THRESHOLD)
        .map(|(i, _)| i)
        .collect()
}
