/// Exact sample count for a clip of `clip_seconds` at `sample_rate`.
pub fn target_len(sample_rate: u32, clip_seconds: f32) -> usize {
    (sample_rate as f64 * clip_seconds as f64).round().max(0.0) as usize
}

/// Truncate from the start or zero-pad at the end to exactly `target_len` samples.
pub fn fit_to_length(samples: &[f32], target_len: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(target_len);
    let take = samples.len().min(target_len);
    out.extend_from_slice(&samples[..take]);
    out.resize(target_len, 0.0);
    out
}
