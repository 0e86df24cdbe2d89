/// Centered moving average over `samples`.
///
/// Windows that run off either end replicate the edge sample, so the
/// output always has the same length as the input. Windows of 0 or 1
/// return the input unchanged; even windows are widened by one.
pub fn moving_average(samples: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || samples.len() < 2 {
        return samples.to_vec();
    }
    let radius = window / 2;
    let last = samples.len() - 1;
    #[allow(clippy::cast_precision_loss)]
    let width = (2 * radius + 1) as f64;
    (0..samples.len())
        .map(|center| {
            let sum: f64 = (0..=2 * radius)
                .map(|offset| {
                    let idx = (center + offset).saturating_sub(radius).min(last);
                    samples[idx]
                })
                .sum();
            sum / width
        })
        .collect()
}
