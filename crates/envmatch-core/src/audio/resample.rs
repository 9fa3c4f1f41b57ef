//! Linear-interpolation resampling
//!
//! Envelope peaks are taken over whole seconds, so a simple interpolator is
//! enough; only the number of samples per second has to be exact.

use anyhow::Result;

/// Resample mono audio from `from_rate` to `to_rate`
pub fn resample_to_target(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        anyhow::bail!("Cannot resample {}Hz -> {}Hz", from_rate, to_rate);
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = from_rate as f64 / to_rate as f64;
    // Integer ceil keeps whole seconds whole
    let output_len = (samples.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;
    let last = samples.len() - 1;

    let output = (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let idx = (src_pos.floor() as usize).min(last);
            let frac = (src_pos - idx as f64) as f32;
            match samples.get(idx + 1) {
                Some(&next) => samples[idx] * (1.0 - frac) + next * frac,
                None => samples[idx],
            }
        })
        .collect();

    Ok(output)
}
