//! Mono sample rate conversion using rubato

use anyhow::{anyhow, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

/// Resample mono audio from `input_rate` to `output_rate`
///
/// Returns a copy when the rates already match. The whole buffer is
/// processed as one chunk; recordings are short.
pub fn resample_mono(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }
    if input_rate == 0 {
        return Err(anyhow!("Input sample rate is zero"));
    }

    debug!("Resampling from {}Hz to {}Hz", input_rate, output_rate);

    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0, // no runtime ratio changes
        PolynomialDegree::Septic,
        input.len(),
        1,
    )
    .map_err(|e| anyhow!("Failed to create resampler: {}", e))?;

    let planar_input = vec![input.to_vec()];
    let mut output = resampler
        .process(&planar_input, None)
        .map_err(|e| anyhow!("Resampling failed: {}", e))?;

    Ok(output.pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_copy() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_mono(&input, 16000, 16000).unwrap(), input);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample_mono(&[], 4000, 8000).unwrap().is_empty());
    }

    #[test]
    fn test_upsampling_doubles_length_roughly() {
        let input: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let output = resample_mono(&input, 4000, 8000).unwrap();

        let expected = input.len() * 2;
        let diff = (output.len() as i64 - expected as i64).abs();
        assert!(diff < 64, "got {} samples, expected about {}", output.len(), expected);
    }
}
