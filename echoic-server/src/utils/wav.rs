//! WAV reading and writing via hound

use anyhow::{Context, Result};
use std::path::Path;

/// Mono samples read back from a WAV file
#[derive(Debug)]
pub struct MonoWav {
    /// Samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Read a WAV file of any PCM layout and average it down to mono
pub fn read_wav_mono(path: &Path) -> Result<MonoWav> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("Corrupt WAV data in {}", path.display()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("Corrupt WAV data in {}", path.display()))?
        }
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok(MonoWav {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write mono 16-bit PCM WAV
pub fn write_wav_mono_i16(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(to_i16(sample))?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;

    Ok(())
}

/// Convert a [-1.0, 1.0] float sample to i16, clamping out-of-range input
pub fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<f32> = (0..1600).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect();

        write_wav_mono_i16(&path, &samples, 16000).unwrap();
        let wav = read_wav_mono(&path).unwrap();

        assert_eq!(wav.sample_rate, 16000);
        assert_eq!(wav.samples.len(), samples.len());
        for (a, b) in samples.iter().zip(&wav.samples) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_not_a_wav_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.wav");
        std::fs::write(&path, b"webm bytes pretending to be wav").unwrap();

        assert!(read_wav_mono(&path).is_err());
    }

    #[test]
    fn test_to_i16_clamps() {
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-2.0), -i16::MAX);
        assert_eq!(to_i16(0.0), 0);
    }
}
