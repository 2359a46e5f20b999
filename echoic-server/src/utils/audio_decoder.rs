//! Audio decoding to mono f32 PCM
//!
//! Uses symphonia for format-agnostic decoding (MP3, FLAC, AAC/M4A, Vorbis,
//! Opus, WAV, ...). Multi-channel audio is averaged down to mono.
//!
//! Browser recordings are usually Opus in Ogg or WebM. symphonia has no Opus
//! decoder of its own, so libopus is registered through
//! `symphonia-adapter-libopus`.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::OnceLock;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CodecRegistry, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use symphonia_adapter_libopus::OpusDecoder;

/// Codec registry with Opus ahead of symphonia's enabled codecs
pub fn codec_registry() -> &'static CodecRegistry {
    static CODEC_REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();
    CODEC_REGISTRY.get_or_init(|| {
        let mut registry = CodecRegistry::new();
        registry.register_all::<OpusDecoder>();
        symphonia::default::register_enabled_codecs(&mut registry);
        registry
    })
}

/// Decoded audio result
#[derive(Debug)]
pub struct DecodedAudio {
    /// Mono audio samples (f32, range [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Original channel count
    pub channels: usize,
    /// Duration in seconds
    pub duration_seconds: f64,
}

/// Decode an audio file to mono f32 samples
///
/// # Errors
/// * File I/O errors
/// * Unsupported container or codec
/// * Corrupt stream (unrecoverable read errors)
pub fn decode_audio_file(file_path: &Path) -> Result<DecodedAudio> {
    tracing::debug!(path = %file_path.display(), "Decoding audio file");

    let file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open audio file: {}", file_path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Extension is only a hint; the probe still sniffs the container
    let mut hint = Hint::new();
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio file: {}", file_path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate unknown")?;
    let channel_count = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = codec_registry()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Failed to create decoder for: {}", file_path.display()))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(anyhow::anyhow!("Error reading packet: {}", e));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_mono(&decoded, &mut samples),
            // A single corrupt frame is skipped, not fatal
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!(path = %file_path.display(), error = %e, "Skipping undecodable packet");
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to decode packet in: {}", file_path.display())
                });
            }
        }
    }

    let duration_seconds = samples.len() as f64 / sample_rate as f64;

    tracing::debug!(
        path = %file_path.display(),
        sample_rate = sample_rate,
        channels = channel_count,
        duration_seconds = format!("{:.2}", duration_seconds),
        "Audio decoding complete"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels: channel_count,
        duration_seconds,
    })
}

/// Average all channels of a decoded buffer and append to `out`
fn append_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => mix_down(&**buf, out),
        AudioBufferRef::U16(buf) => mix_down(&**buf, out),
        AudioBufferRef::U24(buf) => mix_down(&**buf, out),
        AudioBufferRef::U32(buf) => mix_down(&**buf, out),
        AudioBufferRef::S8(buf) => mix_down(&**buf, out),
        AudioBufferRef::S16(buf) => mix_down(&**buf, out),
        AudioBufferRef::S24(buf) => mix_down(&**buf, out),
        AudioBufferRef::S32(buf) => mix_down(&**buf, out),
        AudioBufferRef::F32(buf) => mix_down(&**buf, out),
        AudioBufferRef::F64(buf) => mix_down(&**buf, out),
    }
}

fn mix_down<S: Sample>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    if num_channels == 0 {
        return;
    }

    out.reserve(buf.frames());
    for frame_idx in 0..buf.frames() {
        let sum: f32 = (0..num_channels)
            .map(|ch| f32::from_sample(buf.chan(ch)[frame_idx]))
            .sum();
        out.push(sum / num_channels as f32);
    }
}
