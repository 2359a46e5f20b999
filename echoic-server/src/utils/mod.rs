//! Audio utilities for echoic-server

pub mod audio_decoder;
pub mod resampler;
pub mod wav;

pub use audio_decoder::{codec_registry, decode_audio_file, DecodedAudio};
pub use resampler::resample_mono;
pub use wav::{read_wav_mono, write_wav_mono_i16, MonoWav};
