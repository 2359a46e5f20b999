//! Compressed audio fixtures built byte by byte
//!
//! No encoder crates are needed: the FLAC frames use verbatim subframes and
//! the Opus packets are the canonical 20 ms CELT silence frame.

/// Sample rate of the FLAC tone fixture
pub const FLAC_SAMPLE_RATE: u32 = 16000;

/// Samples per FLAC frame
pub const FLAC_BLOCK_SIZE: usize = 4096;

/// Opus always decodes at 48 kHz
pub const OPUS_SAMPLE_RATE: u32 = 48000;

/// Samples in one 20 ms Opus frame at 48 kHz
pub const OPUS_FRAME_SAMPLES: u64 = 960;

/// TOC 0xF8 (CELT fullband, 20 ms, mono, one frame) plus a silent payload
const OPUS_SILENCE_PACKET: [u8; 3] = [0xF8, 0xFF, 0xFE];

const OGG_FLAG_BOS: u8 = 0x02;
const OGG_FLAG_EOS: u8 = 0x04;

/// 440 Hz tone as i16 samples
pub fn tone_samples(sample_rate: u32, total_samples: usize) -> Vec<i16> {
    (0..total_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let sample = (t * 440.0 * 2.0 * std::f64::consts::PI).sin() * 0.3;
            (sample * i16::MAX as f64) as i16
        })
        .collect()
}

// =============================================================================
// FLAC
// =============================================================================

fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
        }
    }
    crc
}

fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x8005 } else { crc << 1 };
        }
    }
    crc
}

/// Mono 16-bit 16 kHz FLAC file holding `samples`
///
/// `samples.len()` must be a multiple of [`FLAC_BLOCK_SIZE`] and leave fewer
/// than 128 frames, so each frame number fits in one byte.
pub fn flac_bytes(samples: &[i16]) -> Vec<u8> {
    assert_eq!(samples.len() % FLAC_BLOCK_SIZE, 0);
    let frame_count = samples.len() / FLAC_BLOCK_SIZE;
    assert!(frame_count < 128);

    let mut out = b"fLaC".to_vec();

    // STREAMINFO, flagged as the last metadata block
    out.push(0x80);
    out.extend_from_slice(&34u32.to_be_bytes()[1..]);
    out.extend_from_slice(&(FLAC_BLOCK_SIZE as u16).to_be_bytes());
    out.extend_from_slice(&(FLAC_BLOCK_SIZE as u16).to_be_bytes());
    out.extend_from_slice(&[0u8; 6]); // min/max frame size unknown
    let channels = 1u64;
    let bits_per_sample = 16u64;
    let packed = ((FLAC_SAMPLE_RATE as u64) << 44)
        | ((channels - 1) << 41)
        | ((bits_per_sample - 1) << 36)
        | samples.len() as u64;
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&[0u8; 16]); // MD5 unset

    for (frame_number, block) in samples.chunks(FLAC_BLOCK_SIZE).enumerate() {
        // Fixed blocking, 4096-sample block, 16 kHz, mono, 16 bits
        let mut frame = vec![0xFF, 0xF8, 0xC5, 0x08, frame_number as u8];
        frame.push(crc8(&frame));

        // Verbatim subframe, no wasted bits
        frame.push(0x02);
        for sample in block {
            frame.extend_from_slice(&sample.to_be_bytes());
        }

        let crc = crc16(&frame);
        frame.extend_from_slice(&crc.to_be_bytes());
        out.extend_from_slice(&frame);
    }

    out
}

// =============================================================================
// Ogg Opus
// =============================================================================

fn ogg_crc(data: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in data {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04C1_1DB7
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn ogg_page(header_type: u8, granule: u64, sequence: u32, packets: &[&[u8]]) -> Vec<u8> {
    const SERIAL: u32 = 0x4543_484F;

    let mut lacing = Vec::new();
    for packet in packets {
        let mut remaining = packet.len();
        while remaining >= 255 {
            lacing.push(255u8);
            remaining -= 255;
        }
        lacing.push(remaining as u8);
    }
    assert!(lacing.len() <= 255);

    let mut page = b"OggS".to_vec();
    page.push(0); // version
    page.push(header_type);
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&SERIAL.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&[0u8; 4]); // checksum, filled below
    page.push(lacing.len() as u8);
    page.extend_from_slice(&lacing);
    for packet in packets {
        page.extend_from_slice(packet);
    }

    let crc = ogg_crc(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}

/// Mono Ogg Opus stream of `frames` silent 20 ms frames
pub fn ogg_opus_silence_bytes(frames: usize) -> Vec<u8> {
    assert!(frames > 0 && frames <= 255);

    let mut head = b"OpusHead".to_vec();
    head.push(1); // version
    head.push(1); // channels
    head.extend_from_slice(&0u16.to_le_bytes()); // pre-skip
    head.extend_from_slice(&OPUS_SAMPLE_RATE.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // mapping family

    let vendor = b"echoic-tests";
    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes());

    let audio: Vec<&[u8]> = (0..frames).map(|_| &OPUS_SILENCE_PACKET[..]).collect();
    let granule = frames as u64 * OPUS_FRAME_SAMPLES;

    let mut out = ogg_page(OGG_FLAG_BOS, 0, 0, &[head.as_slice()]);
    out.extend(ogg_page(0, 0, 1, &[tags.as_slice()]));
    out.extend(ogg_page(OGG_FLAG_EOS, granule, 2, &audio));
    out
}
