// src/core/decoder.rs
//
// Audio file decoding into AudioData via Symphonia.

use anyhow::{anyhow, bail, Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::audio::AudioData;

const SUPPORTED_EXTENSIONS: [&str; 8] = ["wav", "flac", "mp3", "ogg", "m4a", "aac", "aiff", "aif"];

/// Decoded samples plus what the container reported about them
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples in [-1.0, 1.0]
    pub audio: AudioData,
    /// Sample rate in Hz as stored in the file
    pub sample_rate: u32,
    /// Codec name as reported by the container
    pub codec_name: String,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.audio.duration_secs()
    }
}

/// First decodable track of an opened file
struct OpenTrack {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    codec_name: String,
}

fn open_track(path: &Path) -> Result<OpenTrack> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let reader = symphonia::default::get_probe()
        .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Unrecognised audio format: {}", path.display()))?
        .format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow!("No decodable audio track in {}", path.display()))?;
    let params = track.codec_params.clone();
    let track_id = track.id;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| anyhow!("No sample rate in {}", path.display()))?;
    // Some containers only reveal the channel layout in the first packet
    let channels = params.channels.map(|c| c.count()).unwrap_or(0);

    let decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .context("Unsupported codec")?;

    Ok(OpenTrack {
        reader,
        decoder,
        track_id,
        sample_rate,
        channels,
        codec_name: format!("{:?}", params.codec),
    })
}

/// Decode an audio file to interleaved `f64` samples
pub fn decode_audio(path: &Path) -> Result<DecodedAudio> {
    let OpenTrack {
        mut reader,
        mut decoder,
        track_id,
        sample_rate,
        mut channels,
        codec_name,
    } = open_track(path)?;

    let mut samples: Vec<f64> = Vec::new();
    let mut scratch: Option<SampleBuffer<f64>> = None;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e).context("Failed reading packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let block = match decoder.decode(&packet) {
            Ok(block) => block,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(e).context("Failed decoding packet"),
        };

        if scratch.is_none() {
            let spec = *block.spec();
            channels = spec.channels.count();
            scratch = Some(SampleBuffer::new(block.capacity() as u64, spec));
        }
        if let Some(buffer) = scratch.as_mut() {
            buffer.copy_interleaved_ref(block);
            samples.extend_from_slice(buffer.samples());
        }
    }

    if skipped_packets > 0 {
        log::warn!("{}: skipped {} corrupt packet(s)", path.display(), skipped_packets);
    }
    if samples.is_empty() {
        bail!("No audio samples decoded from {}", path.display());
    }
    if channels == 0 {
        bail!("{} reports 0 audio channels", path.display());
    }

    let audio = AudioData::from_samples(samples, channels, f64::from(sample_rate))
        .with_context(|| format!("Decoded audio is malformed: {}", path.display()))?;

    Ok(DecodedAudio {
        audio,
        sample_rate,
        codec_name,
    })
}

/// True for file extensions the decoder is built to handle
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
