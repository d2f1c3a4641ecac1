//! Decoded audio buffers and the decoders that produce them.
//!
//! A decoded track is held as planar `f32` channels in `[-1.0, 1.0]`, the
//! layout the envelope extractor and the playback backend both consume. WAV
//! is decoded with hound, FLAC with claxon, and anything else (MP3, Ogg
//! Vorbis) is handed to symphonia's probe.

use std::io::Cursor;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{LoadError, LoadResult};

/// Fully decoded audio with one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// Longer channels are truncated to the length of the shortest one.
    pub fn new(sample_rate: u32, mut channels: Vec<Vec<f32>>) -> LoadResult<Self> {
        if channels.is_empty() || sample_rate == 0 {
            return Err(LoadError::NoAudio);
        }
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(frames);
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Split interleaved samples into planar channels.
    pub fn from_interleaved(sample_rate: u32, channels: usize, samples: &[f32]) -> LoadResult<Self> {
        if channels == 0 {
            return Err(LoadError::NoAudio);
        }
        let mut planar = vec![Vec::with_capacity(samples.len() / channels); channels];
        for frame in samples.chunks_exact(channels) {
            for (channel, &sample) in planar.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(sample_rate, planar)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Interleave channels back into L,R,L,R… order for playback.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}

/// Turns raw file bytes into an [`AudioBuffer`].
pub trait AudioDecoder {
    /// `hint` is the lowercase file extension of the source, when known.
    fn decode(&self, bytes: Vec<u8>, hint: Option<&str>) -> LoadResult<AudioBuffer>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Wav,
    Flac,
    Other,
}

fn detect_container(bytes: &[u8], hint: Option<&str>) -> Container {
    if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WAVE") {
        return Container::Wav;
    }
    if bytes.starts_with(b"fLaC") {
        return Container::Flac;
    }
    match hint {
        Some("wav") => Container::Wav,
        Some("flac") => Container::Flac,
        _ => Container::Other,
    }
}

/// Default decoder picking a backend from the stream's magic bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatDecoder;

impl AudioDecoder for FormatDecoder {
    fn decode(&self, bytes: Vec<u8>, hint: Option<&str>) -> LoadResult<AudioBuffer> {
        let buffer = match detect_container(&bytes, hint) {
            Container::Wav => decode_wav(bytes)?,
            Container::Flac => decode_flac(bytes)?,
            Container::Other => decode_symphonia(bytes, hint)?,
        };
        log::debug!(
            "Decoded {} frames, {} channel(s) at {} Hz",
            buffer.frames(),
            buffer.channel_count(),
            buffer.sample_rate()
        );
        Ok(buffer)
    }
}

fn decode_error(e: impl std::fmt::Display) -> LoadError {
    LoadError::Decode(e.to_string())
}

fn decode_wav(bytes: Vec<u8>) -> LoadResult<AudioBuffer> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(decode_error)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<_, _>>()
                .map_err(decode_error)?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_error)?,
    };

    AudioBuffer::from_interleaved(spec.sample_rate, spec.channels as usize, &samples)
}

fn decode_flac(bytes: Vec<u8>) -> LoadResult<AudioBuffer> {
    let mut reader = claxon::FlacReader::new(Cursor::new(bytes)).map_err(decode_error)?;
    let info = reader.streaminfo();
    let max_value = (1i64 << (info.bits_per_sample - 1)) as f32;

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|s| s as f32 / max_value))
        .collect::<Result<_, _>>()
        .map_err(decode_error)?;

    AudioBuffer::from_interleaved(info.sample_rate, info.channels as usize, &samples)
}

fn decode_symphonia(bytes: Vec<u8>, hint: Option<&str>) -> LoadResult<AudioBuffer> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut probe_hint = Hint::new();
    if let Some(ext) = hint {
        probe_hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &probe_hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_error)?;

    let mut format = probed.format;
    let track = format.default_track().ok_or(LoadError::NoAudio)?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_error)?;

    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(decode_error(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count());
                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(sample_buf.samples());
            }
            // A corrupt frame is skipped, the rest of the stream still plays
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet: {e}");
            }
            Err(e) => return Err(decode_error(e)),
        }
    }

    match (sample_rate, channels) {
        (Some(rate), Some(count)) if !samples.is_empty() => {
            AudioBuffer::from_interleaved(rate, count, &samples)
        }
        _ => Err(LoadError::NoAudio),
    }
}
