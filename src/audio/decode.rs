use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Result, SpectraError};

/// Single-channel signal as loaded from disk: samples in [-1, 1] plus the
/// source sample rate. Consumed by the analyzer and discarded afterwards.
#[derive(Debug)]
pub struct SignalData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SignalData {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn duration_ms(&self) -> u64 {
        (self.duration_seconds() * 1000.0).round() as u64
    }
}

/// Reads a PCM audio file into a normalized single-channel sample sequence.
///
/// Multi-channel sources keep only the first channel of each interleaved
/// frame; the rest is discarded rather than averaged. Integer PCM is scaled
/// to [-1, 1] by the decoder (s16 divides by 2^15).
pub fn decode_signal(path: &Path) -> Result<SignalData> {
    let file = std::fs::File::open(path)
        .map_err(|e| SpectraError::unreadable(path, e.to_string()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SpectraError::unreadable(path, format!("probe failed: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| SpectraError::unreadable(path, "no audio tracks found"))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| SpectraError::unreadable(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SpectraError::unreadable(path, format!("no decoder: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(SpectraError::unreadable(path, e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(SpectraError::unreadable(path, e.to_string())),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        // First channel only; stereo content panned away from channel 0 is a
        // known simplification.
        samples.extend(sample_buf.samples().chunks(channels).map(|frame| frame[0]));
    }

    if samples.is_empty() {
        return Err(SpectraError::unreadable(path, "no audio samples decoded"));
    }

    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.1}s ({} channel(s), kept first)",
        samples.len(),
        sample_rate,
        samples.len() as f32 / sample_rate as f32,
        channels
    );

    Ok(SignalData {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("spectra-decode-{}-{}", std::process::id(), name));
        path
    }

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let data_len = (samples.len() * 2) as u32;
        let byte_rate = sample_rate * u32::from(channels) * 2;
        let block_align = channels * 2;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }

        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(&bytes).unwrap();
    }

    #[test]
    fn decodes_mono_wav_with_scaling() {
        let path = temp_path("mono.wav");
        write_wav(&path, 8000, 1, &[0, 16384, -16384, 32767]);

        let signal = decode_signal(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(signal.sample_rate, 8000);
        assert_eq!(signal.samples.len(), 4);
        assert!(signal.samples[0].abs() < 1e-6);
        assert!((signal.samples[1] - 0.5).abs() < 1e-6);
        assert!((signal.samples[2] + 0.5).abs() < 1e-6);
        assert!(signal.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn stereo_keeps_first_channel_only() {
        let path = temp_path("stereo.wav");
        // Channel 0 is a ramp, channel 1 is silence.
        let interleaved = vec![100, 0, 200, 0, 300, 0, 400, 0];
        write_wav(&path, 44100, 2, &interleaved);

        let signal = decode_signal(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(signal.samples.len(), 4);
        for (i, sample) in signal.samples.iter().enumerate() {
            let expected = (100 * (i as i32 + 1)) as f32 / 32768.0;
            assert!((sample - expected).abs() < 1e-6, "sample {i}");
        }
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = decode_signal(Path::new("/nonexistent/audio.wav")).unwrap_err();
        assert!(matches!(err, SpectraError::UnreadableFile { .. }));
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let path = temp_path("garbage.wav");
        std::fs::write(&path, b"this is not audio data at all").unwrap();

        let err = decode_signal(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, SpectraError::UnreadableFile { .. }));
    }

    #[test]
    fn duration_helpers() {
        let signal = SignalData {
            samples: vec![0.0; 44100],
            sample_rate: 44100,
        };
        assert!((signal.duration_seconds() - 1.0).abs() < 1e-9);
        assert_eq!(signal.duration_ms(), 1000);
    }
}
