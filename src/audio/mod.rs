pub mod resample;

pub use resample::resample;

use std::io::Read;
use std::path::Path;

use crate::error::DataPrepError;

/// Decode an audio file into mono f32 samples plus its native sample rate.
///
/// The container is detected from the file's magic bytes; WAV and FLAC are
/// supported. Multi-channel audio is downmixed by per-frame averaging.
pub fn load_audio(path: &Path) -> Result<(Vec<f32>, u32), DataPrepError> {
    let mut file = std::fs::File::open(path).map_err(|e| DataPrepError::audio_read(path, e))?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .map_err(|e| DataPrepError::audio_read(path, e))?;
    drop(file);

    match &magic {
        b"RIFF" => read_wav(path),
        b"fLaC" => read_flac(path),
        _ => Err(DataPrepError::audio_read(path, "unsupported audio container")),
    }
}

fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), DataPrepError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| DataPrepError::audio_read(path, e))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let sample_rate = spec.sample_rate;

    let mut interleaved = Vec::with_capacity(reader.len() as usize);
    match spec.sample_format {
        hound::SampleFormat::Float => {
            for sample in reader.samples::<f32>() {
                interleaved.push(sample.map_err(|e| DataPrepError::audio_read(path, e))?);
            }
        }
        hound::SampleFormat::Int => {
            let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            for sample in reader.samples::<i32>() {
                let value = sample.map_err(|e| DataPrepError::audio_read(path, e))?;
                interleaved.push(value as f32 / max);
            }
        }
    }

    Ok((downmix_to_mono(interleaved, channels), sample_rate))
}

fn read_flac(path: &Path) -> Result<(Vec<f32>, u32), DataPrepError> {
    let mut reader = claxon::FlacReader::open(path).map_err(|e| DataPrepError::audio_read(path, e))?;
    let streaminfo = reader.streaminfo();
    let channels = streaminfo.channels as usize;
    let sample_rate = streaminfo.sample_rate;
    let bits_per_sample = streaminfo.bits_per_sample as i32;
    let scale = if bits_per_sample > 1 {
        ((1_i64 << (bits_per_sample - 1)) - 1) as f32
    } else {
        1.0
    };

    if channels == 0 {
        return Err(DataPrepError::audio_read(path, "FLAC has zero channels"));
    }

    let mut interleaved = Vec::new();
    for sample in reader.samples() {
        let value = sample.map_err(|e| DataPrepError::audio_read(path, e))?;
        interleaved.push(value as f32 / scale);
    }

    Ok((downmix_to_mono(interleaved, channels), sample_rate))
}

fn downmix_to_mono(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
