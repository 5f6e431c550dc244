use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::DataPrepError;

/// Convert mono samples from one rate to another with deterministic sinc
/// interpolation. When the rates already match the input is returned
/// unchanged without touching the resampler.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>, DataPrepError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let input_len = samples.len();
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input_len, 1)
        .map_err(|e| DataPrepError::runtime("construct resampler", e))?;
    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| DataPrepError::runtime("resample audio", e))?;
    Ok(output.remove(0))
}
