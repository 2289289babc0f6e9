use super::HeightMap;
use crate::error::FlattenError;

/// Isotropic Gaussian smoothing of a height map.
///
/// Delegates to `imageproc`'s separable `f32` blur, which treats pixels
/// outside the map as equal to the nearest edge pixel. `sigma == 0` returns
/// the input untouched.
pub fn smooth_height(map: HeightMap, sigma: f64) -> Result<HeightMap, FlattenError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(FlattenError::InvalidSigma { sigma });
    }
    let sigma = sigma as f32;
    // imageproc asserts sigma > 0; subnormal sigmas also collapse to 0 in f32.
    // Maps built by `filled` or deserialized may have no pixels.
    if sigma <= 0.0 || map.as_raw().is_empty() {
        return Ok(map);
    }

    let blurred = imageproc::filter::gaussian_blur_f32(&map.into_image(), sigma);
    Ok(HeightMap::from_image(blurred))
}
