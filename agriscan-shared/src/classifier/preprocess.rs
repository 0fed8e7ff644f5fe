//! Image preprocessing
//!
//! Raw upload bytes → RGB8 → square resize to the model input size →
//! `f32` in `[0, 1]` laid out as the model expects (NHWC or NCHW, batch 1).

use super::error::ClassifierError;
use image::imageops::FilterType;
use ndarray::Array4;
use std::str::FromStr;

/// Channel layout of the model's image input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[1, size, size, 3]`
    Nhwc,

    /// `[1, 3, size, size]`
    Nchw,
}

/// Shape of the model's single image input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Side length of the square input
    pub size: u32,

    /// Channel layout
    pub layout: TensorLayout,
}

impl InputSpec {
    /// Derives the input spec from a declared 4-D input shape
    ///
    /// A trailing dimension of 3 means NHWC, a second dimension of 3 means
    /// NCHW. Spatial dimensions must be static, positive and equal.
    pub fn from_shape(shape: &[i64]) -> Result<Self, ClassifierError> {
        let invalid = || {
            ClassifierError::ModelLoad(format!(
                "unsupported input shape {:?}, expected [1,S,S,3] or [1,3,S,S]",
                shape
            ))
        };

        if shape.len() != 4 {
            return Err(invalid());
        }

        let (layout, height, width) = if shape[3] == 3 {
            (TensorLayout::Nhwc, shape[1], shape[2])
        } else if shape[1] == 3 {
            (TensorLayout::Nchw, shape[2], shape[3])
        } else {
            return Err(invalid());
        };

        if height <= 0 || height != width || height > u32::MAX as i64 {
            return Err(invalid());
        }

        Ok(Self {
            size: height as u32,
            layout,
        })
    }

    /// Tensor dimensions for a batch of one
    pub fn dims(&self) -> [usize; 4] {
        let s = self.size as usize;
        match self.layout {
            TensorLayout::Nhwc => [1, s, s, 3],
            TensorLayout::Nchw => [1, 3, s, s],
        }
    }
}

/// Resampling filter used when resizing to the model input size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest neighbour
    Nearest,

    /// Bilinear
    #[default]
    Bilinear,
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "bilinear" => Ok(ResizeFilter::Bilinear),
            other => Err(format!("unknown resize filter '{}'", other)),
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Decodes an uploaded image into the model's input tensor
///
/// # Errors
///
/// `Decode` if the bytes are not an image in a supported format.
pub fn preprocess(
    bytes: &[u8],
    spec: &InputSpec,
    filter: ResizeFilter,
) -> Result<Array4<f32>, ClassifierError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ClassifierError::Decode(e.to_string()))?;

    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, spec.size, spec.size, filter.into());

    let mut tensor = Array4::<f32>::zeros(spec.dims());
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let value = f32::from(pixel[c]) / 255.0;
            match spec.layout {
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
            }
        }
    }

    Ok(tensor)
}
