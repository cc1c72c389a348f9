//! Start-of-frame interpretation
//!
//! Derived fields of a JPEG SOF segment: sample precision, image
//! dimensions, and the per-component sampling layout the planner needs
//! to decide photometric interpretation and chroma subsampling.

use crate::tiff::errors::{WrapError, WrapResult};

/// Per-component data from a start-of-frame segment
#[derive(Debug, Clone, Copy)]
pub struct ComponentInfo {
    /// Component identifier (1 = Y, 2 = Cb, 3 = Cr by convention)
    pub id: u8,
    /// Packed sampling factors: horizontal in the high nibble,
    /// vertical in the low nibble
    pub sampling_factors: u8,
    /// Quantization table selector
    pub quant_table: u8,
}

/// Fields decoded from a start-of-frame payload
#[derive(Debug, Clone)]
pub struct FrameInfo {
    /// Bits per sample
    pub precision: u8,
    /// Image width in pixels
    pub width: u16,
    /// Image height (number of lines)
    pub length: u16,
    /// One entry per frame component
    pub components: Vec<ComponentInfo>,
}

impl FrameInfo {
    /// Parses the payload of an SOF segment (marker bytes included)
    ///
    /// Layout: marker (2), segment length (2), precision (1),
    /// number of lines (2), width (2), component count (1), then three
    /// bytes per component.
    pub fn parse(data: &[u8]) -> WrapResult<Self> {
        if data.len() < 10 {
            return Err(WrapError::GenericError(
                "Start-of-frame segment is too short".to_string(),
            ));
        }
        let precision = data[4];
        let length = u16::from_be_bytes([data[5], data[6]]);
        let width = u16::from_be_bytes([data[7], data[8]]);
        let num_components = data[9] as usize;

        if data.len() != 10 + 3 * num_components {
            return Err(WrapError::GenericError(format!(
                "Start-of-frame segment length {} does not match {} components",
                data.len(),
                num_components
            )));
        }

        let mut components = Vec::with_capacity(num_components);
        for i in 0..num_components {
            components.push(ComponentInfo {
                id: data[10 + 3 * i],
                sampling_factors: data[11 + 3 * i],
                quant_table: data[12 + 3 * i],
            });
        }

        Ok(FrameInfo { precision, width, length, components })
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Horizontal sampling factor of the given component
    pub fn horizontal_sampling(&self, component: usize) -> u8 {
        self.components[component].sampling_factors >> 4
    }

    /// Vertical sampling factor of the given component
    pub fn vertical_sampling(&self, component: usize) -> u8 {
        self.components[component].sampling_factors & 0x0F
    }
}
