//! TIFF tag utilities
//!
//! Name lookups for tags and field types, used in diagnostics and in
//! the analyze output.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::io::byte_order;
use crate::tiff::constants::{compression, field_types, photometric, tags};
use crate::tiff::entry::TiffDirEntry;

lazy_static! {
    /// Tag-id to tag-name registry
    static ref TAG_NAMES: HashMap<u16, &'static str> = {
        let mut names = HashMap::new();
        names.insert(tags::IMAGE_WIDTH, "ImageWidth");
        names.insert(tags::IMAGE_LENGTH, "ImageLength");
        names.insert(tags::BITS_PER_SAMPLE, "BitsPerSample");
        names.insert(tags::COMPRESSION, "Compression");
        names.insert(tags::PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation");
        names.insert(tags::IMAGE_DESCRIPTION, "ImageDescription");
        names.insert(tags::MAKE, "Make");
        names.insert(tags::MODEL, "Model");
        names.insert(tags::STRIP_OFFSETS, "StripOffsets");
        names.insert(tags::ORIENTATION, "Orientation");
        names.insert(tags::SAMPLES_PER_PIXEL, "SamplesPerPixel");
        names.insert(tags::ROWS_PER_STRIP, "RowsPerStrip");
        names.insert(tags::STRIP_BYTE_COUNTS, "StripByteCounts");
        names.insert(tags::PLANAR_CONFIG, "PlanarConfiguration");
        names.insert(tags::SOFTWARE, "Software");
        names.insert(tags::DATE_TIME, "DateTime");
        names.insert(tags::ARTIST, "Artist");
        names.insert(tags::TILE_OFFSETS, "TileOffsets");
        names.insert(tags::TILE_BYTE_COUNTS, "TileByteCounts");
        names.insert(tags::SUB_IFDS, "SubIFDs");
        names.insert(tags::JPEG_TABLES, "JPEGTables");
        names.insert(tags::YCBCR_SUBSAMPLING, "YCbCrSubSampling");
        names.insert(tags::COPYRIGHT, "Copyright");
        names.insert(tags::EXPOSURE_TIME, "ExposureTime");
        names.insert(tags::ICC_PROFILE, "IccProfile");
        names.insert(tags::EXIF_IFD, "ExifIFD");
        names.insert(tags::GPS_IFD, "GPSIFD");
        names.insert(tags::MAKER_NOTE, "MakerNote");
        names.insert(tags::EXIF_PIXEL_X_DIMENSION, "PixelXDimension");
        names.insert(tags::EXIF_PIXEL_Y_DIMENSION, "PixelYDimension");
        names.insert(tags::INTEROPERABILITY_IFD, "InteroperabilityIFD");
        names
    };
}

/// Returns a human-readable name for a tag, or "Unknown"
pub fn get_tag_name(tag: u16) -> &'static str {
    TAG_NAMES.get(&tag).copied().unwrap_or("Unknown")
}

/// Returns a human-readable name for a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        _ => "Unknown",
    }
}

/// Returns a human-readable name for a compression code
pub fn get_compression_name(code: u16) -> &'static str {
    match code {
        compression::NONE => "None",
        compression::JPEG_OLD => "Old JPEG",
        compression::JPEG => "JPEG",
        compression::DEFLATE => "Adobe Deflate",
        compression::PACKBITS => "PackBits",
        _ => "Unknown",
    }
}

/// Returns a human-readable name for a photometric interpretation code
pub fn get_photometric_name(code: u16) -> &'static str {
    match code {
        photometric::WHITE_IS_ZERO => "WhiteIsZero",
        photometric::BLACK_IS_ZERO => "BlackIsZero",
        photometric::RGB => "RGB",
        photometric::PALETTE => "Palette",
        photometric::CMYK => "CMYK",
        photometric::YCBCR => "YCbCr",
        _ => "Unknown",
    }
}

/// Formats a directory entry for diagnostics
pub fn describe_entry(entry: &TiffDirEntry) -> String {
    let value = match entry.datatype() {
        field_types::SSHORT => byte_order::get_i16(&entry.four_bytes(), entry.endianness()).to_string(),
        field_types::SLONG => byte_order::get_i32(&entry.four_bytes(), entry.endianness()).to_string(),
        _ => entry.integer_value().to_string(),
    };
    format!(
        "Tag {} ({}), type {} ({}), count {}, value/offset {}",
        entry.tag(),
        get_tag_name(entry.tag()),
        entry.datatype(),
        get_field_type_name(entry.datatype()),
        entry.count(),
        value
    )
}
