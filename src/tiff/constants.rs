//! TIFF format constants
//!
//! Constants used throughout the TIFF processing code, replacing magic
//! numbers with descriptive names.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// "MM" byte order marker for big-endian
    pub const BIG_ENDIAN_MARKER: [u8; 2] = [0x4D, 0x4D];

    /// Total size of a classic TIFF header
    pub const HEADER_SIZE: u32 = 8;
}

/// Field types as defined in the TIFF spec
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
}

/// Standard TIFF and TIFF/EP tags
pub mod tags {
    // Basic image structure tags
    pub const IMAGE_WIDTH: u16 = 256;                // Width of the image in pixels
    pub const IMAGE_LENGTH: u16 = 257;               // Height of the image in pixels
    pub const BITS_PER_SAMPLE: u16 = 258;            // Bits per component
    pub const COMPRESSION: u16 = 259;                // Compression scheme
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262; // Color space of image data
    pub const IMAGE_DESCRIPTION: u16 = 270;          // Description of the image
    pub const MAKE: u16 = 271;                       // Camera manufacturer
    pub const MODEL: u16 = 272;                      // Camera model
    pub const STRIP_OFFSETS: u16 = 273;              // Offsets to the data strips
    pub const ORIENTATION: u16 = 274;                // Image orientation
    pub const SAMPLES_PER_PIXEL: u16 = 277;          // Number of components per pixel
    pub const ROWS_PER_STRIP: u16 = 278;             // Rows per strip of data
    pub const STRIP_BYTE_COUNTS: u16 = 279;          // Byte counts for strips
    pub const PLANAR_CONFIG: u16 = 284;              // How components are stored
    pub const SOFTWARE: u16 = 305;                   // Software used to create the image
    pub const DATE_TIME: u16 = 306;                  // Date and time of image creation
    pub const ARTIST: u16 = 315;                     // Person who created the image
    pub const TILE_OFFSETS: u16 = 324;               // Offsets to the data tiles
    pub const TILE_BYTE_COUNTS: u16 = 325;           // Byte counts for tiles
    pub const SUB_IFDS: u16 = 330;                   // Offsets to child IFDs
    pub const JPEG_TABLES: u16 = 347;                // Tables-only JPEG stream
    pub const YCBCR_SUBSAMPLING: u16 = 530;          // Chroma subsampling factors
    pub const COPYRIGHT: u16 = 33432;                // Copyright notice
    pub const EXPOSURE_TIME: u16 = 33434;            // Exposure time in seconds
    pub const ICC_PROFILE: u16 = 34675;              // Embedded ICC profile

    // Metadata sub-directory tags
    pub const EXIF_IFD: u16 = 34665;                 // Offset to the Exif sub-IFD
    pub const GPS_IFD: u16 = 34853;                  // Offset to the GPS sub-IFD
    pub const MAKER_NOTE: u16 = 37500;               // Vendor-specific opaque data
    pub const EXIF_PIXEL_X_DIMENSION: u16 = 40962;   // Valid image width per Exif
    pub const EXIF_PIXEL_Y_DIMENSION: u16 = 40963;   // Valid image height per Exif
    pub const INTEROPERABILITY_IFD: u16 = 40965;     // Offset to the interoperability IFD
}

/// Compression types
pub mod compression {
    pub const NONE: u16 = 1;              // No compression
    pub const JPEG_OLD: u16 = 6;          // Old JPEG (deprecated)
    pub const JPEG: u16 = 7;              // JPEG compression
    pub const DEFLATE: u16 = 8;           // Adobe Deflate (zlib)
    pub const PACKBITS: u16 = 32773;      // PackBits compression
}

/// Photometric interpretation values
pub mod photometric {
    pub const WHITE_IS_ZERO: u16 = 0;     // Minimum value is white
    pub const BLACK_IS_ZERO: u16 = 1;     // Minimum value is black
    pub const RGB: u16 = 2;               // RGB color model
    pub const PALETTE: u16 = 3;           // Palette color (color map indexed)
    pub const CMYK: u16 = 5;              // CMYK color model
    pub const YCBCR: u16 = 6;             // YCbCr color model
}

/// Planar configuration values
pub mod planar_config {
    pub const CHUNKY: u16 = 1;            // Components stored interleaved
    pub const PLANAR: u16 = 2;            // Components stored separately
}
