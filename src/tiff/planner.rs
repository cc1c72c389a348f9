//! TIFF layout planner
//!
//! Synthesizes the output layout from a parsed JPEG segment list: the
//! TIFF header, the embedded JPEG strip, the tables-only JPEG stream,
//! the reassembled ICC profile, the Exif and GPS sub-IFDs with their
//! external data, and finally the main IFD. A single monotonically
//! increasing offset cursor drives the layout; every segment except the
//! final directory is appended with two-byte alignment.

use log::{debug, info, warn};

use crate::io::byte_order::{self, ByteOrder};
use crate::jpeg::markers;
use crate::metadata::exif::{read_app1_metadata, DirectoryInfo, ExifInfo};
use crate::metadata::icc::read_icc_profile;
use crate::segment::{FrameInfo, Segment, SegmentKind, SegmentList};
use crate::tiff::constants::{compression, field_types, photometric, planar_config, tags};
use crate::tiff::entry::TiffDirEntry;
use crate::tiff::errors::{WrapError, WrapResult};
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Decides whether a source directory entry is copied into the output
type SelectorFn = fn(u16, u16) -> bool;

/// Entries copied from the source Exif sub-IFD
fn relevant_exif_tags(tag: u16, _datatype: u16) -> bool {
    tag != tags::SUB_IFDS
        && tag != tags::MAKER_NOTE
        && tag != tags::EXIF_PIXEL_X_DIMENSION
        && tag != tags::EXIF_PIXEL_Y_DIMENSION
        && tag != tags::INTEROPERABILITY_IFD
}

/// Entries copied from the source GPS sub-IFD
fn relevant_gps_tags(tag: u16, _datatype: u16) -> bool {
    tag != tags::SUB_IFDS && tag != tags::INTEROPERABILITY_IFD
}

/// Entries copied from the source Exif main directory into the output
/// main IFD: orientation, exposure time, and any ASCII entry
fn relevant_main_directory_tags(tag: u16, datatype: u16) -> bool {
    if tag == tags::SUB_IFDS || tag == tags::INTEROPERABILITY_IFD {
        return false;
    }
    if tag == tags::ORIENTATION || tag == tags::EXPOSURE_TIME {
        return true;
    }
    datatype == field_types::ASCII
}

/// Planner for the output TIFF layout
pub struct TiffPlanner<'a> {
    /// Logger instance
    logger: &'a Logger,
}

impl<'a> TiffPlanner<'a> {
    /// Creates a new planner
    pub fn new(logger: &'a Logger) -> Self {
        TiffPlanner { logger }
    }

    /// Plans the complete output layout for a parsed JPEG segment list
    ///
    /// Fails when the source is not a baseline-DCT JPEG, when its
    /// metadata is malformed, or when the frame's subsampling cannot be
    /// expressed in a TIFF directory.
    pub fn plan(&self, source: &SegmentList) -> WrapResult<SegmentList> {
        let file_endian = ByteOrder::LittleEndian;

        match source.first() {
            Some(segment) if matches!(segment.kind, SegmentKind::Soi) => {}
            _ => return Err(WrapError::NotJpeg),
        }

        // Baseline DCT only: the start-of-frame marker must be ff c0
        for segment in source.iter() {
            if matches!(segment.kind, SegmentKind::StartOfFrame) && segment.data[1] != markers::SOF0 {
                return Err(WrapError::UnsupportedFrame(segment.data[1]));
            }
        }

        let mut out = SegmentList::new();
        let mut offset = out.push_padded(Segment::tiff_header(0, file_endian));

        // ------------------------------------------------------------------
        //              Embedded image
        // ------------------------------------------------------------------

        let strip_start = offset;
        let mut frame: Option<FrameInfo> = None;

        offset = out.push_padded(Segment::soi(offset));
        for segment in source.iter() {
            match segment.kind {
                SegmentKind::StartOfFrame
                | SegmentKind::StartOfScan
                | SegmentKind::RestartInterval
                | SegmentKind::ImageData => {
                    if matches!(segment.kind, SegmentKind::StartOfFrame) {
                        frame = Some(FrameInfo::parse(&segment.data)?);
                    }
                    offset = out.push_padded(segment.clone_at(offset));
                }
                _ => {}
            }
        }
        offset = out.push_padded(Segment::eoi(offset));
        let strip_end = offset;

        let frame = frame.ok_or_else(|| {
            WrapError::GenericError("No start-of-frame segment found in the JPEG stream".to_string())
        })?;
        let num_components = frame.num_components();
        if num_components != 1 && num_components <= 2 {
            return Err(WrapError::GenericError(
                "Two-component images are not supported".to_string(),
            ));
        }
        info!("Embedded image: {}x{}, {} bits, {} components, {} bytes",
              frame.width, frame.length, frame.precision, num_components,
              strip_end - strip_start);

        // ------------------------------------------------------------------
        //              JPEG tables stream
        // ------------------------------------------------------------------

        let jpeg_tables_start = offset;
        offset = out.push_padded(Segment::soi(offset));
        for segment in source.iter() {
            if matches!(
                segment.kind,
                SegmentKind::QuantizationTable | SegmentKind::HuffmanTable
            ) {
                offset = out.push_padded(segment.clone_at(offset));
            }
        }
        offset = out.push_padded(Segment::eoi(offset));
        let jpeg_tables_end = offset;

        // ------------------------------------------------------------------
        //              ICC profile
        // ------------------------------------------------------------------

        let icc_begin = offset;
        let app2_payloads: Vec<&[u8]> = source
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::App2))
            .map(|s| s.data.as_slice())
            .collect();
        if !app2_payloads.is_empty() {
            let profile = read_icc_profile(&app2_payloads)?;
            if !profile.is_empty() {
                info!("Reassembled ICC profile: {} bytes", profile.len());
                offset = out.push_padded(
                    Segment::byte_vector(offset, file_endian, profile).with_label("IccProfile"),
                );
            }
        }
        let icc_end = offset;

        // ------------------------------------------------------------------
        //              APP1 metadata
        // ------------------------------------------------------------------

        let app1_payloads: Vec<&[u8]> = source
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::App1))
            .map(|s| s.data.as_slice())
            .collect();
        let exif_info = if app1_payloads.is_empty() {
            ExifInfo::default()
        } else {
            read_app1_metadata(&app1_payloads)?
        };
        let exif_endian = exif_info.endianness;

        let mut exif_dir_offset = 0u32;
        if !exif_info.exif_dir.is_empty() {
            let entries = self.write_selected_entries(
                &exif_info.exif_dir, &mut out, exif_endian, file_endian, relevant_exif_tags);
            exif_dir_offset = out.next_offset();
            offset = out.push_padded(
                Segment::tiff_directory(exif_dir_offset, file_endian, entries)
                    .with_label("Exif sub-IFD"),
            );
            debug!("Exif sub-IFD at offset {}", exif_dir_offset);
        }

        let mut gps_dir_offset = 0u32;
        if !exif_info.gps_dir.is_empty() {
            let entries = self.write_selected_entries(
                &exif_info.gps_dir, &mut out, exif_endian, file_endian, relevant_gps_tags);
            gps_dir_offset = out.next_offset();
            offset = out.push_padded(
                Segment::tiff_directory(gps_dir_offset, file_endian, entries)
                    .with_label("GPS sub-IFD"),
            );
            debug!("GPS sub-IFD at offset {}", gps_dir_offset);
        }

        // External data of the entries that move into the output main IFD
        let mut main_dir_entries = Vec::new();
        if !exif_info.main_dir.is_empty() {
            main_dir_entries = self.write_selected_entries(
                &exif_info.main_dir, &mut out, exif_endian, file_endian, relevant_main_directory_tags);
            offset = out.next_offset();
        }

        // ------------------------------------------------------------------
        //              Main directory
        // ------------------------------------------------------------------

        let bits_per_sample_offset = offset;
        if num_components > 2 {
            let values = vec![frame.precision as u16; num_components];
            out.push_padded(
                Segment::ushort_vector(bits_per_sample_offset, file_endian, values)
                    .with_label("BitsPerSample"),
            );
        }

        let dir_offset = out.next_offset();
        let header = out
            .segments_mut()
            .iter_mut()
            .find(|s| matches!(s.kind, SegmentKind::TiffHeader { .. }))
            .expect("layout always starts with a TIFF header");
        header.set_directory_offset(dir_offset);

        let mut entries = Vec::new();
        entries.push(TiffDirEntry::from_long(
            tags::IMAGE_WIDTH, field_types::LONG, 1, frame.width as u32, file_endian));
        entries.push(TiffDirEntry::from_long(
            tags::IMAGE_LENGTH, field_types::LONG, 1, frame.length as u32, file_endian));
        if num_components > 2 {
            entries.push(TiffDirEntry::from_offset(
                tags::BITS_PER_SAMPLE, field_types::SHORT, num_components as u32,
                bits_per_sample_offset, file_endian));
        } else {
            entries.push(TiffDirEntry::from_shorts(
                tags::BITS_PER_SAMPLE, field_types::SHORT, 1,
                [frame.precision as u16, 0], file_endian));
        }
        entries.push(TiffDirEntry::from_shorts(
            tags::COMPRESSION, field_types::SHORT, 1,
            [compression::JPEG, 0], file_endian));

        let photometric_value = if num_components == 1 {
            photometric::BLACK_IS_ZERO
        } else {
            photometric::YCBCR
        };
        entries.push(TiffDirEntry::from_shorts(
            tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, 1,
            [photometric_value, 0], file_endian));

        entries.push(TiffDirEntry::from_offset(
            tags::STRIP_OFFSETS, field_types::LONG, 1, strip_start, file_endian));
        entries.push(TiffDirEntry::from_shorts(
            tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1,
            [num_components as u16, 0], file_endian));
        entries.push(TiffDirEntry::from_long(
            tags::STRIP_BYTE_COUNTS, field_types::LONG, 1,
            strip_end - strip_start, file_endian));
        entries.push(TiffDirEntry::from_shorts(
            tags::PLANAR_CONFIG, field_types::SHORT, 1,
            [planar_config::CHUNKY, 0], file_endian));
        entries.push(TiffDirEntry::from_offset(
            tags::JPEG_TABLES, field_types::UNDEFINED,
            jpeg_tables_end - jpeg_tables_start, jpeg_tables_start, file_endian));

        if num_components > 2 {
            entries.push(self.subsampling_entry(&frame, file_endian)?);
        }

        for entry in main_dir_entries {
            entries.push(entry);
        }

        if icc_end > icc_begin {
            entries.push(TiffDirEntry::from_offset(
                tags::ICC_PROFILE, field_types::UNDEFINED,
                icc_end - icc_begin, icc_begin, file_endian));
        }
        if exif_dir_offset > 0 {
            entries.push(TiffDirEntry::from_offset(
                tags::EXIF_IFD, field_types::LONG, 1, exif_dir_offset, file_endian));
        }
        if gps_dir_offset > 0 {
            entries.push(TiffDirEntry::from_offset(
                tags::GPS_IFD, field_types::LONG, 1, gps_dir_offset, file_endian));
        }

        // Tags must appear in numerical order
        entries.sort_by_key(TiffDirEntry::tag);

        // End of file, no padding after the main directory
        out.push_nopad(
            Segment::tiff_directory(dir_offset, file_endian, entries).with_label("Main IFD"),
        );

        self.logger.log(&format!(
            "Planned {} output segments, main directory at offset {}",
            out.len(), dir_offset
        ))?;
        Ok(out)
    }

    /// Builds the YCbCrSubSampling entry from the frame's sampling
    /// factors
    ///
    /// Cb and Cr must be 1x1 and the luma factors must each be 1, 2 or
    /// 4; the stored pair is the luma factors.
    fn subsampling_entry(&self, frame: &FrameInfo, e: ByteOrder) -> WrapResult<TiffDirEntry> {
        let mut horizontal_divisor = 0u8;
        let mut vertical_divisor = 0u8;

        let h_y = frame.horizontal_sampling(0);
        let h_cb = frame.horizontal_sampling(1);
        let h_cr = frame.horizontal_sampling(2);
        if h_cb == 1 && h_cr == 1 && matches!(h_y, 1 | 2 | 4) {
            horizontal_divisor = h_y;
        }

        let v_y = frame.vertical_sampling(0);
        let v_cb = frame.vertical_sampling(1);
        let v_cr = frame.vertical_sampling(2);
        if v_cb == 1 && v_cr == 1 && matches!(v_y, 1 | 2 | 4) {
            vertical_divisor = v_y;
        }

        if horizontal_divisor == 0 || vertical_divisor == 0 {
            warn!("Subsampling factors Y {}x{}, Cb {}x{}, Cr {}x{} cannot be represented",
                  h_y, v_y, h_cb, v_cb, h_cr, v_cr);
            return Err(WrapError::IllegalSubsampling);
        }
        Ok(TiffDirEntry::from_shorts(
            tags::YCBCR_SUBSAMPLING, field_types::SHORT, 2,
            [horizontal_divisor as u16, vertical_divisor as u16], e))
    }

    /// Emits the external data of the selected entries and returns their
    /// rewritten directory records
    ///
    /// Entries with more than four bytes of data have their bytes
    /// converted to the output byte order and written as byte vector
    /// segments; the rewritten record then carries the new offset.
    /// Inline entries are rewritten field by field according to their
    /// storage logic. Rationals convert as two independent 4-byte
    /// halves.
    fn write_selected_entries(
        &self,
        dir_info: &DirectoryInfo,
        out: &mut SegmentList,
        exif_endian: ByteOrder,
        file_endian: ByteOrder,
        selector: SelectorFn,
    ) -> Vec<TiffDirEntry> {
        let mut dir_entries = Vec::new();

        for (entry, external) in dir_info {
            let tag = entry.tag();
            let datatype = entry.datatype();
            if !selector(tag, datatype) {
                debug!("Skipping tag {} ({})", tag, tag_utils::get_tag_name(tag));
                continue;
            }

            let data_size = entry.data_size();
            let element_size = entry.element_size();
            let count = entry.count();

            if data_size > 4 {
                if external.is_empty() {
                    warn!("No external data captured for tag {}; entry dropped", tag);
                    continue;
                }
                let bytes = if exif_endian != file_endian {
                    // Rationals are 8 bytes but consist of two values;
                    // reverse them as 4-byte halves
                    let swap_size = if datatype == field_types::RATIONAL
                        || datatype == field_types::SRATIONAL
                    {
                        4
                    } else {
                        element_size as usize
                    };
                    byte_order::swap_element_order(external, swap_size)
                } else {
                    external.clone()
                };
                let data_offset = out.next_offset();
                out.push_padded(
                    Segment::byte_vector(data_offset, file_endian, bytes)
                        .with_label(tag_utils::get_tag_name(tag)),
                );
                dir_entries.push(TiffDirEntry::from_offset(
                    tag, datatype, count, data_offset, file_endian));
            } else if element_size == 1 {
                dir_entries.push(TiffDirEntry::from_bytes(
                    tag, datatype, count, entry.four_bytes(), file_endian));
            } else if element_size == 2 {
                dir_entries.push(TiffDirEntry::from_shorts(
                    tag, datatype, count, entry.two_shorts(), file_endian));
            } else if element_size == 4 {
                let value = byte_order::get_u32(&entry.four_bytes(), exif_endian);
                dir_entries.push(TiffDirEntry::from_long(
                    tag, datatype, count, value, file_endian));
            } else {
                warn!("Entry for tag {} has unsupported element size {}; dropped",
                      tag, element_size);
            }
        }
        dir_entries
    }
}
