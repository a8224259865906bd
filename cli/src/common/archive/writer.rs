//! # Code Page 437 ZIP Writer (`common::archive::writer`)
//!
//! File: cli/src/common/archive/writer.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Writes the ZIP container with entry names stored as raw code page 437
//! bytes: general purpose flag bit 11 (UTF-8 names) is never set and the
//! "version made by" host is MS-DOS, so readers decode names as CP437.
//!
//! ## Layout
//!
//! For each entry: a local file header with placeholder CRC and sizes, the
//! deflated data, then a seek back to patch the header. `finish` appends
//! the central directory and the end-of-central-directory record, adding
//! the ZIP64 records when counts, sizes or offsets need them.
//!
//! Entries whose size is known to reach 4 GiB get a ZIP64 extra field in
//! the local header up front. All entries carry the DOS epoch
//! (1980-01-01 00:00) as their timestamp.
//!
use crate::core::error::Result;
use anyhow::Context;
use byteorder::{LittleEndian, WriteBytesExt};
use flate2::{write::DeflateEncoder, Compression};
use std::io::{self, Read, Seek, SeekFrom, Write};

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;
const ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0606_4b50;
const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
const ZIP64_EXTRA_ID: u16 = 0x0001;

const METHOD_DEFLATED: u16 = 8;
const VERSION_DEFLATE: u16 = 20;
const VERSION_ZIP64: u16 = 45;
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = (1 << 5) | 1;

/// Offset of the CRC field in a local file header.
const LOCAL_CRC_OFFSET: u64 = 14;
/// Fixed part of a local file header.
const LOCAL_HEADER_LEN: u64 = 30;

/// Sizes and offsets at or above this need ZIP64 fields.
pub const ZIP64_THRESHOLD: u64 = u32::MAX as u64;
const ENTRY_COUNT_LIMIT: u64 = u16::MAX as u64;

const COPY_BUFFER_LEN: usize = 64 * 1024;

/// What the central directory needs to know about a written entry.
#[derive(Debug, Clone)]
struct CentralEntry {
    name: Vec<u8>,
    crc32: u32,
    compressed: u64,
    uncompressed: u64,
    offset: u64,
    zip64_local: bool,
}

/// Streams deflated entries with CP437 names into `W`.
pub struct Cp437ZipWriter<W: Write + Seek> {
    inner: W,
    entries: Vec<CentralEntry>,
}

impl<W: Write + Seek> Cp437ZipWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            entries: Vec::new(),
        }
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deflates everything `source` yields into a new entry.
    ///
    /// `name` is the already-encoded CP437 entry name. A `size_hint` of
    /// 4 GiB or more reserves ZIP64 sizes in the local header; an entry
    /// that turns out that large without the hint is an error.
    pub fn add_entry<R: Read>(&mut self, name: &[u8], size_hint: u64, source: &mut R) -> Result<()> {
        if name.len() > u16::MAX as usize {
            anyhow::bail!("Entry name is longer than {} bytes", u16::MAX);
        }
        let zip64 = size_hint >= ZIP64_THRESHOLD;
        let offset = self.inner.stream_position()?;
        write_local_header(&mut self.inner, name, zip64)?;

        let data_start = self.inner.stream_position()?;
        let mut hasher = crc32fast::Hasher::new();
        let mut uncompressed = 0u64;
        let mut encoder = DeflateEncoder::new(&mut self.inner, Compression::default());
        let mut buffer = vec![0u8; COPY_BUFFER_LEN];
        loop {
            let read = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("Failed to read entry data"),
            };
            hasher.update(&buffer[..read]);
            encoder.write_all(&buffer[..read])?;
            uncompressed += read as u64;
        }
        encoder.finish().context("Failed to finish deflate stream")?;

        let data_end = self.inner.stream_position()?;
        let compressed = data_end - data_start;
        let crc32 = hasher.finalize();
        if !zip64 && (compressed >= ZIP64_THRESHOLD || uncompressed >= ZIP64_THRESHOLD) {
            anyhow::bail!("Entry grew past 4 GiB while it was being written");
        }

        self.inner.seek(SeekFrom::Start(offset + LOCAL_CRC_OFFSET))?;
        self.inner.write_u32::<LittleEndian>(crc32)?;
        if zip64 {
            // Past the name and the extra field's id and length.
            let sizes = offset + LOCAL_HEADER_LEN + name.len() as u64 + 4;
            self.inner.seek(SeekFrom::Start(sizes))?;
            self.inner.write_u64::<LittleEndian>(uncompressed)?;
            self.inner.write_u64::<LittleEndian>(compressed)?;
        } else {
            self.inner.write_u32::<LittleEndian>(compressed as u32)?;
            self.inner.write_u32::<LittleEndian>(uncompressed as u32)?;
        }
        self.inner.seek(SeekFrom::Start(data_end))?;

        self.entries.push(CentralEntry {
            name: name.to_vec(),
            crc32,
            compressed,
            uncompressed,
            offset,
            zip64_local: zip64,
        });
        Ok(())
    }

    /// Writes the central directory and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        let directory_start = self.inner.stream_position()?;
        for entry in &self.entries {
            write_central_header(&mut self.inner, entry)?;
        }
        let directory_end = self.inner.stream_position()?;
        let directory_len = directory_end - directory_start;
        let count = self.entries.len() as u64;

        let w = &mut self.inner;
        if count >= ENTRY_COUNT_LIMIT
            || directory_len >= ZIP64_THRESHOLD
            || directory_start >= ZIP64_THRESHOLD
        {
            w.write_u32::<LittleEndian>(ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
            w.write_u64::<LittleEndian>(44)?;
            w.write_u16::<LittleEndian>(VERSION_ZIP64)?;
            w.write_u16::<LittleEndian>(VERSION_ZIP64)?;
            w.write_u32::<LittleEndian>(0)?;
            w.write_u32::<LittleEndian>(0)?;
            w.write_u64::<LittleEndian>(count)?;
            w.write_u64::<LittleEndian>(count)?;
            w.write_u64::<LittleEndian>(directory_len)?;
            w.write_u64::<LittleEndian>(directory_start)?;

            w.write_u32::<LittleEndian>(ZIP64_LOCATOR_SIGNATURE)?;
            w.write_u32::<LittleEndian>(0)?;
            w.write_u64::<LittleEndian>(directory_end)?;
            w.write_u32::<LittleEndian>(1)?;
        }

        w.write_u32::<LittleEndian>(END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u16::<LittleEndian>(count.min(ENTRY_COUNT_LIMIT) as u16)?;
        w.write_u16::<LittleEndian>(count.min(ENTRY_COUNT_LIMIT) as u16)?;
        w.write_u32::<LittleEndian>(directory_len.min(ZIP64_THRESHOLD) as u32)?;
        w.write_u32::<LittleEndian>(directory_start.min(ZIP64_THRESHOLD) as u32)?;
        w.write_u16::<LittleEndian>(0)?;
        Ok(self.inner)
    }
}

fn write_local_header<W: Write>(w: &mut W, name: &[u8], zip64: bool) -> io::Result<()> {
    let size_placeholder = if zip64 { u32::MAX } else { 0 };
    w.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
    w.write_u16::<LittleEndian>(if zip64 { VERSION_ZIP64 } else { VERSION_DEFLATE })?;
    w.write_u16::<LittleEndian>(0)?; // flags
    w.write_u16::<LittleEndian>(METHOD_DEFLATED)?;
    w.write_u16::<LittleEndian>(DOS_TIME)?;
    w.write_u16::<LittleEndian>(DOS_DATE)?;
    w.write_u32::<LittleEndian>(0)?; // crc, patched
    w.write_u32::<LittleEndian>(size_placeholder)?;
    w.write_u32::<LittleEndian>(size_placeholder)?;
    w.write_u16::<LittleEndian>(name.len() as u16)?;
    w.write_u16::<LittleEndian>(if zip64 { 20 } else { 0 })?;
    w.write_all(name)?;
    if zip64 {
        w.write_u16::<LittleEndian>(ZIP64_EXTRA_ID)?;
        w.write_u16::<LittleEndian>(16)?;
        w.write_u64::<LittleEndian>(0)?;
        w.write_u64::<LittleEndian>(0)?;
    }
    Ok(())
}

fn write_central_header<W: Write>(w: &mut W, entry: &CentralEntry) -> io::Result<()> {
    let sizes_overflow =
        entry.compressed >= ZIP64_THRESHOLD || entry.uncompressed >= ZIP64_THRESHOLD;
    let offset_overflows = entry.offset >= ZIP64_THRESHOLD;

    // ZIP64 extra fields appear in this order, only for overflowing values.
    let mut extra = Vec::new();
    if sizes_overflow {
        extra.write_u64::<LittleEndian>(entry.uncompressed)?;
        extra.write_u64::<LittleEndian>(entry.compressed)?;
    }
    if offset_overflows {
        extra.write_u64::<LittleEndian>(entry.offset)?;
    }
    let extra_len = if extra.is_empty() { 0 } else { extra.len() + 4 };

    let version = if entry.zip64_local || sizes_overflow || offset_overflows {
        VERSION_ZIP64
    } else {
        VERSION_DEFLATE
    };

    w.write_u32::<LittleEndian>(CENTRAL_HEADER_SIGNATURE)?;
    w.write_u16::<LittleEndian>(version)?; // made by: MS-DOS host
    w.write_u16::<LittleEndian>(version)?;
    w.write_u16::<LittleEndian>(0)?; // flags
    w.write_u16::<LittleEndian>(METHOD_DEFLATED)?;
    w.write_u16::<LittleEndian>(DOS_TIME)?;
    w.write_u16::<LittleEndian>(DOS_DATE)?;
    w.write_u32::<LittleEndian>(entry.crc32)?;
    if sizes_overflow {
        w.write_u32::<LittleEndian>(u32::MAX)?;
        w.write_u32::<LittleEndian>(u32::MAX)?;
    } else {
        w.write_u32::<LittleEndian>(entry.compressed as u32)?;
        w.write_u32::<LittleEndian>(entry.uncompressed as u32)?;
    }
    w.write_u16::<LittleEndian>(entry.name.len() as u16)?;
    w.write_u16::<LittleEndian>(extra_len as u16)?;
    w.write_u16::<LittleEndian>(0)?; // comment
    w.write_u16::<LittleEndian>(0)?; // disk
    w.write_u16::<LittleEndian>(0)?; // internal attributes
    w.write_u32::<LittleEndian>(0)?; // external attributes
    w.write_u32::<LittleEndian>(entry.offset.min(ZIP64_THRESHOLD) as u32)?;
    w.write_all(&entry.name)?;
    if !extra.is_empty() {
        w.write_u16::<LittleEndian>(ZIP64_EXTRA_ID)?;
        w.write_u16::<LittleEndian>(extra.len() as u16)?;
        w.write_all(&extra)?;
    }
    Ok(())
}
