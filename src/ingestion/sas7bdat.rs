//! SAS dataset (`.sas7bdat`) loading.
//!
//! The file is read into memory and decoded in two passes over its pages: the first collects
//! column metadata from subheaders, the second collects row locations (data pages, mix pages and,
//! for compressed files, data subheaders). Rows are then decoded column by column.
//! Display formats only decide whether a numeric column is rendered as a date, datetime or time;
//! labels and dataset metadata are not kept.
//!
//! Both 32- and 64-bit layouts and both byte orders are handled, as are `SASYZCRL` (RLE) and
//! `SASYZCR2` (RDC) row compression.

use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::types::{unique_column_names, Frame, Value};

use super::decode_text;
use super::sas_dates::Temporal;

const FORMAT: &str = "sas7bdat";

const MAGIC: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc2, 0xea, 0x81, 0x60,
    0xb3, 0x14, 0x11, 0xcf, 0xbd, 0x92, 0x08, 0x00, 0x09, 0xc7, 0x31, 0x8c, 0x18, 0x1f, 0x10, 0x11,
];

const ALIGN_1_OFFSET: usize = 32;
const ALIGN_2_OFFSET: usize = 35;
const ENDIANNESS_OFFSET: usize = 37;
const HEADER_SIZE_OFFSET: usize = 196;
const PAGE_SIZE_OFFSET: usize = 200;
const PAGE_COUNT_OFFSET: usize = 204;

const SUBHEADER_POINTERS_OFFSET: usize = 8;
const TRUNCATED_SUBHEADER: u64 = 1;
const COMPRESSED_SUBHEADER: u64 = 4;
const COMPRESSED_SUBHEADER_TYPE: u64 = 1;

/// Upper bound on the buffer reserved up front for one decompressed row.
const MAX_ROW_RESERVE: usize = 64 * 1024;

const RLE_LITERAL: &[u8] = b"SASYZCRL";
const RDC_LITERAL: &[u8] = b"SASYZCR2";

/// Word size and byte order of a file, plus the offsets that depend on them.
#[derive(Debug, Clone, Copy)]
struct Layout {
    little_endian: bool,
    int_len: usize,
    page_bit_offset: usize,
    pointer_len: usize,
}

impl Layout {
    fn uint(&self, buf: &[u8], offset: usize, len: usize) -> ReadResult<u64> {
        let raw = span(buf, offset, len)?;
        let mut b = [0u8; 8];
        if self.little_endian {
            b[..len].copy_from_slice(raw);
            Ok(u64::from_le_bytes(b))
        } else {
            b[8 - len..].copy_from_slice(raw);
            Ok(u64::from_be_bytes(b))
        }
    }

    fn word(&self, buf: &[u8], offset: usize) -> ReadResult<usize> {
        Ok(self.uint(buf, offset, self.int_len)? as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Rle,
    Rdc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Meta,
    Data,
    Mix,
    Other,
}

impl PageKind {
    fn from_raw(raw: u64) -> Self {
        match raw {
            0x9000 => PageKind::Other,
            t if t & 0x0100 != 0 => PageKind::Data,
            t if t & 0x0200 != 0 => PageKind::Mix,
            // 0x0400 is an AMD page, read like a meta page.
            0x0000 | 0x4000 | 0x0400 => PageKind::Meta,
            _ => PageKind::Other,
        }
    }

    fn has_subheaders(self) -> bool {
        matches!(self, PageKind::Meta | PageKind::Mix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subheader {
    RowSize,
    ColumnSize,
    SubheaderCounts,
    ColumnText,
    ColumnName,
    ColumnAttributes,
    FormatAndLabel,
    ColumnList,
}

impl Subheader {
    fn from_signature(sig: &[u8]) -> Option<Self> {
        let kind = match sig {
            b"\xF7\xF7\xF7\xF7"
            | b"\x00\x00\x00\x00\xF7\xF7\xF7\xF7"
            | b"\xF7\xF7\xF7\xF7\x00\x00\x00\x00"
            | b"\xF7\xF7\xF7\xF7\xFF\xFF\xFB\xFE" => Subheader::RowSize,
            b"\xF6\xF6\xF6\xF6"
            | b"\x00\x00\x00\x00\xF6\xF6\xF6\xF6"
            | b"\xF6\xF6\xF6\xF6\x00\x00\x00\x00"
            | b"\xF6\xF6\xF6\xF6\xFF\xFF\xFB\xFE" => Subheader::ColumnSize,
            b"\x00\xFC\xFF\xFF"
            | b"\xFF\xFF\xFC\x00"
            | b"\x00\xFC\xFF\xFF\xFF\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFF\xFF\xFF\xFC\x00" => Subheader::SubheaderCounts,
            b"\xFD\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFD"
            | b"\xFD\xFF\xFF\xFF\xFF\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFD" => Subheader::ColumnText,
            b"\xFF\xFF\xFF\xFF" | b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF" => Subheader::ColumnName,
            b"\xFC\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFC"
            | b"\xFC\xFF\xFF\xFF\xFF\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFC" => Subheader::ColumnAttributes,
            b"\xFE\xFB\xFF\xFF"
            | b"\xFF\xFF\xFB\xFE"
            | b"\xFE\xFB\xFF\xFF\xFF\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFF\xFF\xFF\xFB\xFE" => Subheader::FormatAndLabel,
            b"\xFE\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFE"
            | b"\xFE\xFF\xFF\xFF\xFF\xFF\xFF\xFF"
            | b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFE" => Subheader::ColumnList,
            _ => return None,
        };
        Some(kind)
    }
}

/// A subheader pointer from a page's pointer table.
#[derive(Debug, Clone, Copy)]
struct Pointer {
    offset: usize,
    length: usize,
    compression: u64,
    kind: u64,
}

#[derive(Debug, Default)]
struct Metadata {
    row_length: usize,
    row_count: usize,
    mix_page_row_count: usize,
    column_count: usize,
    text_blocks: Vec<Vec<u8>>,
    names: Vec<String>,
    formats: Vec<String>,
    data_offsets: Vec<usize>,
    data_lengths: Vec<usize>,
    numeric: Vec<bool>,
}

/// Where rows live in the file; offsets are absolute.
#[derive(Debug, Clone, Copy)]
enum RowSource {
    /// One (possibly compressed) row stored as a subheader.
    Subheader { start: usize, length: usize },
    /// Consecutive uncompressed rows.
    Block { start: usize, count: usize },
}

#[derive(Debug)]
struct Column {
    name: String,
    offset: usize,
    length: usize,
    numeric: bool,
    temporal: Option<Temporal>,
}

/// Load a SAS dataset file into a [`Frame`].
pub fn read_sas7bdat_from_path(path: impl AsRef<Path>) -> ReadResult<Frame> {
    let bytes = std::fs::read(path)?;
    read_sas7bdat_from_bytes(&bytes)
}

/// Decode an in-memory SAS dataset file.
pub fn read_sas7bdat_from_bytes(bytes: &[u8]) -> ReadResult<Frame> {
    if bytes.is_empty() {
        return Err(ReadError::Empty);
    }
    if bytes.get(..MAGIC.len()) != Some(&MAGIC[..]) {
        return Err(ReadError::malformed(FORMAT, "magic number mismatch"));
    }

    let u64_layout = span(bytes, ALIGN_1_OFFSET, 1)?[0] == b'3';
    let align = if span(bytes, ALIGN_2_OFFSET, 1)?[0] == b'3' { 4 } else { 0 };
    let layout = Layout {
        little_endian: span(bytes, ENDIANNESS_OFFSET, 1)?[0] == 0x01,
        int_len: if u64_layout { 8 } else { 4 },
        page_bit_offset: if u64_layout { 32 } else { 16 },
        pointer_len: if u64_layout { 24 } else { 12 },
    };

    let header_len = layout.uint(bytes, HEADER_SIZE_OFFSET + align, 4)? as usize;
    let page_len = layout.uint(bytes, PAGE_SIZE_OFFSET + align, 4)? as usize;
    let page_count = layout.word(bytes, PAGE_COUNT_OFFSET + align)?;
    if page_len == 0 || header_len > bytes.len() {
        return Err(ReadError::malformed(FORMAT, "invalid header or page size"));
    }

    let pages = (0..page_count)
        .map(|i| {
            let start = i
                .checked_mul(page_len)
                .and_then(|o| o.checked_add(header_len))
                .ok_or_else(|| ReadError::malformed(FORMAT, "page offset overflow"))?;
            span(bytes, start, page_len)
                .map(|page| (start, page))
                .map_err(|_| ReadError::malformed(FORMAT, format!("file truncated at page {}", i + 1)))
        })
        .collect::<ReadResult<Vec<_>>>()?;

    let mut meta = Metadata::default();
    let mut compression = Compression::None;
    for (_, page) in &pages {
        let (kind, _, pointers) = page_header(&layout, page)?;
        if !kind.has_subheaders() {
            continue;
        }
        for ptr in pointers {
            let Some(sub) = signature(&layout, page, &ptr)?.and_then(Subheader::from_signature) else {
                continue;
            };
            process_subheader(&layout, page, &ptr, sub, &mut meta)?;
            if sub == Subheader::ColumnText && meta.text_blocks.len() == 1 {
                compression = detect_compression(&meta.text_blocks[0]);
            }
        }
    }

    let columns = columns_from(&meta)?;
    if columns.is_empty() {
        return Err(ReadError::Empty);
    }
    if meta.row_length == 0 {
        return Err(ReadError::malformed(FORMAT, "row length is zero"));
    }
    if let Some(c) = columns
        .iter()
        .find(|c| c.offset.checked_add(c.length).is_none_or(|end| end > meta.row_length))
    {
        return Err(ReadError::malformed(
            FORMAT,
            format!("column '{}' lies outside the row", c.name),
        ));
    }

    let mut sources = Vec::new();
    for (page_start, page) in &pages {
        let (kind, block_count, pointers) = page_header(&layout, page)?;
        match kind {
            PageKind::Meta | PageKind::Mix => {
                for ptr in &pointers {
                    let known = signature(&layout, page, ptr)?.and_then(Subheader::from_signature);
                    let compressed_row = compression != Compression::None
                        && (ptr.compression == COMPRESSED_SUBHEADER || ptr.compression == 0)
                        && ptr.kind == COMPRESSED_SUBHEADER_TYPE;
                    if known.is_none() && compressed_row {
                        sources.push(RowSource::Subheader {
                            start: page_start + ptr.offset,
                            length: ptr.length,
                        });
                    }
                }
                if kind == PageKind::Mix {
                    let base = layout.page_bit_offset
                        + SUBHEADER_POINTERS_OFFSET
                        + pointers_len(&layout, page)?;
                    let start = base + base % 8;
                    let fits = page.len().saturating_sub(start) / meta.row_length;
                    let count = meta.row_count.min(meta.mix_page_row_count).min(fits);
                    sources.push(RowSource::Block {
                        start: page_start + start,
                        count,
                    });
                }
            }
            PageKind::Data => {
                let start = layout.page_bit_offset + SUBHEADER_POINTERS_OFFSET;
                let fits = page.len().saturating_sub(start) / meta.row_length;
                sources.push(RowSource::Block {
                    start: page_start + start,
                    count: block_count.min(fits),
                });
            }
            PageKind::Other => {}
        }
    }

    // The stated row count is untrusted; never reserve more rows than the file can hold.
    let fits = bytes.len() / meta.row_length;
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(meta.row_count.min(fits));
    'sources: for source in sources {
        match source {
            RowSource::Subheader { start, length } => {
                if rows.len() >= meta.row_count {
                    break;
                }
                let raw = span(bytes, start, length)?;
                let row = if length < meta.row_length {
                    match compression {
                        Compression::Rle => rle_decompress(raw, meta.row_length)?,
                        Compression::Rdc => rdc_decompress(raw, meta.row_length)?,
                        Compression::None => {
                            return Err(ReadError::malformed(FORMAT, "short row in uncompressed file"));
                        }
                    }
                } else {
                    raw[..meta.row_length].to_vec()
                };
                rows.push(decode_row(&layout, &row, &columns)?);
            }
            RowSource::Block { start, count } => {
                for i in 0..count {
                    if rows.len() >= meta.row_count {
                        break 'sources;
                    }
                    let raw = span(bytes, start + i * meta.row_length, meta.row_length)?;
                    rows.push(decode_row(&layout, raw, &columns)?);
                }
            }
        }
    }

    let names = unique_column_names(columns.into_iter().map(|c| c.name).collect());
    Ok(Frame::from_parts(names, rows))
}

/// Page type, block count and subheader pointers of one page.
fn page_header(layout: &Layout, page: &[u8]) -> ReadResult<(PageKind, usize, Vec<Pointer>)> {
    let bit = layout.page_bit_offset;
    let kind = PageKind::from_raw(layout.uint(page, bit, 2)?);
    let block_count = layout.uint(page, bit + 2, 2)? as usize;
    let subheader_count = layout.uint(page, bit + 4, 2)? as usize;

    let mut pointers = Vec::new();
    if kind.has_subheaders() {
        for i in 0..subheader_count {
            let at = bit + SUBHEADER_POINTERS_OFFSET + i * layout.pointer_len;
            let il = layout.int_len;
            let ptr = Pointer {
                offset: layout.word(page, at)?,
                length: layout.word(page, at + il)?,
                compression: layout.uint(page, at + 2 * il, 1)?,
                kind: layout.uint(page, at + 2 * il + 1, 1)?,
            };
            if ptr.length == 0 || ptr.compression == TRUNCATED_SUBHEADER {
                continue;
            }
            if ptr.offset.checked_add(ptr.length).is_none_or(|end| end > page.len()) {
                return Err(ReadError::malformed(FORMAT, "subheader pointer outside its page"));
            }
            pointers.push(ptr);
        }
    }
    Ok((kind, block_count, pointers))
}

fn pointers_len(layout: &Layout, page: &[u8]) -> ReadResult<usize> {
    let count = layout.uint(page, layout.page_bit_offset + 4, 2)? as usize;
    Ok(count * layout.pointer_len)
}

fn signature<'a>(layout: &Layout, page: &'a [u8], ptr: &Pointer) -> ReadResult<Option<&'a [u8]>> {
    if ptr.length < layout.int_len {
        return Ok(None);
    }
    span(page, ptr.offset, layout.int_len).map(Some)
}

fn process_subheader(
    layout: &Layout,
    page: &[u8],
    ptr: &Pointer,
    sub: Subheader,
    meta: &mut Metadata,
) -> ReadResult<()> {
    let il = layout.int_len;
    let off = ptr.offset;
    match sub {
        Subheader::RowSize => {
            meta.row_length = layout.word(page, off + 5 * il)?;
            meta.row_count = layout.word(page, off + 6 * il)?;
            meta.mix_page_row_count = layout.word(page, off + 15 * il)?;
        }
        Subheader::ColumnSize => {
            meta.column_count = layout.word(page, off + il)?;
        }
        Subheader::ColumnText => {
            let size = layout.uint(page, off + il, 2)? as usize;
            meta.text_blocks.push(span(page, off + il, size)?.to_vec());
        }
        Subheader::ColumnName => {
            let count = ptr.length.saturating_sub(2 * il + 12) / 8;
            for i in 0..count {
                let at = off + il + 8 * (i + 1);
                let block = layout.uint(page, at, 2)? as usize;
                let name_off = layout.uint(page, at + 2, 2)? as usize;
                let name_len = layout.uint(page, at + 4, 2)? as usize;
                let text = meta
                    .text_blocks
                    .get(block)
                    .ok_or_else(|| ReadError::malformed(FORMAT, format!("missing column text block {block}")))?;
                let raw = span(text, name_off, name_len)?;
                meta.names.push(decode_text(trim_padding(raw)).trim().to_string());
            }
        }
        Subheader::ColumnAttributes => {
            let count = ptr.length.saturating_sub(2 * il + 12) / (il + 8);
            for i in 0..count {
                let step = i * (il + 8);
                meta.data_offsets.push(layout.word(page, off + il + 8 + step)?);
                meta.data_lengths.push(layout.uint(page, off + 2 * il + 8 + step, 4)? as usize);
                meta.numeric.push(layout.uint(page, off + 2 * il + 14 + step, 1)? == 1);
            }
        }
        Subheader::FormatAndLabel => {
            let base = off + 3 * il;
            let block = layout.uint(page, base + 22, 2)? as usize;
            let start = layout.uint(page, base + 24, 2)? as usize;
            let len = layout.uint(page, base + 26, 2)? as usize;
            let format = match meta.text_blocks.get(block) {
                Some(text) if len > 0 => decode_text(trim_padding(span(text, start, len)?)),
                _ => String::new(),
            };
            meta.formats.push(format);
        }
        Subheader::SubheaderCounts | Subheader::ColumnList => {}
    }
    Ok(())
}

fn detect_compression(first_text_block: &[u8]) -> Compression {
    let contains = |needle: &[u8]| first_text_block.windows(needle.len()).any(|w| w == needle);
    if contains(RLE_LITERAL) {
        Compression::Rle
    } else if contains(RDC_LITERAL) {
        Compression::Rdc
    } else {
        Compression::None
    }
}

fn columns_from(meta: &Metadata) -> ReadResult<Vec<Column>> {
    let mut count = meta.data_offsets.len().min(meta.data_lengths.len());
    if meta.column_count > 0 {
        count = count.min(meta.column_count);
    }

    (0..count)
        .map(|i| {
            let numeric = meta.numeric[i];
            let length = meta.data_lengths[i];
            let name = meta
                .names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("VAR{}", i + 1));
            if numeric && !(1..=8).contains(&length) {
                return Err(ReadError::malformed(
                    FORMAT,
                    format!("numeric column '{name}' has length {length}"),
                ));
            }
            let temporal = match meta.formats.get(i) {
                Some(format) if numeric => Temporal::from_format(format),
                _ => None,
            };
            Ok(Column {
                name,
                offset: meta.data_offsets[i],
                length,
                numeric,
                temporal,
            })
        })
        .collect()
}

fn decode_row(layout: &Layout, row: &[u8], columns: &[Column]) -> ReadResult<Vec<Value>> {
    columns
        .iter()
        .map(|col| {
            let raw = span(row, col.offset, col.length)?;
            if !col.numeric {
                return Ok(Value::Utf8(decode_text(trim_padding(raw))));
            }

            let mut b = [0u8; 8];
            let v = if layout.little_endian {
                b[8 - raw.len()..].copy_from_slice(raw);
                f64::from_le_bytes(b)
            } else {
                b[..raw.len()].copy_from_slice(raw);
                f64::from_be_bytes(b)
            };
            // SAS missing values are NaN payloads.
            Ok(match col.temporal {
                _ if v.is_nan() => Value::Null,
                Some(temporal) => temporal.render(v),
                None => Value::Float64(v),
            })
        })
        .collect()
}

fn trim_padding(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    &raw[..end]
}

fn span(buf: &[u8], start: usize, len: usize) -> ReadResult<&[u8]> {
    start
        .checked_add(len)
        .and_then(|end| buf.get(start..end))
        .ok_or_else(|| ReadError::malformed(FORMAT, format!("read of {len} bytes at {start} is out of bounds")))
}

/// Decompress one `SASYZCRL` row.
fn rle_decompress(input: &[u8], row_length: usize) -> ReadResult<Vec<u8>> {
    let mut out: Vec<u8> = Vec::with_capacity(row_length.min(MAX_ROW_RESERVE));
    let mut ipos = 0;
    let byte_at = |i: usize| {
        input
            .get(i)
            .copied()
            .ok_or_else(|| ReadError::malformed(FORMAT, "RLE stream ends early"))
    };

    while ipos < input.len() {
        let control = input[ipos] & 0xF0;
        let low = (input[ipos] & 0x0F) as usize;
        ipos += 1;
        match control {
            0x00 => {
                let n = byte_at(ipos)? as usize + 64 + low * 256;
                out.extend_from_slice(span(input, ipos + 1, n)?);
                ipos += 1 + n;
            }
            0x40 => {
                let n = byte_at(ipos)? as usize + 18 + low * 256;
                let b = byte_at(ipos + 1)?;
                out.extend(std::iter::repeat_n(b, n));
                ipos += 2;
            }
            0x60 => {
                let n = low * 256 + byte_at(ipos)? as usize + 17;
                out.extend(std::iter::repeat_n(b' ', n));
                ipos += 1;
            }
            0x70 => {
                let n = low * 256 + byte_at(ipos)? as usize + 17;
                out.extend(std::iter::repeat_n(0u8, n));
                ipos += 1;
            }
            0x80 | 0x90 | 0xA0 | 0xB0 => {
                let base = match control {
                    0x80 => 1,
                    0x90 => 17,
                    0xA0 => 33,
                    _ => 49,
                };
                let n = low + base;
                out.extend_from_slice(span(input, ipos, n)?);
                ipos += n;
            }
            0xC0 => {
                let b = byte_at(ipos)?;
                out.extend(std::iter::repeat_n(b, low + 3));
                ipos += 1;
            }
            0xD0 => out.extend(std::iter::repeat_n(0x40u8, low + 2)),
            0xE0 => out.extend(std::iter::repeat_n(b' ', low + 2)),
            0xF0 => out.extend(std::iter::repeat_n(0u8, low + 2)),
            other => {
                return Err(ReadError::malformed(
                    FORMAT,
                    format!("unknown RLE control byte {other:#04x}"),
                ));
            }
        }
        if out.len() > row_length {
            return Err(ReadError::malformed(FORMAT, "RLE row longer than row length"));
        }
    }

    if out.len() != row_length {
        return Err(ReadError::malformed(
            FORMAT,
            format!("RLE row has {} bytes, expected {row_length}", out.len()),
        ));
    }
    Ok(out)
}

/// Decompress one `SASYZCR2` (Ross Data Compression) row.
fn rdc_decompress(input: &[u8], row_length: usize) -> ReadResult<Vec<u8>> {
    let mut out: Vec<u8> = Vec::with_capacity(row_length.min(MAX_ROW_RESERVE));
    let mut ipos = 0;
    let mut ctrl_bits: u16 = 0;
    let mut ctrl_mask: u16 = 0;
    let byte_at = |i: usize| {
        input
            .get(i)
            .copied()
            .ok_or_else(|| ReadError::malformed(FORMAT, "RDC stream ends early"))
    };

    while ipos < input.len() {
        ctrl_mask >>= 1;
        if ctrl_mask == 0 {
            ctrl_bits = u16::from_be_bytes([byte_at(ipos)?, byte_at(ipos + 1)?]);
            ipos += 2;
            ctrl_mask = 0x8000;
        }

        if ctrl_bits & ctrl_mask == 0 {
            out.push(byte_at(ipos)?);
            ipos += 1;
        } else {
            let command = byte_at(ipos)?;
            let cmd = (command >> 4) & 0x0F;
            let cnt = (command & 0x0F) as usize;
            ipos += 1;

            match cmd {
                // short run
                0 => {
                    let b = byte_at(ipos)?;
                    out.extend(std::iter::repeat_n(b, cnt + 3));
                    ipos += 1;
                }
                // long run
                1 => {
                    let n = cnt + ((byte_at(ipos)? as usize) << 4) + 19;
                    let b = byte_at(ipos + 1)?;
                    out.extend(std::iter::repeat_n(b, n));
                    ipos += 2;
                }
                // long back-reference
                2 => {
                    let ofs = cnt + 3 + ((byte_at(ipos)? as usize) << 4);
                    let n = byte_at(ipos + 1)? as usize + 16;
                    ipos += 2;
                    copy_back(&mut out, ofs, n)?;
                }
                // short back-reference, `cmd` is the length
                _ => {
                    let ofs = cnt + 3 + ((byte_at(ipos)? as usize) << 4);
                    ipos += 1;
                    copy_back(&mut out, ofs, cmd as usize)?;
                }
            }
        }
        if out.len() > row_length {
            return Err(ReadError::malformed(FORMAT, "RDC row longer than row length"));
        }
    }

    if out.len() != row_length {
        return Err(ReadError::malformed(
            FORMAT,
            format!("RDC row has {} bytes, expected {row_length}", out.len()),
        ));
    }
    Ok(out)
}

fn copy_back(out: &mut Vec<u8>, ofs: usize, n: usize) -> ReadResult<()> {
    let from = out
        .len()
        .checked_sub(ofs)
        .ok_or_else(|| ReadError::malformed(FORMAT, "RDC back-reference before start of row"))?;
    for k in 0..n {
        let b = out[from + k];
        out.push(b);
    }
    Ok(())
}
