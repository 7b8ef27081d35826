//! Portable MIB snapshot format.
//!
//! Serializes an OID tree plus variable-binding payloads into a byte
//! stream any consumer can parse regardless of its native integer width
//! or byte order — the persisted/streamed artifact of WALK results.
//!
//! Layout (all integer fields explicit-width, explicit-endianness,
//! selected by the header):
//!
//! ```text
//! Header   16 bytes: sys_size | suboid_size | endianness | 13 reserved
//! Metadata length-prefixed UTF-8 string, zero-padded to sys_size
//! RootOids count, then per OID: byte-length + arcs, zero-padded
//! VarBinds length-prefixed opaque records until exhaustion, zero-padded
//! ```
//!
//! `sys_size` is the width of every length/count field; `suboid_size` the
//! width of each OID arc; both are one of {2, 4, 8}. Endianness is 0 for
//! little, 1 for big.
//!
//! Parsing is strict: alignment padding must be zero, reserved header
//! bytes are written as zero and ignored on read, and a decoder never
//! truncates or guesses — any structural inconsistency is a format error.

use bytes::Bytes;

use crate::error::{Error, FormatErrorKind, Result};
use crate::oid::ObjectIdentity;
use crate::response::SnmpResponse;

/// Fixed header size in bytes.
pub const HEADER_BYTES: usize = 16;

/// Width of an integer field, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 2-byte fields.
    W2,
    /// 4-byte fields.
    W4,
    /// 8-byte fields.
    W8,
}

impl Width {
    /// Parse a header width byte.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            2 => Some(Self::W2),
            4 => Some(Self::W4),
            8 => Some(Self::W8),
            _ => None,
        }
    }

    /// The width in bytes.
    pub fn as_usize(self) -> usize {
        match self {
            Self::W2 => 2,
            Self::W4 => 4,
            Self::W8 => 8,
        }
    }

    /// The header byte for this width.
    pub fn as_u8(self) -> u8 {
        self.as_usize() as u8
    }

    /// The largest value a field of this width can hold.
    fn max_value(self) -> u64 {
        match self {
            Self::W2 => u16::MAX as u64,
            Self::W4 => u32::MAX as u64,
            Self::W8 => u64::MAX,
        }
    }
}

/// Byte order of all integer fields in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Least significant byte first (header byte 0).
    Little,
    /// Most significant byte first (header byte 1).
    Big,
}

impl Endianness {
    /// Parse the header endianness byte.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }

    /// The header byte for this endianness.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }

    /// The byte order of the running process.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// Width and byte-order parameters for one snapshot stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLayout {
    /// Width of length and count fields.
    pub sys_size: Width,
    /// Width of each OID arc.
    pub suboid_size: Width,
    /// Byte order of all integer fields.
    pub endianness: Endianness,
}

impl SnapshotLayout {
    /// Create a layout.
    pub fn new(sys_size: Width, suboid_size: Width, endianness: Endianness) -> Self {
        Self {
            sys_size,
            suboid_size,
            endianness,
        }
    }

    /// The widest layout in the process's native byte order.
    pub fn native() -> Self {
        Self::new(Width::W8, Width::W8, Endianness::native())
    }
}

impl Default for SnapshotLayout {
    fn default() -> Self {
        Self::native()
    }
}

/// A decoded (or to-be-encoded) MIB snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Free-form UTF-8 metadata, typically the caller's request id.
    pub metadata: String,
    /// The root OIDs the bindings were collected under.
    pub root_oids: Vec<ObjectIdentity>,
    /// Opaque variable-binding records (see [`VarBindRecord`] for the
    /// convention this crate writes).
    pub var_binds: Vec<Bytes>,
}

impl Snapshot {
    /// Encode the snapshot with the given layout.
    ///
    /// Fails when a length or arc does not fit the declared field width.
    pub fn encode(&self, layout: &SnapshotLayout) -> Result<Bytes> {
        let mut w = Writer::new(*layout);

        w.buf.push(layout.sys_size.as_u8());
        w.buf.push(layout.suboid_size.as_u8());
        w.buf.push(layout.endianness.as_u8());
        w.buf.resize(HEADER_BYTES, 0);

        w.write_len(self.metadata.len() as u64)?;
        w.buf.extend_from_slice(self.metadata.as_bytes());
        w.pad();

        w.write_len(self.root_oids.len() as u64)?;
        w.pad();
        for oid in &self.root_oids {
            w.write_oid(oid)?;
        }

        for record in &self.var_binds {
            w.write_len(record.len() as u64)?;
            w.buf.extend_from_slice(record);
            w.pad();
        }

        Ok(Bytes::from(w.buf))
    }

    /// Decode a snapshot stream.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_BYTES {
            return Err(Error::format(
                0,
                FormatErrorKind::TruncatedHeader {
                    available: data.len(),
                },
            ));
        }

        let sys_size = Width::from_byte(data[0])
            .ok_or(Error::format(0, FormatErrorKind::UnsupportedWidth { value: data[0] }))?;
        let suboid_size = Width::from_byte(data[1])
            .ok_or(Error::format(1, FormatErrorKind::UnsupportedWidth { value: data[1] }))?;
        let endianness = Endianness::from_byte(data[2]).ok_or(Error::format(
            2,
            FormatErrorKind::UnsupportedEndianness { value: data[2] },
        ))?;
        // Bytes 3..16 are reserved: ignored on read.

        let layout = SnapshotLayout::new(sys_size, suboid_size, endianness);
        let mut r = Reader::new(data, layout, HEADER_BYTES);

        let metadata_len = r.read_len()?;
        let metadata_offset = r.pos;
        let metadata = std::str::from_utf8(r.take(metadata_len)?)
            .map_err(|_| Error::format(metadata_offset, FormatErrorKind::InvalidUtf8))?
            .to_string();
        r.skip_padding()?;

        let root_count = r.read_len()?;
        r.skip_padding()?;
        let mut root_oids = Vec::new();
        for _ in 0..root_count {
            root_oids.push(r.read_oid()?);
        }

        let mut var_binds = Vec::new();
        while !r.is_empty() {
            let record_len = r.read_len()?;
            var_binds.push(Bytes::copy_from_slice(r.take(record_len)?));
            r.skip_padding()?;
        }

        Ok(Self {
            metadata,
            root_oids,
            var_binds,
        })
    }

    /// Assemble a snapshot from a response.
    ///
    /// Metadata is the caller's request id (empty if none); root OIDs are
    /// the request's; each accepted binding becomes a [`VarBindRecord`]
    /// encoded with the same layout, attributed to the root that prefixes
    /// its OID (unambiguous by request validation).
    pub fn from_response(response: &SnmpResponse, layout: &SnapshotLayout) -> Result<Self> {
        let root_oids = response.request().root_oids().to_vec();

        let mut var_binds = Vec::with_capacity(response.var_binds().len());
        for vb in response.var_binds() {
            let Some((root_index, suffix)) = root_oids
                .iter()
                .enumerate()
                .find_map(|(i, root)| vb.oid.suffix_of(root).map(|suffix| (i, suffix)))
            else {
                // Accepted bindings are always under a request root.
                continue;
            };
            let record = VarBindRecord {
                root_index: root_index as u64,
                suffix,
                value: vb.value.as_bytes().cloned().unwrap_or_default(),
            };
            var_binds.push(record.encode(layout)?);
        }

        Ok(Self {
            metadata: response.request_id().unwrap_or_default().to_string(),
            root_oids,
            var_binds,
        })
    }
}

/// The var-bind record convention this crate writes into
/// [`Snapshot::var_binds`].
///
/// Each record is, in the enclosing stream's layout: the root-OID index
/// (sys_size), the byte-length of the OID suffix arcs (sys_size), the
/// suffix arcs (suboid_size each, padded), the value byte-length
/// (sys_size), and the value bytes (padded). Offsets inside a record are
/// relative to the record start; records sit at sys_size-aligned stream
/// positions, so the two views agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBindRecord {
    /// Index into the snapshot's root OIDs.
    pub root_index: u64,
    /// Arcs past the root OID.
    pub suffix: ObjectIdentity,
    /// Opaque value bytes.
    pub value: Bytes,
}

impl VarBindRecord {
    /// Encode the record with the given layout.
    pub fn encode(&self, layout: &SnapshotLayout) -> Result<Bytes> {
        let mut w = Writer::new(*layout);
        w.write_len(self.root_index)?;
        w.write_oid(&self.suffix)?;
        w.write_len(self.value.len() as u64)?;
        w.buf.extend_from_slice(&self.value);
        w.pad();
        Ok(Bytes::from(w.buf))
    }

    /// Decode a record extracted from a snapshot with the same layout.
    pub fn decode(data: &[u8], layout: &SnapshotLayout) -> Result<Self> {
        let mut r = Reader::new(data, *layout, 0);
        let root_index = r.read_len()?;
        let suffix = r.read_oid()?;
        let value_len = r.read_len()?;
        let value = Bytes::copy_from_slice(r.take(value_len)?);
        r.skip_padding()?;
        Ok(Self {
            root_index,
            suffix,
            value,
        })
    }
}

struct Writer {
    buf: Vec<u8>,
    layout: SnapshotLayout,
}

impl Writer {
    fn new(layout: SnapshotLayout) -> Self {
        Self {
            buf: Vec::new(),
            layout,
        }
    }

    fn write_uint(&mut self, value: u64, width: Width) -> Result<()> {
        if value > width.max_value() {
            return Err(Error::format(
                self.buf.len(),
                FormatErrorKind::ValueTooWide {
                    value,
                    width: width.as_u8(),
                },
            ));
        }
        let bytes = match self.layout.endianness {
            Endianness::Little => &value.to_le_bytes()[..width.as_usize()],
            Endianness::Big => &value.to_be_bytes()[8 - width.as_usize()..],
        };
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_len(&mut self, value: u64) -> Result<()> {
        self.write_uint(value, self.layout.sys_size)
    }

    /// Byte-length prefix, arcs, alignment padding.
    fn write_oid(&mut self, oid: &ObjectIdentity) -> Result<()> {
        let byte_len = oid.len() as u64 * self.layout.suboid_size.as_usize() as u64;
        self.write_len(byte_len)?;
        for &arc in oid.arcs() {
            self.write_uint(arc, self.layout.suboid_size)?;
        }
        self.pad();
        Ok(())
    }

    fn pad(&mut self) {
        while self.buf.len() % self.layout.sys_size.as_usize() != 0 {
            self.buf.push(0);
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    layout: SnapshotLayout,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], layout: SnapshotLayout, pos: usize) -> Self {
        Self { data, pos, layout }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: u64) -> Result<&'a [u8]> {
        if len > self.remaining() as u64 {
            return Err(Error::format(
                self.pos,
                FormatErrorKind::Truncated {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let slice = &self.data[self.pos..self.pos + len as usize];
        self.pos += len as usize;
        Ok(slice)
    }

    fn read_uint(&mut self, width: Width) -> Result<u64> {
        let bytes = self.take(width.as_usize() as u64)?;
        let mut value = [0u8; 8];
        match self.layout.endianness {
            Endianness::Little => value[..bytes.len()].copy_from_slice(bytes),
            Endianness::Big => value[8 - bytes.len()..].copy_from_slice(bytes),
        }
        Ok(match self.layout.endianness {
            Endianness::Little => u64::from_le_bytes(value),
            Endianness::Big => u64::from_be_bytes(value),
        })
    }

    fn read_len(&mut self) -> Result<u64> {
        self.read_uint(self.layout.sys_size)
    }

    fn read_oid(&mut self) -> Result<ObjectIdentity> {
        let byte_len = self.read_len()?;
        let suboid = self.layout.suboid_size.as_usize() as u64;
        if byte_len % suboid != 0 {
            return Err(Error::format(
                self.pos,
                FormatErrorKind::ArcArrayMisaligned {
                    length: byte_len,
                    suboid_size: self.layout.suboid_size.as_u8(),
                },
            ));
        }
        let arc_count = byte_len / suboid;
        let mut arcs = Vec::with_capacity(arc_count.min(1024) as usize);
        for _ in 0..arc_count {
            arcs.push(self.read_uint(self.layout.suboid_size)?);
        }
        self.skip_padding()?;
        Ok(ObjectIdentity::new(arcs))
    }

    /// Strict parse: padding bytes must be zero.
    fn skip_padding(&mut self) -> Result<()> {
        while self.pos % self.layout.sys_size.as_usize() != 0 {
            match self.data.get(self.pos) {
                Some(0) => self.pos += 1,
                Some(_) => {
                    return Err(Error::format(self.pos, FormatErrorKind::NonZeroPadding));
                }
                None => {
                    return Err(Error::format(
                        self.pos,
                        FormatErrorKind::Truncated {
                            needed: 1,
                            available: 0,
                        },
                    ));
                }
            }
        }
        Ok(())
    }
}
