//! Toy PDU codec for tests.
//!
//! A trivially parseable length-prefixed format standing in for the BER
//! codec collaborator. The engine sees it only through the `PduCodec`
//! trait; the mock agent parses requests and builds responses with the
//! helpers below.
//!
//! Request:  exchange(i32 LE) | kind(u8) | [non_repeaters(u32 LE)
//!           max_repetitions(u32 LE)] | version(u8) | secret(u16 LE + bytes)
//!           | oid count(u16 LE) | per OID: arc count(u16 LE) + arcs(u64 LE)
//! Response: exchange(i32 LE) | error_status(i32 LE) | error_index(u32 LE)
//!           | binding count(u16 LE) | per binding: oid + tag(u8)
//!           [+ value(u16 LE + bytes) when tag is 0]

use bytes::Bytes;
use snmp_stream::oid::ObjectIdentity;
use snmp_stream::pdu::{CodecError, ExchangeId, PduCodec, PduKind, ResponsePdu};
use snmp_stream::varbind::{VarBind, VarBindValue};
use snmp_stream::Community;

const KIND_GET: u8 = 0;
const KIND_GET_NEXT: u8 = 1;
const KIND_GET_BULK: u8 = 2;

const TAG_OPAQUE: u8 = 0;
const TAG_NO_SUCH_OBJECT: u8 = 1;
const TAG_NO_SUCH_INSTANCE: u8 = 2;
const TAG_END_OF_MIB_VIEW: u8 = 3;

/// Correlator for the toy format: responses lead with the exchange id.
pub fn correlator(data: &[u8]) -> Option<ExchangeId> {
    data.get(..4)
        .map(|b| ExchangeId(i32::from_le_bytes(b.try_into().unwrap())))
}

/// The toy codec the engine is driven with in tests.
#[derive(Clone)]
pub struct TestCodec;

impl PduCodec for TestCodec {
    fn encode(
        &self,
        exchange: ExchangeId,
        kind: PduKind,
        community: &Community,
        oids: &[ObjectIdentity],
    ) -> Result<Bytes, CodecError> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&exchange.0.to_le_bytes());
        match kind {
            PduKind::Get => buf.push(KIND_GET),
            PduKind::GetNext => buf.push(KIND_GET_NEXT),
            PduKind::GetBulk {
                non_repeaters,
                max_repetitions,
            } => {
                buf.push(KIND_GET_BULK);
                buf.extend_from_slice(&non_repeaters.to_le_bytes());
                buf.extend_from_slice(&max_repetitions.to_le_bytes());
            }
        }
        buf.push(community.version().as_i32() as u8);
        let secret = community.secret();
        buf.extend_from_slice(&(secret.len() as u16).to_le_bytes());
        buf.extend_from_slice(secret);
        buf.extend_from_slice(&(oids.len() as u16).to_le_bytes());
        for oid in oids {
            write_oid(&mut buf, oid);
        }
        Ok(buf.into())
    }

    fn decode(&self, data: &[u8]) -> Result<ResponsePdu, CodecError> {
        let mut r = Cursor { data, pos: 0 };
        let exchange = ExchangeId(r.i32()?);
        let error_status = r.i32()?;
        let error_index = r.u32()?;
        let count = r.u16()?;
        let mut var_binds = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let oid = r.oid()?;
            let value = match r.u8()? {
                TAG_OPAQUE => {
                    let len = r.u16()? as usize;
                    VarBindValue::Opaque(Bytes::copy_from_slice(r.bytes(len)?))
                }
                TAG_NO_SUCH_OBJECT => VarBindValue::NoSuchObject,
                TAG_NO_SUCH_INSTANCE => VarBindValue::NoSuchInstance,
                TAG_END_OF_MIB_VIEW => VarBindValue::EndOfMibView,
                tag => return Err(CodecError::new(format!("unknown value tag {}", tag))),
            };
            var_binds.push(VarBind::new(oid, value));
        }
        Ok(ResponsePdu {
            exchange,
            error_status,
            error_index,
            var_binds,
        })
    }
}

/// A request as the mock agent sees it.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub exchange: i32,
    pub kind: PduKind,
    pub oids: Vec<ObjectIdentity>,
}

/// Parse a request PDU in the toy format.
pub fn decode_request(data: &[u8]) -> Result<ParsedRequest, CodecError> {
    let mut r = Cursor { data, pos: 0 };
    let exchange = r.i32()?;
    let kind = match r.u8()? {
        KIND_GET => PduKind::Get,
        KIND_GET_NEXT => PduKind::GetNext,
        KIND_GET_BULK => PduKind::GetBulk {
            non_repeaters: r.u32()?,
            max_repetitions: r.u32()?,
        },
        kind => return Err(CodecError::new(format!("unknown request kind {}", kind))),
    };
    let _version = r.u8()?;
    let secret_len = r.u16()? as usize;
    r.bytes(secret_len)?;
    let count = r.u16()?;
    let mut oids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        oids.push(r.oid()?);
    }
    Ok(ParsedRequest {
        exchange,
        kind,
        oids,
    })
}

/// Build a response PDU in the toy format.
pub fn encode_response(
    exchange: i32,
    error_status: i32,
    error_index: u32,
    var_binds: &[VarBind],
) -> Bytes {
    let mut buf = Vec::new();
    buf.extend_from_slice(&exchange.to_le_bytes());
    buf.extend_from_slice(&error_status.to_le_bytes());
    buf.extend_from_slice(&error_index.to_le_bytes());
    buf.extend_from_slice(&(var_binds.len() as u16).to_le_bytes());
    for vb in var_binds {
        write_oid(&mut buf, &vb.oid);
        match &vb.value {
            VarBindValue::Opaque(bytes) => {
                buf.push(TAG_OPAQUE);
                buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                buf.extend_from_slice(bytes);
            }
            VarBindValue::NoSuchObject => buf.push(TAG_NO_SUCH_OBJECT),
            VarBindValue::NoSuchInstance => buf.push(TAG_NO_SUCH_INSTANCE),
            VarBindValue::EndOfMibView => buf.push(TAG_END_OF_MIB_VIEW),
        }
    }
    buf.into()
}

fn write_oid(buf: &mut Vec<u8>, oid: &ObjectIdentity) {
    buf.extend_from_slice(&(oid.len() as u16).to_le_bytes());
    for &arc in oid.arcs() {
        buf.extend_from_slice(&arc.to_le_bytes());
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.pos + len > self.data.len() {
            return Err(CodecError::new("truncated PDU"));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.bytes(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.bytes(4)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.bytes(4)?.try_into().unwrap()))
    }

    fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.bytes(8)?.try_into().unwrap()))
    }

    fn oid(&mut self) -> Result<ObjectIdentity, CodecError> {
        let count = self.u16()? as usize;
        let mut arcs = Vec::with_capacity(count);
        for _ in 0..count {
            arcs.push(self.u64()?);
        }
        Ok(ObjectIdentity::new(arcs))
    }
}
