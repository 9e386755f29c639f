//! Protocol frames.
//!
//! Frames are the opaque byte payloads the transport carries; framing and
//! anything below (compression, encryption) is the transport's concern.
//! Layout follows the codec's wire conventions: one u8 frame tag, then
//! little-endian fields and u32-length-prefixed blobs.

use crate::error::{ProtocolError, ProtocolResult};
use gridlink_codec::meta::{get_str, get_type, put_str, put_type};
use gridlink_codec::{ByteSource, CodecError, SliceSource};
use gridlink_schema::{ColumnDef, IndexAlgorithm, IndexDef, TableDef};

/// A frame sent from client to server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFrame {
    /// Requests rows matching the given query descriptors.
    Subscribe(Subscribe),
    /// Invokes a reducer with encoded arguments.
    CallReducer(CallReducer),
    /// Removes previously subscribed queries from the client's view.
    Unsubscribe(Unsubscribe),
    /// Announces an orderly disconnect.
    Disconnect,
}

/// A frame delivered from server to client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    /// Table descriptors and their full initial row sets.
    InitialSnapshot(InitialSnapshot),
    /// One event's worth of row deltas, optionally carrying a call result.
    TransactionUpdate(TransactionUpdate),
}

/// A subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe {
    /// Client-assigned id correlating the snapshot response.
    pub request_id: u32,
    /// Query descriptors.
    pub queries: Vec<String>,
}

/// A reducer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReducer {
    /// Fresh correlation token; echoed in the matching result.
    pub token: u64,
    /// Reducer name.
    pub reducer: String,
    /// BSATN encoding of the argument product.
    pub args: Vec<u8>,
}

/// An unsubscribe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsubscribe {
    /// Client-assigned id.
    pub request_id: u32,
    /// Ids of queries to drop.
    pub query_ids: Vec<u32>,
}

/// The initial snapshot for a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialSnapshot {
    /// Echo of the subscribe request id.
    pub request_id: u32,
    /// Per-table descriptors and row sets.
    pub tables: Vec<TableSnapshot>,
}

/// One table's descriptor and full initial row set.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Server-assigned table id, referenced by later deltas.
    pub table_id: u32,
    /// The table descriptor.
    pub table: TableDef,
    /// BSATN row encodings.
    pub rows: Vec<Vec<u8>>,
}

/// Row deltas for one committed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionUpdate {
    /// Server-assigned, monotonically increasing event ordinal.
    pub event_id: u64,
    /// Result of the reducer call that produced this event, if it was ours.
    pub call_result: Option<CallResult>,
    /// Per-table insert/delete batches.
    pub deltas: Vec<TableDelta>,
}

/// Insert/delete batches for one table within one event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDelta {
    /// Table id from the snapshot.
    pub table_id: u32,
    /// BSATN encodings of inserted rows.
    pub inserts: Vec<Vec<u8>>,
    /// BSATN encodings of deleted rows.
    pub deletes: Vec<Vec<u8>>,
}

/// Resolution of a reducer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    /// The correlation token from the originating [`CallReducer`].
    pub token: u64,
    /// Reducer name.
    pub reducer: String,
    /// Whether the call committed or was rejected.
    pub status: CallStatus,
}

/// Outcome of a reducer call. A failure is a normal, expected outcome
/// carrying the reducer's error message, not a protocol defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    /// The reducer ran and its changes committed.
    Committed,
    /// The reducer rejected the call.
    Failed(String),
}

impl ClientFrame {
    /// Returns the frame's tag byte.
    pub fn type_code(&self) -> u8 {
        match self {
            ClientFrame::Subscribe(_) => 1,
            ClientFrame::CallReducer(_) => 2,
            ClientFrame::Unsubscribe(_) => 3,
            ClientFrame::Disconnect => 4,
        }
    }

    /// Encodes the frame to bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![self.type_code()];
        match self {
            ClientFrame::Subscribe(f) => {
                put_u32(f.request_id, &mut buf);
                put_u32(f.queries.len() as u32, &mut buf);
                for q in &f.queries {
                    put_str(q, &mut buf);
                }
            }
            ClientFrame::CallReducer(f) => {
                put_u64(f.token, &mut buf);
                put_str(&f.reducer, &mut buf);
                put_blob(&f.args, &mut buf);
            }
            ClientFrame::Unsubscribe(f) => {
                put_u32(f.request_id, &mut buf);
                put_u32(f.query_ids.len() as u32, &mut buf);
                for id in &f.query_ids {
                    put_u32(*id, &mut buf);
                }
            }
            ClientFrame::Disconnect => {}
        }
        buf
    }

    /// Decodes a frame from bytes.
    ///
    /// # Errors
    ///
    /// Fails on an unknown tag, truncated input, or trailing bytes.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut src = SliceSource::new(bytes);
        let frame = match read_u8(&mut src)? {
            1 => ClientFrame::Subscribe(Subscribe {
                request_id: read_u32(&mut src)?,
                queries: read_vec(&mut src, |s| Ok(get_str(s)?))?,
            }),
            2 => ClientFrame::CallReducer(CallReducer {
                token: read_u64(&mut src)?,
                reducer: get_str(&mut src)?,
                args: read_blob(&mut src)?,
            }),
            3 => ClientFrame::Unsubscribe(Unsubscribe {
                request_id: read_u32(&mut src)?,
                query_ids: read_vec(&mut src, |s| read_u32(s))?,
            }),
            4 => ClientFrame::Disconnect,
            tag => return Err(ProtocolError::UnknownFrame { tag }),
        };
        finish(src)?;
        Ok(frame)
    }
}

impl ServerFrame {
    /// Returns the frame's tag byte.
    pub fn type_code(&self) -> u8 {
        match self {
            ServerFrame::InitialSnapshot(_) => 1,
            ServerFrame::TransactionUpdate(_) => 2,
        }
    }

    /// Encodes the frame to bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![self.type_code()];
        match self {
            ServerFrame::InitialSnapshot(f) => {
                put_u32(f.request_id, &mut buf);
                put_u32(f.tables.len() as u32, &mut buf);
                for table in &f.tables {
                    put_u32(table.table_id, &mut buf);
                    put_table(&table.table, &mut buf);
                    put_u32(table.rows.len() as u32, &mut buf);
                    for row in &table.rows {
                        put_blob(row, &mut buf);
                    }
                }
            }
            ServerFrame::TransactionUpdate(f) => {
                put_u64(f.event_id, &mut buf);
                match &f.call_result {
                    None => buf.push(0),
                    Some(result) => {
                        buf.push(1);
                        put_u64(result.token, &mut buf);
                        put_str(&result.reducer, &mut buf);
                        match &result.status {
                            CallStatus::Committed => buf.push(0),
                            CallStatus::Failed(message) => {
                                buf.push(1);
                                put_str(message, &mut buf);
                            }
                        }
                    }
                }
                put_u32(f.deltas.len() as u32, &mut buf);
                for delta in &f.deltas {
                    put_u32(delta.table_id, &mut buf);
                    put_u32(delta.inserts.len() as u32, &mut buf);
                    for row in &delta.inserts {
                        put_blob(row, &mut buf);
                    }
                    put_u32(delta.deletes.len() as u32, &mut buf);
                    for row in &delta.deletes {
                        put_blob(row, &mut buf);
                    }
                }
            }
        }
        buf
    }

    /// Decodes a frame from bytes.
    ///
    /// # Errors
    ///
    /// Fails on an unknown tag, truncated input, malformed table descriptors,
    /// or trailing bytes.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut src = SliceSource::new(bytes);
        let frame = match read_u8(&mut src)? {
            1 => {
                let request_id = read_u32(&mut src)?;
                let tables = read_vec(&mut src, |s| {
                    let table_id = read_u32(s)?;
                    let table = get_table(s)?;
                    let rows = read_vec(s, |s| read_blob(s))?;
                    Ok(TableSnapshot {
                        table_id,
                        table,
                        rows,
                    })
                })?;
                ServerFrame::InitialSnapshot(InitialSnapshot { request_id, tables })
            }
            2 => {
                let event_id = read_u64(&mut src)?;
                let call_result = match read_u8(&mut src)? {
                    0 => None,
                    1 => {
                        let token = read_u64(&mut src)?;
                        let reducer = get_str(&mut src)?;
                        let status = match read_u8(&mut src)? {
                            0 => CallStatus::Committed,
                            1 => CallStatus::Failed(get_str(&mut src)?),
                            value => {
                                return Err(ProtocolError::InvalidField {
                                    field: "call status",
                                    value,
                                })
                            }
                        };
                        Some(CallResult {
                            token,
                            reducer,
                            status,
                        })
                    }
                    value => {
                        return Err(ProtocolError::InvalidField {
                            field: "call result marker",
                            value,
                        })
                    }
                };
                let deltas = read_vec(&mut src, |s| {
                    let table_id = read_u32(s)?;
                    let inserts = read_vec(s, |s| read_blob(s))?;
                    let deletes = read_vec(s, |s| read_blob(s))?;
                    Ok(TableDelta {
                        table_id,
                        inserts,
                        deletes,
                    })
                })?;
                ServerFrame::TransactionUpdate(TransactionUpdate {
                    event_id,
                    call_result,
                    deltas,
                })
            }
            tag => return Err(ProtocolError::UnknownFrame { tag }),
        };
        finish(src)?;
        Ok(frame)
    }
}

/// Appends the wire encoding of a table descriptor.
///
/// This is the schema registration surface: descriptors travel as their
/// column types (via the codec's meta-encoding) plus constraint metadata.
pub fn put_table(table: &TableDef, buf: &mut Vec<u8>) {
    put_str(&table.name, buf);
    buf.push(u8::from(table.is_public));
    put_u32(table.columns.len() as u32, buf);
    for col in &table.columns {
        put_str(&col.name, buf);
        put_type(&col.ty, buf);
        let mut flags = 0u8;
        if col.is_primary_key {
            flags |= 1;
        }
        if col.is_unique {
            flags |= 1 << 1;
        }
        if col.is_auto_inc {
            flags |= 1 << 2;
        }
        if col.is_schedule_at {
            flags |= 1 << 3;
        }
        buf.push(flags);
        match col.index {
            None => buf.push(0),
            Some(algo) => {
                buf.push(1);
                buf.push(index_algorithm_code(algo));
            }
        }
    }
    put_u32(table.indexes.len() as u32, buf);
    for index in &table.indexes {
        put_str(&index.name, buf);
        buf.push(index_algorithm_code(index.algorithm));
        put_u32(index.columns.len() as u32, buf);
        for col in &index.columns {
            put_str(col, buf);
        }
    }
    match &table.scheduled_reducer {
        None => buf.push(0),
        Some(reducer) => {
            buf.push(1);
            put_str(reducer, buf);
        }
    }
}

/// Reads one wire-encoded table descriptor.
///
/// # Errors
///
/// Fails on truncated input or out-of-range flag/algorithm bytes.
pub fn get_table<S: ByteSource>(src: &mut S) -> ProtocolResult<TableDef> {
    let name = get_str(src)?;
    let is_public = read_bool(src, "table visibility")?;
    let columns = read_vec(src, |s| {
        let name = get_str(s)?;
        let ty = get_type(s)?;
        let flags = read_u8(s)?;
        let index = match read_u8(s)? {
            0 => None,
            1 => Some(index_algorithm_from_code(read_u8(s)?)?),
            value => {
                return Err(ProtocolError::InvalidField {
                    field: "column index marker",
                    value,
                })
            }
        };
        Ok(ColumnDef {
            name,
            ty,
            is_primary_key: flags & 1 != 0,
            is_unique: flags & (1 << 1) != 0,
            is_auto_inc: flags & (1 << 2) != 0,
            index,
            is_schedule_at: flags & (1 << 3) != 0,
        })
    })?;
    let indexes = read_vec(src, |s| {
        let name = get_str(s)?;
        let algorithm = index_algorithm_from_code(read_u8(s)?)?;
        let columns = read_vec(s, |s| Ok(get_str(s)?))?;
        Ok(IndexDef {
            name,
            algorithm,
            columns,
        })
    })?;
    let scheduled_reducer = match read_u8(src)? {
        0 => None,
        1 => Some(get_str(src)?),
        value => {
            return Err(ProtocolError::InvalidField {
                field: "scheduled reducer marker",
                value,
            })
        }
    };
    Ok(TableDef {
        name,
        is_public,
        columns,
        indexes,
        scheduled_reducer,
    })
}

fn index_algorithm_code(algo: IndexAlgorithm) -> u8 {
    match algo {
        IndexAlgorithm::BTree => 0,
        IndexAlgorithm::Hash => 1,
    }
}

fn index_algorithm_from_code(code: u8) -> ProtocolResult<IndexAlgorithm> {
    match code {
        0 => Ok(IndexAlgorithm::BTree),
        1 => Ok(IndexAlgorithm::Hash),
        value => Err(ProtocolError::InvalidField {
            field: "index algorithm",
            value,
        }),
    }
}

fn put_u32(v: u32, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(v: u64, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_blob(blob: &[u8], buf: &mut Vec<u8>) {
    put_u32(blob.len() as u32, buf);
    buf.extend_from_slice(blob);
}

fn read_u8<S: ByteSource>(src: &mut S) -> ProtocolResult<u8> {
    let mut buf = [0u8; 1];
    src.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<S: ByteSource>(src: &mut S) -> ProtocolResult<u32> {
    let mut buf = [0u8; 4];
    src.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<S: ByteSource>(src: &mut S) -> ProtocolResult<u64> {
    let mut buf = [0u8; 8];
    src.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_bool<S: ByteSource>(src: &mut S, field: &'static str) -> ProtocolResult<bool> {
    match read_u8(src)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(ProtocolError::InvalidField { field, value }),
    }
}

fn read_blob<S: ByteSource>(src: &mut S) -> ProtocolResult<Vec<u8>> {
    let len = read_u32(src)? as usize;
    let mut blob = vec![0u8; len];
    src.read_exact(&mut blob)?;
    Ok(blob)
}

fn read_vec<S: ByteSource, T>(
    src: &mut S,
    mut read_one: impl FnMut(&mut S) -> ProtocolResult<T>,
) -> ProtocolResult<Vec<T>> {
    let count = read_u32(src)? as usize;
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(read_one(src)?);
    }
    Ok(items)
}

fn finish(src: SliceSource<'_>) -> ProtocolResult<()> {
    if src.is_empty() {
        Ok(())
    } else {
        Err(ProtocolError::Codec(CodecError::TrailingBytes {
            len: src.remaining(),
        }))
    }
}
