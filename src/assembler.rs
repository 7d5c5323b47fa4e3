// folds the flat frame list produced by the frame scanner into nested
// Value trees, one per top-level frame.
//
// assembly and byte-commitment are coupled on purpose: a top-level value
// whose aggregate structure isn't fully present yet (not enough frames
// scanned to satisfy its header count) is discarded silently, and none of
// the bytes it would have consumed are committed. that keeps the
// in-progress aggregate's header and already-scanned children sitting in
// the receive buffer, intact, so a later write can complete it without
// reinterpreting anything.

use crate::error::ProtocolError;
use crate::frame::{Frame, ScannedFrame};
use crate::value::{Value, VerbatimFormat};

// ceiling on aggregate nesting depth. generous for any real reply shape,
// low enough to refuse a hostile "*99999999\r\n*99999999\r\n..." payload
// before it can exhaust the stack.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 512;

// assembles every complete top-level value the scanned frames contain.
// returns the values in source order, plus the number of bytes (summed
// from the consumed frames' lengths) that may be dropped from the front
// of the receive buffer.
pub(crate) fn assemble_all(
    scanned: &[ScannedFrame],
    max_depth: usize,
) -> Result<(Vec<Value>, usize), ProtocolError> {
    let mut idx = 0;
    let mut commit_bytes = 0;
    let mut values = Vec::new();

    while idx < scanned.len() {
        let start = idx;
        match assemble_one(scanned, &mut idx, max_depth, 0)? {
            Some(value) => {
                commit_bytes += scanned[start..idx].iter().map(|sf| sf.len).sum::<usize>();
                values.push(value);
            }
            None => break,
        }
    }

    Ok((values, commit_bytes))
}

// consumes one top-level frame (and, recursively, its children) from
// scanned[*idx..], advancing *idx past everything it consumed.
// returns Ok(None) when the frame list ran out before an aggregate's
// declared count was satisfied: an underrun, not an error.
fn assemble_one(
    scanned: &[ScannedFrame],
    idx: &mut usize,
    max_depth: usize,
    depth: usize,
) -> Result<Option<Value>, ProtocolError> {
    if *idx >= scanned.len() {
        return Ok(None);
    }
    if depth > max_depth {
        return Err(ProtocolError::DepthExceeded(max_depth));
    }

    let frame = scanned[*idx].frame.clone();
    *idx += 1;

    let value = match frame {
        Frame::SimpleString(s) => Value::SimpleString(s),
        Frame::SimpleError { code, message } => Value::Error { code, message },
        Frame::Integer(n) => Value::Integer(n),
        Frame::BigInteger(digits) => Value::BigInteger(digits),
        Frame::Double(d) => Value::Double(d),
        Frame::Boolean(b) => Value::Boolean(b),
        Frame::Null | Frame::BlobNull | Frame::NullArray => Value::Null,
        Frame::BlobString(bytes) => Value::BlobString(bytes),
        Frame::BlobError { code, message } => Value::Error { code, message },
        Frame::VerbatimString { format, text } => {
            Value::VerbatimString(VerbatimFormat::from_tag(&format), text)
        }
        Frame::ArrayHeader(n) => {
            let mut items = Vec::with_capacity(available_capacity(n, scanned.len(), *idx));
            for _ in 0..n {
                match assemble_one(scanned, idx, max_depth, depth + 1)? {
                    Some(item) => items.push(item),
                    None => return Ok(None),
                }
            }
            Value::Array(items)
        }
        Frame::MapHeader(n) => {
            let mut pairs = Vec::with_capacity(available_capacity(n, scanned.len(), *idx));
            for _ in 0..n {
                let key = match assemble_one(scanned, idx, max_depth, depth + 1)? {
                    Some(key) => key,
                    None => return Ok(None),
                };
                let value = match assemble_one(scanned, idx, max_depth, depth + 1)? {
                    Some(value) => value,
                    None => return Ok(None),
                };
                pairs.push((key, value));
            }
            Value::Map(pairs)
        }
        Frame::SetHeader(n) => {
            let mut items: Vec<Value> = Vec::with_capacity(available_capacity(n, scanned.len(), *idx));
            for _ in 0..n {
                match assemble_one(scanned, idx, max_depth, depth + 1)? {
                    Some(item) => {
                        if !items.contains(&item) {
                            items.push(item);
                        }
                    }
                    None => return Ok(None),
                }
            }
            Value::Set(items)
        }
    };

    Ok(Some(value))
}

// bounds a declared aggregate count by the frames actually available to
// satisfy it, so a hostile header like "*999999999999\r\n" with no
// children buffered can't drive an allocation sized off the attacker's
// number. the real count still wins once enough frames have arrived.
fn available_capacity(declared: usize, scanned_len: usize, idx: usize) -> usize {
    declared.min(scanned_len.saturating_sub(idx))
}
