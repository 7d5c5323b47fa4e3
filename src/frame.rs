// turns a contiguous byte slice into an ordered list of primitive frames,
// without interpreting aggregate structure. an array/map/set is scanned
// only as far as its header; its children are just the frames that follow
// in the flat list. folding those into nested Value trees is the
// assembler's job.

use crate::error::ProtocolError;

const CRLF: &[u8] = b"\r\n";

// one primitive wire unit: a leaf value or an aggregate header/null form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    SimpleString(String),
    SimpleError { code: String, message: String },
    Integer(i64),
    BigInteger(String),
    Double(f64),
    Boolean(bool),
    Null,
    BlobString(Vec<u8>),
    BlobNull,
    BlobError { code: String, message: String },
    VerbatimString { format: String, text: String },
    ArrayHeader(usize),
    NullArray,
    MapHeader(usize),
    SetHeader(usize),
}

// a frame paired with the number of buffer bytes it occupied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScannedFrame {
    pub frame: Frame,
    pub len: usize,
}

// scans as many complete primitive frames as the buffer currently holds,
// starting at offset 0. stops (without error) the moment a frame is
// incomplete; never matches a frame header inside a blob body, since blob
// bodies are always consumed byte-exactly by length before scanning
// resumes.
pub(crate) fn scan_all(buf: &[u8]) -> Result<Vec<ScannedFrame>, ProtocolError> {
    let mut pos = 0;
    let mut frames = Vec::new();
    while pos < buf.len() {
        match scan_one(&buf[pos..])? {
            Some(scanned) => {
                pos += scanned.len;
                frames.push(scanned);
            }
            None => break,
        }
    }
    Ok(frames)
}

fn scan_one(buf: &[u8]) -> Result<Option<ScannedFrame>, ProtocolError> {
    if buf.is_empty() {
        return Ok(None);
    }
    match buf[0] {
        b'+' => scan_line(buf, |payload| {
            Ok(Frame::SimpleString(utf8(payload)?.to_string()))
        }),
        b'-' => scan_line(buf, |payload| {
            let (code, message) = crate::value::Value::split_code_message(utf8(payload)?);
            Ok(Frame::SimpleError { code, message })
        }),
        b':' => scan_line(buf, |payload| parse_integer(utf8(payload)?).map(Frame::Integer)),
        b'(' => scan_line(buf, |payload| {
            parse_big_integer(utf8(payload)?).map(Frame::BigInteger)
        }),
        b',' => scan_line(buf, |payload| parse_double(utf8(payload)?).map(Frame::Double)),
        b'#' => scan_line(buf, |payload| parse_boolean(utf8(payload)?).map(Frame::Boolean)),
        b'_' => scan_line(buf, |payload| {
            if payload.is_empty() {
                Ok(Frame::Null)
            } else {
                Err(ProtocolError::Malformed("null frame must have an empty payload".into()))
            }
        }),
        b'*' => scan_line(buf, |payload| {
            let n = parse_integer(utf8(payload)?)?;
            if n == -1 {
                Ok(Frame::NullArray)
            } else if n >= 0 {
                Ok(Frame::ArrayHeader(n as usize))
            } else {
                Err(ProtocolError::Malformed(format!("negative array length {}", n)))
            }
        }),
        b'%' => scan_line(buf, |payload| {
            parse_nonneg_count(utf8(payload)?).map(Frame::MapHeader)
        }),
        b'~' => scan_line(buf, |payload| {
            parse_nonneg_count(utf8(payload)?).map(Frame::SetHeader)
        }),
        b'$' => scan_blob(buf, BlobKind::String),
        b'!' => scan_blob(buf, BlobKind::Error),
        b'=' => scan_blob(buf, BlobKind::Verbatim),
        other => Err(ProtocolError::UnknownType(other)),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ProtocolError> {
    std::str::from_utf8(bytes)
        .map_err(|_| ProtocolError::Malformed("payload is not valid UTF-8".into()))
}

// scans a "line" frame: <type-byte><payload>\r\n. returns Ok(None) if the
// terminating CRLF hasn't arrived yet.
fn scan_line(
    buf: &[u8],
    build: impl FnOnce(&[u8]) -> Result<Frame, ProtocolError>,
) -> Result<Option<ScannedFrame>, ProtocolError> {
    match find_crlf(buf, 1) {
        Some(pos) => {
            let frame = build(&buf[1..pos])?;
            Ok(Some(ScannedFrame { frame, len: pos + 2 }))
        }
        None => Ok(None),
    }
}

enum BlobKind {
    String,
    Error,
    Verbatim,
}

// scans a length-prefixed frame: <type><len>\r\n<len bytes>\r\n. the body
// is consumed by byte count, never by searching for a terminator, so an
// embedded CRLF inside the body can't be mistaken for the frame end.
fn scan_blob(buf: &[u8], kind: BlobKind) -> Result<Option<ScannedFrame>, ProtocolError> {
    let header_end = match find_crlf(buf, 1) {
        Some(pos) => pos,
        None => return Ok(None),
    };
    let length = parse_integer(utf8(&buf[1..header_end])?)?;
    let header_len = header_end + 2;

    if matches!(kind, BlobKind::String) && length == -1 {
        return Ok(Some(ScannedFrame { frame: Frame::BlobNull, len: header_len }));
    }
    if length < 0 {
        return Err(ProtocolError::Malformed(format!("negative blob length {}", length)));
    }
    let length = length as usize;

    let total_len = header_len + length + 2;
    if buf.len() < total_len {
        return Ok(None);
    }
    let body = &buf[header_len..header_len + length];
    if &buf[header_len + length..total_len] != CRLF {
        return Err(ProtocolError::Malformed(
            "blob body is not terminated by CRLF at the declared length".into(),
        ));
    }

    let frame = match kind {
        BlobKind::String => Frame::BlobString(body.to_vec()),
        BlobKind::Error => {
            let (code, message) = crate::value::Value::split_code_message(utf8(body)?);
            Frame::BlobError { code, message }
        }
        BlobKind::Verbatim => {
            if length < 4 || body[3] != b':' {
                return Err(ProtocolError::Malformed(
                    "verbatim string is missing its 3-byte format tag".into(),
                ));
            }
            let format = utf8(&body[..3])?.to_string();
            let text = utf8(&body[4..])?.to_string();
            Frame::VerbatimString { format, text }
        }
    };
    Ok(Some(ScannedFrame { frame, len: total_len }))
}

fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|pos| from + pos)
}

fn parse_integer(payload: &str) -> Result<i64, ProtocolError> {
    payload
        .parse::<i64>()
        .map_err(|_| ProtocolError::Malformed(format!("invalid integer payload {:?}", payload)))
}

fn parse_nonneg_count(payload: &str) -> Result<usize, ProtocolError> {
    let n = parse_integer(payload)?;
    if n < 0 {
        return Err(ProtocolError::Malformed(format!("negative aggregate count {}", n)));
    }
    Ok(n as usize)
}

fn parse_big_integer(payload: &str) -> Result<String, ProtocolError> {
    let digits = payload
        .strip_prefix('-')
        .or_else(|| payload.strip_prefix('+'))
        .unwrap_or(payload);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::Malformed(format!("invalid big integer payload {:?}", payload)));
    }
    Ok(payload.to_string())
}

fn parse_boolean(payload: &str) -> Result<bool, ProtocolError> {
    match payload {
        "t" => Ok(true),
        "f" => Ok(false),
        other => Err(ProtocolError::Malformed(format!("invalid boolean payload {:?}", other))),
    }
}

// [-]?\d+(\.\d+)?, or exactly inf/-inf. exponent notation and a bare
// leading dot are rejected even though f64::from_str would accept them.
fn parse_double(payload: &str) -> Result<f64, ProtocolError> {
    if payload == "inf" {
        return Ok(f64::INFINITY);
    }
    if payload == "-inf" {
        return Ok(f64::NEG_INFINITY);
    }

    let bytes = payload.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if i == int_start {
        return Err(malformed_double(payload));
    }
    if i < bytes.len() {
        if bytes[i] != b'.' {
            return Err(malformed_double(payload));
        }
        i += 1;
        let frac_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == frac_start {
            return Err(malformed_double(payload));
        }
    }
    if i != bytes.len() {
        return Err(malformed_double(payload));
    }

    payload.parse::<f64>().map_err(|_| malformed_double(payload))
}

fn malformed_double(payload: &str) -> ProtocolError {
    ProtocolError::Malformed(format!("invalid double payload {:?}", payload))
}
