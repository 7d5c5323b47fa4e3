use std::fmt;

// format tag carried by a RESP3 verbatim string: "=<len>\r\n<tag>:<text>\r\n"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbatimFormat {
    Text,
    Markdown,
    Unknown(String),
}

impl VerbatimFormat {
    pub(crate) fn from_tag(tag: &str) -> Self {
        match tag {
            "txt" => VerbatimFormat::Text,
            "mkd" => VerbatimFormat::Markdown,
            other => VerbatimFormat::Unknown(other.to_string()),
        }
    }

    pub(crate) fn as_tag(&self) -> &str {
        match self {
            VerbatimFormat::Text => "txt",
            VerbatimFormat::Markdown => "mkd",
            VerbatimFormat::Unknown(tag) => tag,
        }
    }
}

// a fully-assembled RESP reply value, coalesced across the RESP2 and RESP3
// type lattices. plain tagged union, consumers match on the variant. the
// two wire-level null forms ("_\r\n" and the legacy "$-1\r\n"/"*-1\r\n")
// both collapse to Value::Null.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    SimpleString(String),
    BlobString(Vec<u8>),
    VerbatimString(VerbatimFormat, String),
    Integer(i64),
    // arbitrary-precision signed integer, kept as its validated decimal
    // text instead of a bignum type; no bignum crate is in this
    // workspace's dependency stack.
    BigInteger(String),
    Double(f64),
    Boolean(bool),
    Null,
    Error { code: String, message: String },
    Array(Vec<Value>),
    // ordered key/value pairs, duplicates retained exactly as seen on the
    // wire.
    Map(Vec<(Value, Value)>),
    // unordered collection; duplicate elements collapse to a single
    // occurrence during assembly (first occurrence wins).
    Set(Vec<Value>),
}

impl Value {
    // splits a RESP error payload into (code, message) on the first space,
    // per the wire convention used by both '-' and '!' frames.
    pub(crate) fn split_code_message(payload: &str) -> (String, String) {
        match payload.split_once(' ') {
            Some((code, message)) => (code.to_string(), message.to_string()),
            None => (payload.to_string(), String::new()),
        }
    }

    // re-encodes this value back to its RESP3 wire form. separate from
    // RespCodec::encode, which only knows how to encode a flat command
    // argument list.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_wire_bytes(&mut out);
        out
    }

    fn write_wire_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Value::SimpleString(s) => {
                out.push(b'+');
                out.extend_from_slice(s.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Value::BlobString(bytes) => {
                out.extend_from_slice(format!("${}\r\n", bytes.len()).as_bytes());
                out.extend_from_slice(bytes);
                out.extend_from_slice(b"\r\n");
            }
            Value::VerbatimString(format, text) => {
                let tag = format.as_tag();
                let len = tag.len() + 1 + text.len();
                out.extend_from_slice(format!("={}\r\n{}:{}\r\n", len, tag, text).as_bytes());
            }
            Value::Integer(n) => {
                out.extend_from_slice(format!(":{}\r\n", n).as_bytes());
            }
            Value::BigInteger(digits) => {
                out.push(b'(');
                out.extend_from_slice(digits.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Value::Double(d) => {
                let text = if d.is_infinite() {
                    if *d > 0.0 { "inf".to_string() } else { "-inf".to_string() }
                } else {
                    format!("{}", d)
                };
                out.push(b',');
                out.extend_from_slice(text.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Value::Boolean(b) => {
                out.extend_from_slice(if *b { b"#t\r\n" } else { b"#f\r\n" });
            }
            Value::Null => out.extend_from_slice(b"_\r\n"),
            Value::Error { code, message } => {
                out.push(b'-');
                out.extend_from_slice(code.as_bytes());
                if !message.is_empty() {
                    out.push(b' ');
                    out.extend_from_slice(message.as_bytes());
                }
                out.extend_from_slice(b"\r\n");
            }
            Value::Array(items) => {
                out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
                for item in items {
                    item.write_wire_bytes(out);
                }
            }
            Value::Map(pairs) => {
                out.extend_from_slice(format!("%{}\r\n", pairs.len()).as_bytes());
                for (key, value) in pairs {
                    key.write_wire_bytes(out);
                    value.write_wire_bytes(out);
                }
            }
            Value::Set(items) => {
                out.extend_from_slice(format!("~{}\r\n", items.len()).as_bytes());
                for item in items {
                    item.write_wire_bytes(out);
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::SimpleString(s) => write!(f, "{}", s),
            Value::BlobString(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::VerbatimString(_, text) => write!(f, "{}", text),
            Value::Integer(n) => write!(f, "{}", n),
            Value::BigInteger(digits) => write!(f, "{}", digits),
            Value::Double(d) => write!(f, "{}", d),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "(nil)"),
            Value::Error { code, message } => write!(f, "{} {}", code, message),
            Value::Array(items) => write!(f, "{:?}", items),
            Value::Map(pairs) => write!(f, "{:?}", pairs),
            Value::Set(items) => write!(f, "{:?}", items),
        }
    }
}
