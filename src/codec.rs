// the codec facade: owns the receive buffer and exposes the three
// operations an external collaborator (a transport, a connection pool)
// needs: write, parse, encode. nothing about sockets, pools, or commands.

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::assembler::{assemble_all, DEFAULT_MAX_DEPTH};
use crate::encode::{encode_args, EncodableArg};
use crate::error::{EncodeArgumentError, ProtocolError};
use crate::frame::scan_all;
use crate::value::Value;

// initial receive-buffer capacity. the buffer still grows past this on
// demand.
const BUF_CAP: usize = 1024;

// a stateless-across-replies RESP2/RESP3 codec. not Sync: exactly one
// thread may hold a &mut RespCodec at a time. an owning connection object
// is responsible for serializing write and parse calls against each
// other; two codecs are fully independent of one another.
#[derive(Debug)]
pub struct RespCodec {
    buf: BytesMut,
    max_depth: usize,
}

impl RespCodec {
    pub fn new() -> Self {
        Self::with_capacity(BUF_CAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity), max_depth: DEFAULT_MAX_DEPTH }
    }

    // overrides the aggregate nesting depth the assembler will tolerate
    // before returning ProtocolError::DepthExceeded. useful for tests that
    // want a tight bound, or a caller that wants a looser one than
    // DEFAULT_MAX_DEPTH.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // appends chunk to the receive buffer. never fails and never
    // suspends; the codec performs no I/O of its own.
    pub fn write(&mut self, chunk: &[u8]) {
        trace!(bytes = chunk.len(), "appending to receive buffer");
        self.buf.extend_from_slice(chunk);
    }

    // scans and assembles every value the receive buffer currently holds
    // enough bytes to complete, in the order their first byte was
    // written. an incomplete trailing frame, including a partially
    // satisfied aggregate, is left untouched in the buffer for the next
    // write/parse cycle.
    pub fn parse(&mut self) -> Result<Vec<Value>, ProtocolError> {
        let scanned = scan_all(&self.buf)?;
        let (values, commit_bytes) = assemble_all(&scanned, self.max_depth)?;
        debug!(
            values = values.len(),
            committed_bytes = commit_bytes,
            remaining_bytes = self.buf.len() - commit_bytes,
            "parsed receive buffer"
        );
        self.buf.advance(commit_bytes);
        Ok(values)
    }

    // encodes args as the RESP array of bulk strings used to invoke a
    // command. does not touch the receive buffer.
    pub fn encode<A: Into<EncodableArg>>(
        &self,
        args: impl IntoIterator<Item = A>,
    ) -> Result<Vec<u8>, EncodeArgumentError> {
        encode_args(args)
    }
}

impl Default for RespCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_parse_round_trips_a_command() {
        let mut codec = RespCodec::new();
        let bytes = codec.encode(vec!["SET", "key", "value"]).unwrap();
        codec.write(&bytes);
        let values = codec.parse().unwrap();
        assert_eq!(
            values,
            vec![Value::Array(vec![
                Value::BlobString(b"SET".to_vec()),
                Value::BlobString(b"key".to_vec()),
                Value::BlobString(b"value".to_vec()),
            ])]
        );
    }

    #[test]
    fn retains_incomplete_tail_across_write_parse_cycles() {
        let mut codec = RespCodec::new();
        codec.write(b"+OK\r\n$5\r\nhel");
        assert_eq!(codec.parse().unwrap(), vec![Value::SimpleString("OK".into())]);

        codec.write(b"lo\r\n");
        assert_eq!(codec.parse().unwrap(), vec![Value::BlobString(b"hello".to_vec())]);
    }

    #[test]
    fn retains_incomplete_aggregate_header_across_cycles() {
        let mut codec = RespCodec::new();
        codec.write(b"*3\r\n:1\r\n:2\r\n");
        assert_eq!(codec.parse().unwrap(), Vec::<Value>::new());

        codec.write(b":3\r\n");
        assert_eq!(
            codec.parse().unwrap(),
            vec![Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])]
        );
    }

    #[test]
    fn splitting_a_frame_at_every_byte_boundary_converges_to_the_same_value() {
        let wire = b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n";
        for split in 0..wire.len() {
            let mut codec = RespCodec::new();
            codec.write(&wire[..split]);
            let first_pass = codec.parse().unwrap();
            assert!(first_pass.is_empty() || split == wire.len());

            codec.write(&wire[split..]);
            let second_pass = codec.parse().unwrap();

            let values: Vec<Value> = first_pass.into_iter().chain(second_pass).collect();
            assert_eq!(
                values,
                vec![Value::Map(vec![
                    (Value::SimpleString("first".into()), Value::Integer(1)),
                    (Value::SimpleString("second".into()), Value::Integer(2)),
                ])]
            );
        }
    }

    #[test]
    fn concatenated_frames_parse_in_order() {
        let mut codec = RespCodec::new();
        codec.write(b"+OK\r\n:42\r\n");
        assert_eq!(
            codec.parse().unwrap(),
            vec![Value::SimpleString("OK".into()), Value::Integer(42)]
        );
    }

    #[test]
    fn in_band_errors_flow_through_parse_as_values() {
        let mut codec = RespCodec::new();
        codec.write(b"-ERR unknown command 'foobar'\r\n");
        assert_eq!(
            codec.parse().unwrap(),
            vec![Value::Error { code: "ERR".into(), message: "unknown command 'foobar'".into() }]
        );
    }

    #[test]
    fn unknown_type_byte_is_a_protocol_error_not_a_silent_drop() {
        let mut codec = RespCodec::new();
        codec.write(b"^nope\r\n");
        assert_eq!(codec.parse(), Err(ProtocolError::UnknownType(b'^')));
    }

    #[test]
    fn malformed_frame_is_a_protocol_error_once_fully_buffered() {
        let mut codec = RespCodec::new();
        codec.write(b"#x\r\n");
        assert!(matches!(codec.parse(), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn two_independent_codecs_do_not_share_state() {
        let mut a = RespCodec::new();
        let mut b = RespCodec::new();

        a.write(b"+A\r\n");
        b.write(b"+B\r\n");

        assert_eq!(a.parse().unwrap(), vec![Value::SimpleString("A".into())]);
        assert_eq!(b.parse().unwrap(), vec![Value::SimpleString("B".into())]);
    }

    #[test]
    fn every_frame_survives_a_split_write_at_any_boundary() {
        let fragments: Vec<(&[u8], Value)> = vec![
            (b"+OK\r\n", Value::SimpleString("OK".into())),
            (b":12345\r\n", Value::Integer(12345)),
            (b"(99999999999999999999999999\r\n", Value::BigInteger("99999999999999999999999999".into())),
            (b",3.14\r\n", Value::Double(3.14)),
            (b"#t\r\n", Value::Boolean(true)),
            (b"_\r\n", Value::Null),
            (b"$5\r\nhello\r\n", Value::BlobString(b"hello".to_vec())),
            (b"-ERR bad\r\n", Value::Error { code: "ERR".into(), message: "bad".into() }),
            (
                b"*2\r\n$3\r\nget\r\n$5\r\nhello\r\n",
                Value::Array(vec![Value::BlobString(b"get".to_vec()), Value::BlobString(b"hello".to_vec())]),
            ),
        ];

        for (wire, expected) in fragments {
            for split in 0..=wire.len() {
                let mut codec = RespCodec::new();
                codec.write(&wire[..split]);
                let mut values = codec.parse().unwrap();
                codec.write(&wire[split..]);
                values.extend(codec.parse().unwrap());

                assert_eq!(values, vec![expected.clone()], "wire = {:?}, split = {}", wire, split);
            }
        }
    }

    #[test]
    fn scenario_table_from_the_spec() {
        let cases: Vec<(&[u8], Value)> = vec![
            (b"$6\r\nfoobar\r\n", Value::BlobString(b"foobar".to_vec())),
            (b"$-1\r\n", Value::Null),
            (b"$13\r\nhello\r\nworld!\r\n", Value::BlobString(b"hello\r\nworld!".to_vec())),
            (
                b"*3\r\n:1\r\n:2\r\n:3\r\n",
                Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
            ),
            (
                b"-ERR unknown command 'foobar'\r\n",
                Value::Error { code: "ERR".into(), message: "unknown command 'foobar'".into() },
            ),
            (
                b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n",
                Value::Map(vec![
                    (Value::SimpleString("first".into()), Value::Integer(1)),
                    (Value::SimpleString("second".into()), Value::Integer(2)),
                ]),
            ),
            (
                b"~3\r\n+orange\r\n+orange\r\n+apple\r\n",
                Value::Set(vec![Value::SimpleString("orange".into()), Value::SimpleString("apple".into())]),
            ),
            (b"=15\r\ntxt:Some string\r\n", Value::VerbatimString(crate::value::VerbatimFormat::Text, "Some string".into())),
            (
                b"(3492890328409238509324850943850943825024385\r\n",
                Value::BigInteger("3492890328409238509324850943850943825024385".into()),
            ),
        ];

        for (wire, expected) in cases {
            let mut codec = RespCodec::new();
            codec.write(wire);
            assert_eq!(codec.parse().unwrap(), vec![expected], "wire = {:?}", String::from_utf8_lossy(wire));
        }
    }
}
