// an optional tokio_util::codec adapter over RespCodec. RespCodec itself
// stays transport-agnostic; this type is just a thin consumer of it,
// gated behind the tokio-codec feature so pulling in tokio-util is
// opt-in.

use bytes::BytesMut;
use std::collections::VecDeque;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::RespCodec;
use crate::encode::EncodableArg;
use crate::error::{EncodeArgumentError, ProtocolError};
use crate::value::Value;

// adapts RespCodec to tokio_util::codec::{Decoder, Encoder} so a caller
// that wants framed async I/O can do
// Framed::new(stream, TokioRespCodec::default()).
#[derive(Debug, Default)]
pub struct TokioRespCodec {
    inner: RespCodec,
    ready: VecDeque<Value>,
}

impl Decoder for TokioRespCodec {
    type Item = Value;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(value) = self.ready.pop_front() {
            return Ok(Some(value));
        }

        self.inner.write(src);
        src.clear();

        let mut values = self.inner.parse()?.into_iter();
        let first = values.next();
        self.ready.extend(values);
        Ok(first)
    }
}

impl Encoder<Value> for TokioRespCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.to_wire_bytes());
        Ok(())
    }
}

// encodes a command argument list directly to a destination buffer, for
// callers driving a Framed transport that want to send a command without
// round-tripping through Value.
pub fn encode_command<A: Into<EncodableArg>>(
    codec: &RespCodec,
    args: impl IntoIterator<Item = A>,
    dst: &mut BytesMut,
) -> Result<(), EncodeArgumentError> {
    dst.extend_from_slice(&codec.encode(args)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn decodes_values_across_multiple_poll_calls() {
        let mut codec = TokioRespCodec::default();
        let mut src = BytesMut::from(&b"+OK\r\n:42\r\n"[..]);

        assert_eq!(codec.decode(&mut src).unwrap(), Some(Value::SimpleString("OK".into())));
        assert_eq!(codec.decode(&mut src).unwrap(), Some(Value::Integer(42)));
        assert_eq!(codec.decode(&mut src).unwrap(), None);
    }

    #[test]
    fn encodes_a_value_to_its_wire_form() {
        let mut codec = TokioRespCodec::default();
        let mut dst = BytesMut::new();
        codec.encode(Value::SimpleString("OK".into()), &mut dst).unwrap();
        assert_eq!(&dst[..], b"+OK\r\n");
    }
}
