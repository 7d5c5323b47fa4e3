// streaming codec for the Redis Serialization Protocol: RESP2 plus the
// RESP3 extensions. covers the wire codec only, nothing about sockets,
// connection pools, database selection, or individual commands.

mod assembler;
mod codec;
mod encode;
mod error;
mod frame;
#[cfg(feature = "tokio-codec")]
mod tokio_codec;
mod value;

pub use codec::RespCodec;
pub use encode::EncodableArg;
pub use error::{EncodeArgumentError, ProtocolError};
pub use value::{Value, VerbatimFormat};

#[cfg(feature = "tokio-codec")]
pub use tokio_codec::{encode_command, TokioRespCodec};
