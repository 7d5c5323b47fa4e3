use thiserror::Error;

// out-of-band failure raised while scanning or assembling a reply.
// incompleteness (a frame that hasn't fully arrived yet) is never
// represented here, it's handled internally and never reaches parse's
// caller as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unrecognised frame type byte {0:#04x}")]
    UnknownType(u8),

    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("aggregate nesting exceeded the configured depth limit ({0})")]
    DepthExceeded(usize),
}

// raised by RespCodec::encode when an argument is neither a string nor an
// integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeArgumentError {
    #[error("argument {0} is neither a string nor an integer")]
    UnsupportedArgument(usize),
}
