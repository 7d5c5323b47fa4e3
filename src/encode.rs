// turns a flat command argument list into the RESP array of bulk strings
// used to invoke a command. re-serializing an already assembled Value is
// handled by Value::to_wire_bytes instead.

use crate::error::EncodeArgumentError;

// a single command argument as the caller supplies it. only Str and Int
// are valid wire arguments; Double and Boolean exist so a caller
// assembling an argument list generically, from values it already holds
// as some other numeric/boolean type, doesn't need a separate fallible
// conversion step before calling encode. the rejection happens at encode
// time instead, matching the "any other argument kind is rejected"
// contract.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodableArg {
    Str(String),
    Int(i64),
    Double(f64),
    Boolean(bool),
}

impl From<&str> for EncodableArg {
    fn from(value: &str) -> Self {
        EncodableArg::Str(value.to_string())
    }
}

impl From<String> for EncodableArg {
    fn from(value: String) -> Self {
        EncodableArg::Str(value)
    }
}

impl From<i64> for EncodableArg {
    fn from(value: i64) -> Self {
        EncodableArg::Int(value)
    }
}

impl EncodableArg {
    fn transport_bytes(&self) -> Option<Vec<u8>> {
        match self {
            EncodableArg::Str(s) => Some(s.as_bytes().to_vec()),
            EncodableArg::Int(n) => Some(n.to_string().into_bytes()),
            EncodableArg::Double(_) | EncodableArg::Boolean(_) => None,
        }
    }
}

// encodes args as "*N\r\n" followed by one "$len\r\n<bytes>\r\n" bulk
// string per argument, where len is the byte length (not the character
// count) of the argument's transport encoding.
pub(crate) fn encode_args<A: Into<EncodableArg>>(
    args: impl IntoIterator<Item = A>,
) -> Result<Vec<u8>, EncodeArgumentError> {
    let args: Vec<EncodableArg> = args.into_iter().map(Into::into).collect();

    let mut bodies = Vec::with_capacity(args.len());
    for (index, arg) in args.into_iter().enumerate() {
        match arg.transport_bytes() {
            Some(bytes) => bodies.push(bytes),
            None => return Err(EncodeArgumentError::UnsupportedArgument(index)),
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(format!("*{}\r\n", bodies.len()).as_bytes());
    for bytes in bodies {
        out.extend_from_slice(format!("${}\r\n", bytes.len()).as_bytes());
        out.extend_from_slice(&bytes);
        out.extend_from_slice(b"\r\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_mixed_string_and_integer_arguments() {
        let bytes = encode_args(vec![
            EncodableArg::Str("SET".into()),
            EncodableArg::Str("string1".into()),
            EncodableArg::Str("124235".into()),
        ])
        .unwrap();
        assert_eq!(bytes, b"*3\r\n$3\r\nSET\r\n$7\r\nstring1\r\n$6\r\n124235\r\n".to_vec());
    }

    #[test]
    fn encodes_negative_integer_argument_without_leading_zeros() {
        let bytes = encode_args(vec![EncodableArg::Str("INCRBY".into()), EncodableArg::Int(-7)]).unwrap();
        assert_eq!(bytes, b"*2\r\n$6\r\nINCRBY\r\n$2\r\n-7\r\n".to_vec());
    }

    #[test]
    fn byte_length_counts_utf8_bytes_not_code_points() {
        let bytes = encode_args(vec![EncodableArg::Str("caf\u{e9}".into())]).unwrap();
        assert_eq!(bytes, b"*1\r\n$5\r\ncaf\xc3\xa9\r\n".to_vec());
    }

    #[test]
    fn rejects_an_argument_that_is_neither_string_nor_integer() {
        let err = encode_args(vec![
            EncodableArg::Str("SET".into()),
            EncodableArg::Double(1.5),
        ])
        .unwrap_err();
        assert_eq!(err, EncodeArgumentError::UnsupportedArgument(1));
    }
}
