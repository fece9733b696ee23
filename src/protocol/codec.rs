//! Wire codecs for invokes
//!
//! Two encodings of the same node tree:
//! - text: the preserves text syntax of [`Node::to_io_value`], readable in logs
//! - frame: `[4-byte length prefix (little-endian)] + [preserves-packed node]`,
//!   behind the default `frame` feature for transports that leave byte
//!   framing to this crate
//!
//! Binary parameter payloads are never encoded (see [`Parameter::to_node`](super::parameter::Parameter::to_node)).

use preserves::IOValue;
#[cfg(feature = "frame")]
use preserves::PackedWriter;

use super::error::{CodecError, CodecResult};
use super::invoke::Invoke;
use crate::util::node::Node;

#[cfg(feature = "frame")]
const PREFIX_LEN: usize = 4;

/// Render an invoke in preserves text syntax.
pub fn encode_text(invoke: &Invoke) -> String {
    format!("{:?}", invoke.to_node().to_io_value())
}

/// Parse an invoke from preserves text syntax.
pub fn decode_text(text: &str) -> CodecResult<Invoke> {
    let value: IOValue = text
        .parse()
        .map_err(|err| CodecError::Text(format!("{}", err)))?;
    let node = Node::from_io_value(&value)
        .ok_or_else(|| CodecError::Text("value is not a node record".to_string()))?;
    Ok(Invoke::from_node(&node))
}

/// Encode an invoke as a length-prefixed packed frame.
#[cfg(feature = "frame")]
pub fn encode_frame(invoke: &Invoke) -> CodecResult<Vec<u8>> {
    let node = invoke.to_node();
    let mut data_buf = Vec::new();
    let mut writer = PackedWriter::new(&mut data_buf);
    preserves::serde::to_writer(&mut writer, &node)
        .map_err(|err| CodecError::Encoding(err.to_string()))?;

    let len = u32::try_from(data_buf.len()).map_err(|_| CodecError::FrameTooLarge {
        len: data_buf.len(),
        limit: u32::MAX as usize,
    })?;
    let mut result = Vec::with_capacity(PREFIX_LEN + data_buf.len());
    result.extend_from_slice(&len.to_le_bytes());
    result.extend_from_slice(&data_buf);

    Ok(result)
}

/// Decode a length-prefixed frame, refusing payloads above `max_len` bytes.
///
/// Bytes past the announced length are ignored.
#[cfg(feature = "frame")]
pub fn decode_frame(bytes: &[u8], max_len: usize) -> CodecResult<Invoke> {
    let prefix: [u8; PREFIX_LEN] = bytes
        .get(..PREFIX_LEN)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(CodecError::Truncated {
            expected: PREFIX_LEN,
            actual: bytes.len(),
        })?;

    let len = u32::from_le_bytes(prefix) as usize;
    if len > max_len {
        return Err(CodecError::FrameTooLarge {
            len,
            limit: max_len,
        });
    }

    let payload = bytes
        .get(PREFIX_LEN..PREFIX_LEN + len)
        .ok_or(CodecError::Truncated {
            expected: PREFIX_LEN + len,
            actual: bytes.len(),
        })?;

    let node: Node = preserves::serde::from_bytes(payload)
        .map_err(|err| CodecError::Decoding(err.to_string()))?;
    Ok(Invoke::from_node(&node))
}
