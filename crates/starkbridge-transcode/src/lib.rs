//! Bidirectional transcoding between Ethereum ABI values and felt
//! sequences.
//!
//! The felt wire format is flat and ordered: wide integers split into two
//! limbs at the 2^128 boundary, dynamic values carry a length prefix, byte
//! runs use one felt per byte. [`encode`] and [`decode`] are exact inverses
//! over well-formed inputs. The [`abi`] module covers the Ethereum side
//! (calldata, log data, revert payloads) and [`events`] maps tag-keyed
//! destination events back to their source descriptors.

pub mod abi;
pub mod decode;
pub mod encode;
mod error;
pub mod events;
pub mod numeric;

pub use decode::{decode, decode_params, decode_value, FeltCursor};
pub use encode::{encode, encode_value};
pub use error::{Result, TranscodeError};
pub use events::{DecodedEvent, EventRegistry, RegisteredEvent};
