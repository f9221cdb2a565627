//! starkbridge Types - Core type definitions for the transcoding pipeline.
//!
//! This crate provides the fundamental types shared by the codec and the SDK:
//! - Felts (prime-field elements, the atomic calldata unit)
//! - keccak256 / destination-chain keccak digests
//! - ParamType descriptors and SolValue trees
//! - Parsed contract interface descriptors (ABI JSON)

pub mod abi;
pub mod error;
pub mod felt;
pub mod keccak;
pub mod param;
pub mod value;

pub use abi::{Abi, Event, Function, StateMutability};
pub use error::TypesError;
pub use felt::{Felt, FIELD_PRIME};
pub use keccak::{keccak256, starknet_keccak, Hash256};
pub use param::{Param, ParamType};
pub use value::SolValue;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Abi, Event, Felt, Function, Hash256, Param, ParamType, SolValue, StateMutability,
        TypesError,
    };
}
