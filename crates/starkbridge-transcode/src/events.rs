//! Event registry and log decoding.
//!
//! Emitted events arrive keyed by a single felt tag. The tag is derived
//! from the event's mangled destination name, which carries the full
//! Ethereum topic so distinct source events can never collide after
//! translation. Each registry instance is built from one ABI; registries
//! are never shared between contracts.

use crate::abi;
use crate::decode::{decode_params, FeltCursor};
use crate::error::{Result, TranscodeError};
use std::collections::HashMap;
use starkbridge_types::{starknet_keccak, Event, Felt, Hash256, SolValue};
use tracing::debug;

/// An ABI event indexed by its destination-side tag.
#[derive(Debug, Clone)]
pub struct RegisteredEvent {
    pub descriptor: Event,
    /// Ethereum topic, `keccak256` of the canonical signature.
    pub topic: Hash256,
    /// Mangled name the event is emitted under on the destination side.
    pub destination_name: String,
}

/// A decoded log entry in both representations.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub name: String,
    pub tag: Felt,
    pub topic: Hash256,
    /// Arguments as a name-keyed struct.
    pub args: SolValue,
    /// Arguments re-encoded as Ethereum ABI bytes, ready for log consumers.
    pub data: Vec<u8>,
}

/// Tag-keyed lookup of the events one contract can emit.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    by_tag: HashMap<Felt, RegisteredEvent>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry covering every event in an ABI.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut registry = Self::new();
        for event in events {
            registry.register(event.clone());
        }
        registry
    }

    /// Register one event under its derived tag.
    pub fn register(&mut self, descriptor: Event) {
        let topic = descriptor.topic();
        let destination_name = format!("{}_{}", descriptor.name, topic.to_hex());
        let tag = starknet_keccak(destination_name.as_bytes());
        debug!(event = %descriptor.name, %tag, "registered event");
        self.by_tag.insert(
            tag,
            RegisteredEvent {
                descriptor,
                topic,
                destination_name,
            },
        );
    }

    pub fn get(&self, tag: &Felt) -> Option<&RegisteredEvent> {
        self.by_tag.get(tag)
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Decode an emitted event payload.
    ///
    /// Unknown tags yield `Ok(None)`: a receipt routinely carries events of
    /// other contracts and those are not errors. A known tag with a
    /// malformed payload is an error.
    pub fn decode_event(&self, tag: &Felt, payload: &[Felt]) -> Result<Option<DecodedEvent>> {
        let Some(registered) = self.by_tag.get(tag) else {
            return Ok(None);
        };

        let mut cursor = FeltCursor::new(payload);
        let values = decode_params(&registered.descriptor.inputs, &mut cursor)?;
        if cursor.remaining() > 0 {
            return Err(TranscodeError::TrailingData(cursor.remaining()));
        }
        // always a struct, even for single-argument events
        let args = SolValue::Struct(
            registered
                .descriptor
                .inputs
                .iter()
                .zip(values.iter())
                .map(|(param, value)| (param.name.clone(), value.clone()))
                .collect(),
        );
        let data = abi::abi_encode(&registered.descriptor.inputs, &values)?;

        Ok(Some(DecodedEvent {
            name: registered.descriptor.name.clone(),
            tag: tag.clone(),
            topic: registered.topic,
            args,
            data,
        }))
    }
}
