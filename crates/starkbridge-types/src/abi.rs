use crate::error::TypesError;
use crate::keccak::Hash256;
use crate::param::{Param, ParamType};
use serde::Deserialize;

/// Mutability flag of an ABI function. `Pure` and `View` select the
/// read-only execution strategy, everything else mutates state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn is_readonly(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

/// A declared ABI function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical Ethereum signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|p| p.kind.canonical()).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// keccak256 of the canonical signature.
    pub fn signature_hash(&self) -> Hash256 {
        Hash256::compute(self.signature().as_bytes())
    }

    /// Four-byte Ethereum method selector.
    pub fn selector(&self) -> [u8; 4] {
        self.signature_hash().selector()
    }
}

/// A declared ABI event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
}

impl Event {
    /// Canonical Ethereum signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|p| p.kind.canonical()).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// Ethereum log topic: keccak256 of the canonical signature.
    pub fn topic(&self) -> Hash256 {
        Hash256::compute(self.signature().as_bytes())
    }
}

/// Parsed contract interface descriptor: ordered function and event lists
/// plus the optional constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Abi {
    pub functions: Vec<Function>,
    pub events: Vec<Event>,
    pub constructor_inputs: Vec<Param>,
}

impl Abi {
    /// Parse a Solidity ABI JSON array.
    pub fn from_json(json: &str) -> Result<Self, TypesError> {
        let entries: Vec<RawEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Parse from an already deserialized JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, TypesError> {
        let entries: Vec<RawEntry> = serde_json::from_value(value)?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<RawEntry>) -> Result<Self, TypesError> {
        let mut abi = Abi::default();
        for entry in entries {
            match entry.kind.as_str() {
                "function" => {
                    // read the mutability before the fields move out
                    let state_mutability = entry.mutability();
                    let name = entry.name.ok_or_else(|| {
                        TypesError::InvalidAbiJson("function without a name".to_string())
                    })?;
                    abi.functions.push(Function {
                        name,
                        inputs: convert_params(entry.inputs)?,
                        outputs: convert_params(entry.outputs)?,
                        state_mutability,
                    });
                }
                "event" => {
                    let name = entry.name.ok_or_else(|| {
                        TypesError::InvalidAbiJson("event without a name".to_string())
                    })?;
                    abi.events.push(Event {
                        name,
                        inputs: convert_params(entry.inputs)?,
                    });
                }
                "constructor" => {
                    abi.constructor_inputs = convert_params(entry.inputs)?;
                }
                // fallback/receive/error declarations have no calldata shape here
                _ => {}
            }
        }
        Ok(abi)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }
}

/// One entry of a Solidity ABI JSON array.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<StateMutability>,
    /// Pre-0.5 ABI flag, consulted when stateMutability is absent
    constant: Option<bool>,
}

impl RawEntry {
    fn mutability(&self) -> StateMutability {
        match (self.state_mutability, self.constant) {
            (Some(m), _) => m,
            (None, Some(true)) => StateMutability::View,
            _ => StateMutability::NonPayable,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<RawParam>,
}

fn convert_params(raw: Vec<RawParam>) -> Result<Vec<Param>, TypesError> {
    raw.into_iter().map(convert_param).collect()
}

fn convert_param(raw: RawParam) -> Result<Param, TypesError> {
    let components = convert_params(raw.components)?;
    Ok(Param {
        name: raw.name,
        kind: ParamType::parse(&raw.kind, components)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "type": "constructor",
            "inputs": [{"name": "supply", "type": "uint256"}]
        },
        {
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}]
        },
        {
            "type": "function",
            "name": "balanceOf",
            "stateMutability": "view",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}]
        },
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address"},
                {"name": "to", "type": "address"},
                {"name": "value", "type": "uint256"}
            ]
        }
    ]"#;

    #[test]
    fn test_parse_abi_json() {
        let abi = Abi::from_json(SAMPLE).unwrap();
        assert_eq!(abi.functions.len(), 2);
        assert_eq!(abi.events.len(), 1);
        assert_eq!(abi.constructor_inputs.len(), 1);

        let transfer = abi.function("transfer").unwrap();
        assert_eq!(transfer.inputs.len(), 2);
        assert!(!transfer.state_mutability.is_readonly());

        let balance_of = abi.function("balanceOf").unwrap();
        assert!(balance_of.state_mutability.is_readonly());
    }

    #[test]
    fn test_function_selector() {
        let abi = Abi::from_json(SAMPLE).unwrap();
        let transfer = abi.function("transfer").unwrap();
        assert_eq!(transfer.signature(), "transfer(address,uint256)");
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_event_topic() {
        let abi = Abi::from_json(SAMPLE).unwrap();
        let transfer = abi.event("Transfer").unwrap();
        assert_eq!(transfer.signature(), "Transfer(address,address,uint256)");
        // canonical ERC-20 Transfer topic
        assert_eq!(
            transfer.topic().to_hex(),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_tuple_components() {
        let json = r#"[{
            "type": "function",
            "name": "submit",
            "stateMutability": "nonpayable",
            "inputs": [{
                "name": "order",
                "type": "tuple",
                "components": [
                    {"name": "id", "type": "uint64"},
                    {"name": "price", "type": "uint256"}
                ]
            }],
            "outputs": []
        }]"#;
        let abi = Abi::from_json(json).unwrap();
        let submit = abi.function("submit").unwrap();
        assert_eq!(submit.signature(), "submit((uint64,uint256))");
    }

    #[test]
    fn test_legacy_constant_flag() {
        let json = r#"[{
            "type": "function",
            "name": "totalSupply",
            "constant": true,
            "inputs": [],
            "outputs": [{"name": "", "type": "uint256"}]
        }]"#;
        let abi = Abi::from_json(json).unwrap();
        assert!(abi.function("totalSupply").unwrap().state_mutability.is_readonly());
    }
}
