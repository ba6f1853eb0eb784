//! Call-data decoding: selector lookup, parameter decoding, and transaction
//! classification.

use crate::abi::{decode_parameters, AbiType, AbiValue};
use crate::errors::LoaderError;
use crate::registry::{Selector, SignatureRegistry};
use crate::utils::helpers::{decode_hex, format_token_amount, selector_hex};
use serde_json::{json, Map, Value};

/// `execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)`.
pub const MULTISIG_EXECUTE: Selector = [0x6a, 0x76, 0x12, 0x02];
/// Position of the inner call's `data` argument in [`MULTISIG_EXECUTE`].
const MULTISIG_DATA_INDEX: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParameter {
    pub name: String,
    pub ty: AbiType,
    /// `None` when the slot was truncated or malformed.
    pub value: Option<AbiValue>,
}

impl DecodedParameter {
    /// 18-decimal display form of a `uint256` value.
    pub fn formatted(&self) -> Option<String> {
        match (&self.ty, &self.value) {
            (AbiType::Uint(256), Some(AbiValue::Uint(v))) => Some(format_token_amount(*v)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        self.value
            .as_ref()
            .map_or(Value::Null, |v| v.to_display_json(&self.ty))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedCall {
    Known {
        selector: Selector,
        function: String,
        signature: String,
        params: Vec<DecodedParameter>,
        nested: Option<Box<DecodedCall>>,
    },
    /// Selector not in the registry. Not an error.
    Unknown {
        selector: Selector,
        raw_parameters: Vec<u8>,
    },
}

impl DecodedCall {
    pub fn selector(&self) -> Selector {
        match self {
            DecodedCall::Known { selector, .. } | DecodedCall::Unknown { selector, .. } => *selector,
        }
    }

    pub fn function(&self) -> Option<&str> {
        match self {
            DecodedCall::Known { function, .. } => Some(function),
            DecodedCall::Unknown { .. } => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&DecodedParameter> {
        match self {
            DecodedCall::Known { params, .. } => params.iter().find(|p| p.name == name),
            DecodedCall::Unknown { .. } => None,
        }
    }

    pub fn nested(&self) -> Option<&DecodedCall> {
        match self {
            DecodedCall::Known { nested, .. } => nested.as_deref(),
            DecodedCall::Unknown { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DecodedCall::Known {
                selector,
                function,
                signature,
                params,
                nested,
            } => {
                let params: Map<String, Value> =
                    params.iter().map(|p| (p.name.clone(), p.to_json())).collect();
                let mut out = json!({
                    "function_selector": selector_hex(selector),
                    "function": function,
                    "signature": signature,
                    "params": params,
                });
                if let Some(inner) = nested {
                    out["nested_call"] = inner.to_json();
                }
                out
            }
            DecodedCall::Unknown {
                selector,
                raw_parameters,
            } => json!({
                "function_selector": selector_hex(selector),
                "raw_parameters": hex::encode(raw_parameters),
            }),
        }
    }
}

/// Decodes call data against a signature registry.
#[derive(Debug, Clone, Copy)]
pub struct CallDecoder<'r> {
    registry: &'r SignatureRegistry,
}

impl<'r> CallDecoder<'r> {
    pub fn new(registry: &'r SignatureRegistry) -> Self {
        Self { registry }
    }

    /// Decode hex call data (`0x` optional).
    pub fn decode(&self, input: &str) -> Result<DecodedCall, LoaderError> {
        self.decode_bytes(&decode_hex(input)?)
    }

    pub fn decode_bytes(&self, data: &[u8]) -> Result<DecodedCall, LoaderError> {
        self.decode_level(data, true)
    }

    fn decode_level(&self, data: &[u8], follow_nested: bool) -> Result<DecodedCall, LoaderError> {
        if data.len() < 4 {
            return Err(LoaderError::TooShort(data.len()));
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        let body = &data[4..];

        let Some(sig) = self.registry.lookup(&selector) else {
            log::debug!("unknown selector {}", selector_hex(&selector));
            return Ok(DecodedCall::Unknown {
                selector,
                raw_parameters: body.to_vec(),
            });
        };

        let types = sig.types();
        let values = decode_parameters(body, &types);
        let params: Vec<DecodedParameter> = sig
            .param_names()
            .into_iter()
            .zip(types)
            .zip(values)
            .map(|((name, ty), value)| DecodedParameter { name, ty, value })
            .collect();

        let nested = if follow_nested && selector == MULTISIG_EXECUTE {
            self.decode_inner(&params)
        } else {
            None
        };

        Ok(DecodedCall::Known {
            selector,
            function: sig.name.clone(),
            signature: sig.canonical(),
            params,
            nested,
        })
    }

    /// Decode the inner call carried by a multisig execute, one level only.
    fn decode_inner(&self, params: &[DecodedParameter]) -> Option<Box<DecodedCall>> {
        let inner = params
            .get(MULTISIG_DATA_INDEX)?
            .value
            .as_ref()?
            .as_bytes()
            .filter(|b| !b.is_empty())?;
        match self.decode_level(inner, false) {
            Ok(call) => Some(Box::new(call)),
            Err(e) => {
                log::debug!("nested call not decoded: {e}");
                None
            }
        }
    }
}

/// Decode `input` against the global registry.
pub fn decode_call(input: &str) -> Result<DecodedCall, LoaderError> {
    CallDecoder::new(SignatureRegistry::global()).decode(input)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    /// Plain value transfer, no input.
    Transfer,
    /// No recipient; input is init code.
    ContractCreation { bytecode: String },
    ContractInteraction(DecodedCall),
}

impl TransactionKind {
    pub fn to_json(&self) -> Value {
        match self {
            TransactionKind::Transfer => json!({
                "type": "transfer",
                "description": "Simple ETH transfer with no additional data",
            }),
            TransactionKind::ContractCreation { bytecode } => json!({
                "type": "contract_creation",
                "description": "Contract creation transaction",
                "bytecode": bytecode,
            }),
            TransactionKind::ContractInteraction(call) => json!({
                "type": "contract_interaction",
                "decoded": call.to_json(),
            }),
        }
    }
}

/// Classify a transaction by its input and recipient.
pub fn classify_transaction(
    decoder: &CallDecoder<'_>,
    input: &str,
    to: Option<&str>,
) -> Result<TransactionKind, LoaderError> {
    let trimmed = input.trim();
    if matches!(trimmed, "" | "0x" | "0x0") {
        return Ok(TransactionKind::Transfer);
    }
    if to.is_none() {
        let code = decode_hex(trimmed)?;
        return Ok(TransactionKind::ContractCreation {
            bytecode: format!("0x{}", hex::encode(code)),
        });
    }
    decoder.decode(trimmed).map(TransactionKind::ContractInteraction)
}
