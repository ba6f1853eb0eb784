//! Process-wide selector → function signature registry.
//!
//! The map is append-only and copy-on-extend: readers grab an `Arc` snapshot
//! under a short read lock, writers clone the current map, insert, and swap
//! the `Arc` in. A reader therefore sees either the map before an extension
//! or the map after it, never a half-written one.

use crate::abi::json::{AbiDocument, AbiItem};
use crate::abi::AbiType;
use crate::errors::{bounded, AbiError};
use crate::solc::{self, SolcConfig};
use crate::utils::helpers::{selector_hex, selector_of};
use crate::utils::signatures::load_seed_signatures;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

pub type Selector = [u8; 4];

/// One named, typed parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    /// Canonical type string, e.g. `uint256` or `address[]`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    #[serde(serialize_with = "serialize_selector")]
    pub selector: Selector,
    pub name: String,
    pub inputs: Vec<Param>,
}

fn serialize_selector<S: serde::Serializer>(sel: &Selector, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&selector_hex(sel))
}

impl FunctionSignature {
    /// Build a signature; the selector is derived from the canonical form.
    pub fn new(name: &str, inputs: Vec<Param>) -> Self {
        let mut sig = Self {
            selector: [0; 4],
            name: name.to_string(),
            inputs,
        };
        sig.selector = selector_of(&sig.canonical());
        sig
    }

    /// `name(type1,type2,...)`
    pub fn canonical(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.kind.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    pub fn types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| AbiType::parse(&p.kind)).collect()
    }

    /// Parameter names, with `param<i>` standing in for unnamed ones.
    pub fn param_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.name.is_empty() {
                    format!("param{i}")
                } else {
                    p.name.clone()
                }
            })
            .collect()
    }

    fn from_abi_item(item: &AbiItem) -> Self {
        let inputs = item
            .inputs
            .iter()
            .map(|p| Param {
                name: p.name.clone(),
                kind: p.canonical_type(),
            })
            .collect();
        Self::new(&item.name, inputs)
    }
}

type SignatureMap = HashMap<Selector, FunctionSignature>;

#[derive(Debug, Default)]
pub struct SignatureRegistry {
    current: RwLock<Arc<SignatureMap>>,
}

static GLOBAL: LazyLock<SignatureRegistry> = LazyLock::new(SignatureRegistry::seeded);

impl SignatureRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the bundled ERC20/ERC721/DEX/multisig signatures.
    pub fn seeded() -> Self {
        let registry = Self::empty();
        registry.extend(load_seed_signatures());
        registry
    }

    /// The shared registry used by the free-standing decode helpers.
    pub fn global() -> &'static SignatureRegistry {
        &GLOBAL
    }

    /// Consistent view of the map at this instant.
    pub fn snapshot(&self) -> Arc<SignatureMap> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn lookup(&self, selector: &Selector) -> Option<FunctionSignature> {
        self.snapshot().get(selector).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add signatures, replacing any entry with the same selector.
    /// Returns how many were added or replaced.
    pub fn extend<I>(&self, signatures: I) -> usize
    where
        I: IntoIterator<Item = FunctionSignature>,
    {
        let incoming: Vec<FunctionSignature> = signatures.into_iter().collect();
        if incoming.is_empty() {
            return 0;
        }
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next: SignatureMap = (**guard).clone();
        let count = incoming.len();
        for sig in incoming {
            log::debug!("registering {} as {}", selector_hex(&sig.selector), sig.canonical());
            next.insert(sig.selector, sig);
        }
        *guard = Arc::new(next);
        count
    }

    /// Register every function item of an ABI JSON document.
    pub fn register_abi_json(&self, json: &str) -> Result<usize, AbiError> {
        let doc: AbiDocument = serde_json::from_str(json)?;
        Ok(self.register_items(&doc.into_items()))
    }

    /// Register from either ABI JSON or Solidity source.
    ///
    /// Solidity is compiled with `solc` as configured in `config`.
    pub fn register_source(&self, source: &str, config: &SolcConfig) -> Result<usize, AbiError> {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(source) {
            let doc: AbiDocument = serde_json::from_value(value)?;
            return Ok(self.register_items(&doc.into_items()));
        }
        if solc::looks_like_solidity(source) {
            let items = solc::compile_abi(source, config)?;
            return Ok(self.register_items(&items));
        }
        Err(AbiError::UnrecognizedSource(bounded(source.trim())))
    }

    fn register_items(&self, items: &[AbiItem]) -> usize {
        let added = self.extend(
            items
                .iter()
                .filter(|item| item.is_function() && !item.name.is_empty())
                .map(FunctionSignature::from_abi_item),
        );
        log::info!("registered {added} function signatures from ABI");
        added
    }
}
