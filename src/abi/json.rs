//! ABI JSON documents (`[{"type": "function", "name": ..., "inputs": [...]}, ...]`).

use serde::Deserialize;

/// One ABI item. Only `type == "function"` items are of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiItem {
    #[serde(rename = "type", default = "default_item_kind")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

/// Solidity ABI items default to `function` when `type` is omitted.
fn default_item_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type as used in signatures; tuples expand to `(t1,t2)`.
    pub fn canonical_type(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) => {
                let inner: Vec<String> = self.components.iter().map(|c| c.canonical_type()).collect();
                format!("({}){suffix}", inner.join(","))
            }
            None => self.kind.clone(),
        }
    }
}

impl AbiItem {
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    /// `name(type1,type2,...)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(AbiParam::canonical_type).collect();
        format!("{}({})", self.name, types.join(","))
    }
}

/// Accepted document shapes: a bare item array, or a build artifact carrying one under `abi`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AbiDocument {
    Items(Vec<AbiItem>),
    Artifact { abi: Vec<AbiItem> },
}

impl AbiDocument {
    pub fn into_items(self) -> Vec<AbiItem> {
        match self {
            AbiDocument::Items(items) | AbiDocument::Artifact { abi: items } => items,
        }
    }
}
