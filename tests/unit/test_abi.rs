//! ABI parameter decoding checked against a reference encoder.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256 as AlloyU256};
use ostia::abi::json::AbiDocument;
use ostia::abi::{decode_parameters, AbiType, AbiValue};
use primitive_types::U256;

fn encode(values: Vec<DynSolValue>) -> Vec<u8> {
    DynSolValue::Tuple(values).abi_encode_params()
}

fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

fn ours(a: &Address) -> AbiValue {
    AbiValue::Address(a.to_checksum(None))
}

fn uint(v: u64) -> DynSolValue {
    DynSolValue::Uint(AlloyU256::from(v), 256)
}

fn types(list: &[&str]) -> Vec<AbiType> {
    list.iter().map(|t| AbiType::parse(t)).collect()
}

#[test]
fn test_static_round_trip() {
    let a = addr(0xab);
    let data = encode(vec![
        DynSolValue::Address(a),
        uint(1_000_000_000_000_000_000),
        DynSolValue::Bool(true),
        DynSolValue::Bool(false),
    ]);
    let out = decode_parameters(&data, &types(&["address", "uint256", "bool", "bool"]));
    assert_eq!(
        out,
        vec![
            Some(ours(&a)),
            Some(AbiValue::Uint(U256::exp10(18))),
            Some(AbiValue::Bool(true)),
            Some(AbiValue::Bool(false)),
        ]
    );
}

#[test]
fn test_max_uint_round_trip() {
    let data = encode(vec![DynSolValue::Uint(AlloyU256::MAX, 256)]);
    let out = decode_parameters(&data, &types(&["uint256"]));
    assert_eq!(out, vec![Some(AbiValue::Uint(U256::MAX))]);
}

#[test]
fn test_bytes_round_trip() {
    for payload in [vec![], vec![0x01], (0..=70u8).collect::<Vec<_>>()] {
        let data = encode(vec![DynSolValue::Bytes(payload.clone()), uint(9)]);
        let out = decode_parameters(&data, &types(&["bytes", "uint256"]));
        assert_eq!(out[0], Some(AbiValue::Bytes(payload)));
        assert_eq!(out[1], Some(AbiValue::Uint(U256::from(9u64))));
    }
}

#[test]
fn test_address_array_round_trip() {
    for len in [0usize, 1, 3] {
        let addrs: Vec<Address> = (0..len).map(|i| addr(i as u8 + 1)).collect();
        let data = encode(vec![DynSolValue::Array(
            addrs.iter().copied().map(DynSolValue::Address).collect(),
        )]);
        let out = decode_parameters(&data, &types(&["address[]"]));
        let expected = AbiValue::Array(addrs.iter().map(|a| Some(ours(a))).collect());
        assert_eq!(out, vec![Some(expected)], "len {len}");
    }
}

#[test]
fn test_uint_array_round_trip() {
    for values in [vec![], vec![7u64], vec![1, 2, u64::MAX]] {
        let data = encode(vec![
            uint(5),
            DynSolValue::Array(values.iter().map(|&v| uint(v)).collect()),
        ]);
        let out = decode_parameters(&data, &types(&["uint8", "uint256[]"]));
        assert_eq!(out[0], Some(AbiValue::Uint(U256::from(5u64))));
        let expected = AbiValue::Array(values.iter().map(|&v| Some(AbiValue::Uint(U256::from(v)))).collect());
        assert_eq!(out[1], Some(expected));
    }
}

#[test]
fn test_mixed_dynamic_round_trip() {
    let a = addr(0x11);
    let data = encode(vec![
        DynSolValue::String("hello".into()),
        DynSolValue::Address(a),
        DynSolValue::Bytes(vec![0xde, 0xad]),
        DynSolValue::Array(vec![DynSolValue::Bytes(vec![1]), DynSolValue::Bytes(vec![2, 3])]),
    ]);
    let out = decode_parameters(&data, &types(&["string", "address", "bytes", "bytes[]"]));
    assert_eq!(out[0], Some(AbiValue::String("hello".into())));
    assert_eq!(out[1], Some(ours(&a)));
    assert_eq!(out[2], Some(AbiValue::Bytes(vec![0xde, 0xad])));
    assert_eq!(
        out[3],
        Some(AbiValue::Array(vec![
            Some(AbiValue::Bytes(vec![1])),
            Some(AbiValue::Bytes(vec![2, 3])),
        ]))
    );
}

#[test]
fn test_truncated_blob_degrades_per_slot() {
    let data = encode(vec![DynSolValue::Address(addr(1)), uint(2), DynSolValue::Bytes(vec![1, 2, 3])]);
    // cut into the bytes payload
    let cut = &data[..data.len() - 40];
    let out = decode_parameters(cut, &types(&["address", "uint256", "bytes"]));
    assert!(out[0].is_some());
    assert!(out[1].is_some());
    assert_eq!(out[2], None);
}

#[test]
fn test_parameters_after_static_tuple_and_fixed_array() {
    let data = encode(vec![
        DynSolValue::Tuple(vec![DynSolValue::Address(addr(0x11)), uint(2)]),
        DynSolValue::FixedArray(vec![uint(3), uint(4), uint(5)]),
        DynSolValue::Bytes(vec![0xca, 0xfe]),
        uint(7),
    ]);
    let out = decode_parameters(&data, &types(&["(address,uint256)", "uint256[3]", "bytes", "uint256"]));
    assert_eq!(out.len(), 4);
    assert_eq!(out[0].as_ref().and_then(|v| match v {
        AbiValue::Raw(raw) => Some(raw.len()),
        _ => None,
    }), Some(64));
    assert_eq!(out[1].as_ref().and_then(|v| match v {
        AbiValue::Raw(raw) => Some(raw.len()),
        _ => None,
    }), Some(96));
    assert_eq!(out[2], Some(AbiValue::Bytes(vec![0xca, 0xfe])));
    assert_eq!(out[3], Some(AbiValue::Uint(U256::from(7u64))));
}

#[test]
fn test_uint256_display_json() {
    let v = AbiValue::Uint(U256::exp10(18));
    assert_eq!(
        v.to_display_json(&AbiType::Uint(256)),
        serde_json::json!({"raw": "1000000000000000000", "formatted": "1"})
    );
    // narrower widths are plain decimal strings
    assert_eq!(v.to_display_json(&AbiType::Uint(128)), serde_json::json!("1000000000000000000"));
}

#[test]
fn test_abi_document_shapes() {
    let bare: AbiDocument = serde_json::from_str(r#"[{"name": "f", "inputs": []}]"#).unwrap();
    let items = bare.into_items();
    assert!(items[0].is_function());
    assert_eq!(items[0].signature(), "f()");
}
