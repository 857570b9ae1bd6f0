//! Contract artifacts and ABI handling
//!
//! Method names given on the command line are resolved against the ABI to a
//! typed [`Function`] before anything is sent to the node, and string
//! arguments are coerced into ABI values using the parameter types.

use crate::{Error, Result};
use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy::hex;
use alloy::json_abi::{Function, JsonAbi, Param};
use alloy::primitives::Bytes;
use serde_json::Value;
use std::path::Path;

/// Load a contract ABI.
///
/// Accepts a bare ABI array, or a compiler artifact object with an `abi` key.
pub fn load_abi(path: &Path) -> Result<JsonAbi> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    parse_abi(&content).map_err(|e| Error::Abi(format!("{}: {}", path.display(), e)))
}

fn parse_abi(content: &str) -> std::result::Result<JsonAbi, serde_json::Error> {
    let value: Value = serde_json::from_str(content)?;
    let abi = match value {
        Value::Object(mut artifact) if artifact.contains_key("abi") => artifact
            .remove("abi")
            .unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    serde_json::from_value(abi)
}

/// Load contract bytecode stored as hex text (with or without `0x`)
pub fn load_bytecode(path: &Path) -> Result<Bytes> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    parse_bytecode(&content)
}

fn parse_bytecode(content: &str) -> Result<Bytes> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(Error::Abi("bytecode file is empty".to_string()));
    }
    hex::decode(trimmed)
        .map(Bytes::from)
        .map_err(|e| Error::Abi(format!("Invalid bytecode hex: {}", e)))
}

/// Find the overload of `name` taking `arg_count` arguments
pub fn resolve_method<'a>(abi: &'a JsonAbi, name: &str, arg_count: usize) -> Result<&'a Function> {
    let overloads = abi.function(name).ok_or_else(|| Error::MethodNotFound {
        method: name.to_string(),
    })?;

    overloads
        .iter()
        .find(|f| f.inputs.len() == arg_count)
        .ok_or_else(|| {
            let expected: Vec<String> = overloads.iter().map(|f| f.signature()).collect();
            Error::InvalidArgument(format!(
                "{} takes {} but {} argument(s) were given",
                name,
                expected.join(" or "),
                arg_count
            ))
        })
}

/// Coerce command-line strings into values of the given parameter types
pub fn coerce_args(params: &[Param], args: &[String]) -> Result<Vec<DynSolValue>> {
    if params.len() != args.len() {
        return Err(Error::InvalidArgument(format!(
            "expected {} argument(s), got {}",
            params.len(),
            args.len()
        )));
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| Error::Abi(format!("unsupported type {}: {}", param.ty, e)))?;
            ty.coerce_str(arg).map_err(|e| {
                Error::InvalidArgument(format!("cannot use {:?} as {}: {}", arg, param.ty, e))
            })
        })
        .collect()
}

/// Calldata for invoking `function` with string arguments
pub fn encode_call(function: &Function, args: &[String]) -> Result<Bytes> {
    let values = coerce_args(&function.inputs, args)?;
    function
        .abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|e| Error::Abi(e.to_string()))
}

/// Deployment payload: bytecode followed by the encoded constructor arguments
pub fn encode_deploy(abi: &JsonAbi, bytecode: &Bytes, args: &[String]) -> Result<Bytes> {
    let mut data = bytecode.to_vec();
    match &abi.constructor {
        Some(constructor) => {
            let values = coerce_args(&constructor.inputs, args)?;
            let encoded = constructor
                .abi_encode_input(&values)
                .map_err(|e| Error::Abi(e.to_string()))?;
            data.extend_from_slice(&encoded);
        }
        None if !args.is_empty() => {
            return Err(Error::InvalidArgument(format!(
                "contract has no constructor but {} argument(s) were given",
                args.len()
            )));
        }
        None => {}
    }
    Ok(data.into())
}

/// Decode the return data of a call to `function`
pub fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<DynSolValue>> {
    function
        .abi_decode_output(data)
        .map_err(|e| Error::Abi(format!("cannot decode {} output: {}", function.name, e)))
}

/// Human-readable rendering of a decoded value
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Bytes(b) => hex::encode_prefixed(b),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        DynSolValue::Tuple(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("({})", inner.join(", "))
        }
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::primitives::{address, U256};
    use serde_json::json;

    pub(crate) fn hello_abi() -> JsonAbi {
        serde_json::from_value(json!([
            {
                "type": "constructor",
                "inputs": [{ "name": "_greeting", "type": "string", "internalType": "string" }],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "greet",
                "inputs": [],
                "outputs": [{ "name": "", "type": "string", "internalType": "string" }],
                "stateMutability": "view"
            },
            {
                "type": "function",
                "name": "setGreeting",
                "inputs": [{ "name": "_greeting", "type": "string", "internalType": "string" }],
                "outputs": [],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "add",
                "inputs": [
                    { "name": "a", "type": "uint256", "internalType": "uint256" },
                    { "name": "b", "type": "uint256", "internalType": "uint256" }
                ],
                "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
                "stateMutability": "pure"
            }
        ]))
        .unwrap()
    }

    #[test]
    fn parses_bare_abi_and_artifacts() {
        let bare = serde_json::to_string(&hello_abi()).unwrap();
        assert!(parse_abi(&bare).unwrap().function("greet").is_some());

        let artifact = format!(r#"{{"contractName": "Hello", "abi": {}}}"#, bare);
        assert!(parse_abi(&artifact).unwrap().function("add").is_some());
    }

    #[test]
    fn bytecode_accepts_optional_prefix_and_whitespace() {
        assert_eq!(
            parse_bytecode("6080604052\n").unwrap().to_vec(),
            vec![0x60, 0x80, 0x60, 0x40, 0x52]
        );
        assert_eq!(parse_bytecode("0x6080").unwrap().to_vec(), vec![0x60, 0x80]);
        assert!(parse_bytecode("  ").is_err());
        assert!(parse_bytecode("zz").is_err());
    }

    #[test]
    fn resolves_method_by_name_and_arity() {
        let abi = hello_abi();
        let add = resolve_method(&abi, "add", 2).unwrap();
        assert_eq!(add.signature(), "add(uint256,uint256)");
    }

    #[test]
    fn missing_method_fails_fast() {
        let abi = hello_abi();
        let err = resolve_method(&abi, "transfer", 2).unwrap_err();
        assert!(matches!(err, Error::MethodNotFound { method } if method == "transfer"));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let abi = hello_abi();
        let err = resolve_method(&abi, "add", 1).unwrap_err();
        assert!(err.to_string().contains("add(uint256,uint256)"));
    }

    #[test]
    fn encodes_call_with_selector() {
        let abi = hello_abi();
        let add = resolve_method(&abi, "add", 2).unwrap();
        let data = encode_call(add, &["1".to_string(), "2".to_string()]).unwrap();

        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], add.selector().as_slice());
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(2));
    }

    #[test]
    fn rejects_uncoercible_argument() {
        let abi = hello_abi();
        let add = resolve_method(&abi, "add", 2).unwrap();
        let err = encode_call(add, &["one".to_string(), "2".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn deploy_payload_appends_constructor_args() {
        let abi = hello_abi();
        let bytecode = Bytes::from(vec![0x60, 0x80]);
        let data = encode_deploy(&abi, &bytecode, &["hi".to_string()]).unwrap();

        assert_eq!(&data[..2], &[0x60, 0x80]);
        let expected = DynSolValue::Tuple(vec![DynSolValue::String("hi".to_string())])
            .abi_encode_params();
        assert_eq!(&data[2..], expected.as_slice());
    }

    #[test]
    fn deploy_without_constructor_rejects_args() {
        let abi: JsonAbi = serde_json::from_value(json!([])).unwrap();
        let bytecode = Bytes::from(vec![0x60, 0x80]);
        assert_eq!(encode_deploy(&abi, &bytecode, &[]).unwrap(), bytecode);
        assert!(encode_deploy(&abi, &bytecode, &["x".to_string()]).is_err());
    }

    #[test]
    fn decodes_and_formats_output() {
        let abi = hello_abi();
        let greet = resolve_method(&abi, "greet", 0).unwrap();
        let data = DynSolValue::Tuple(vec![DynSolValue::String("hello".to_string())])
            .abi_encode_params();

        let values = decode_output(greet, &data).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(format_value(&values[0]), "hello");
    }

    #[test]
    fn formats_nested_values() {
        let value = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(7), 256),
            DynSolValue::Bool(true),
            DynSolValue::Address(address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")),
            DynSolValue::Array(vec![DynSolValue::Bytes(vec![0xde, 0xad])]),
        ]);
        assert_eq!(
            format_value(&value),
            "(7, true, 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266, [0xdead])"
        );
    }
}
