//! Dynamic contract handles
//!
//! ABIs are fetched at runtime, so calls are encoded with alloy's dynamic ABI
//! support instead of `sol!` bindings.

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    primitives::{Address, Bytes, B256, U256},
};
use std::sync::Arc;

use crate::error::{BridgeError, Result};
use crate::types::ChainRole;

/// Contract address, ABI and the chain it lives on
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub address: Address,
    pub abi: Arc<JsonAbi>,
    pub role: ChainRole,
    /// Logical contract name, kept for error messages
    pub name: String,
}

impl ContractHandle {
    pub fn new(address: Address, abi: Arc<JsonAbi>, role: ChainRole, name: &str) -> Self {
        Self {
            address,
            abi,
            role,
            name: name.to_string(),
        }
    }

    /// Bind `name(args...)` to this contract.
    ///
    /// Overloads are resolved by argument count; arguments are encoded here so
    /// a bad call fails before any network round trip.
    pub fn method(&self, name: &str, args: Vec<DynSolValue>) -> Result<ContractMethod> {
        let function = self
            .abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
            .ok_or_else(|| BridgeError::MethodNotFound {
                contract: self.name.clone(),
                method: name.to_string(),
            })?
            .clone();

        let data = function
            .abi_encode_input(&args)
            .map_err(|e| BridgeError::AbiEncode(format!("{}: {}", name, e)))?;

        Ok(ContractMethod {
            address: self.address,
            function,
            data: Bytes::from(data),
        })
    }
}

/// An encoded call of one contract function
#[derive(Debug, Clone)]
pub struct ContractMethod {
    address: Address,
    function: Function,
    data: Bytes,
}

impl ContractMethod {
    /// Target contract
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Selector followed by the encoded arguments
    pub fn encode_abi(&self) -> Bytes {
        self.data.clone()
    }

    /// Decode raw `eth_call` output
    pub fn decode_output(&self, output: &[u8]) -> Result<Vec<DynSolValue>> {
        self.function
            .abi_decode_output(output, true)
            .map_err(|e| BridgeError::AbiDecode(format!("{}: {}", self.function.name, e)))
    }
}

// ============================================================================
// Output Decoding
// ============================================================================

/// Conversion from decoded call outputs
pub trait FromCallOutput: Sized {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self>;
}

fn single(values: Vec<DynSolValue>, expected: &str) -> Result<DynSolValue> {
    values
        .into_iter()
        .next()
        .ok_or_else(|| BridgeError::AbiDecode(format!("expected {} output, got none", expected)))
}

fn mismatch(expected: &str, got: &DynSolValue) -> BridgeError {
    BridgeError::AbiDecode(format!("expected {} output, got {:?}", expected, got))
}

impl FromCallOutput for Vec<DynSolValue> {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self> {
        Ok(values)
    }
}

impl FromCallOutput for bool {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self> {
        let value = single(values, "bool")?;
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromCallOutput for Address {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self> {
        let value = single(values, "address")?;
        value.as_address().ok_or_else(|| mismatch("address", &value))
    }
}

impl FromCallOutput for U256 {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self> {
        let value = single(values, "uint")?;
        value
            .as_uint()
            .map(|(v, _)| v)
            .ok_or_else(|| mismatch("uint", &value))
    }
}

impl FromCallOutput for B256 {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self> {
        let value = single(values, "bytes32")?;
        match value.as_fixed_bytes() {
            Some((bytes, 32)) => Ok(B256::from_slice(bytes)),
            _ => Err(mismatch("bytes32", &value)),
        }
    }
}

impl FromCallOutput for String {
    fn from_output(values: Vec<DynSolValue>) -> Result<Self> {
        let value = single(values, "string")?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", &value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::function_selector;
    use crate::testing::abis::child_erc721_abi;
    use alloy::primitives::address;
    use alloy::sol_types::SolValue;

    fn handle() -> ContractHandle {
        ContractHandle::new(
            address!("00000000000000000000000000000000000000a1"),
            Arc::new(child_erc721_abi()),
            ChainRole::Parent,
            "ChildERC721",
        )
    }

    #[test]
    fn test_method_encodes_selector_and_args() {
        let predicate = address!("00000000000000000000000000000000000000b2");
        let method = handle()
            .method(
                "approve",
                vec![
                    DynSolValue::Address(predicate),
                    DynSolValue::Uint(U256::from(7), 256),
                ],
            )
            .unwrap();

        let data = method.encode_abi();
        assert_eq!(&data[..4], &function_selector("approve(address,uint256)"));
        assert_eq!(&data[4..], &(predicate, U256::from(7)).abi_encode_params()[..]);
        assert_eq!(method.name(), "approve");
    }

    #[test]
    fn test_unknown_method() {
        let err = handle().method("mint", vec![]).unwrap_err();
        assert!(matches!(err, BridgeError::MethodNotFound { .. }));
    }

    #[test]
    fn test_arity_mismatch_is_not_found() {
        let err = handle()
            .method("approve", vec![DynSolValue::Bool(true)])
            .unwrap_err();
        assert!(matches!(err, BridgeError::MethodNotFound { .. }));
    }

    #[test]
    fn test_bad_argument_type() {
        let err = handle()
            .method(
                "approve",
                vec![DynSolValue::Bool(true), DynSolValue::Bool(false)],
            )
            .unwrap_err();
        assert!(matches!(err, BridgeError::AbiEncode(_)));
    }

    #[test]
    fn test_decode_outputs() {
        let h = handle();
        let owner = address!("00000000000000000000000000000000000000c3");

        let method = h
            .method("getApproved", vec![DynSolValue::Uint(U256::from(1), 256)])
            .unwrap();
        let values = method.decode_output(&owner.abi_encode()).unwrap();
        assert_eq!(Address::from_output(values).unwrap(), owner);

        let method = h
            .method("balanceOf", vec![DynSolValue::Address(owner)])
            .unwrap();
        let values = method.decode_output(&U256::from(3).abi_encode()).unwrap();
        assert_eq!(U256::from_output(values.clone()).unwrap(), U256::from(3));
        assert!(bool::from_output(values).is_err());
    }
}
