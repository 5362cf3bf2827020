//! Keccak helpers for selectors and event topics

use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// 4-byte function selector for a canonical signature, e.g. `approve(address,uint256)`
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Convert bytes32 to hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Convert bytes4 to hex string with 0x prefix
pub fn bytes4_to_hex(bytes: &[u8; 4]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            bytes32_to_hex(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_function_selector() {
        assert_eq!(
            bytes4_to_hex(&function_selector("transfer(address,uint256)")),
            "0xa9059cbb"
        );
        assert_eq!(
            bytes4_to_hex(&function_selector("approve(address,uint256)")),
            "0x095ea7b3"
        );
    }
}
