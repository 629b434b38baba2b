//! Function selector computation.
//!
//! The selector of a function is the first four bytes of the keccak256 hash
//! of its canonical signature, e.g.:
//!   keccak256("transfer(address,uint256)")[:4] → 0xa9059cbb

use tiny_keccak::{Hasher, Keccak};

use crate::hexutil::encode_hex;

/// keccak256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// 4-byte selector of a canonical signature such as `"transfer(address,uint256)"`.
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `"0x"` + 8 lowercase hex chars.
pub fn selector_hex(selector: [u8; 4]) -> String {
    encode_hex(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_selector() {
        assert_eq!(selector_hex(selector_of("transfer(address,uint256)")), "0xa9059cbb");
    }

    #[test]
    fn router_and_relay_selectors() {
        assert_eq!(selector_hex(selector_of("execute(bytes,bytes[],uint256)")), "0x3593564c");
        assert_eq!(selector_hex(selector_of("execute(bytes,bytes[])")), "0x24856bc3");
        assert_eq!(selector_hex(selector_of("sendToL1(bytes)")), "0x62f84b24");
        assert_eq!(selector_hex(selector_of("multiSend(bytes)")), "0x8d80ff0a");
    }

    #[test]
    fn safe_exec_selector() {
        let sig = "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";
        assert_eq!(selector_hex(selector_of(sig)), "0x6a761202");
        assert_eq!(selector_of(sig), crate::hexutil::parse_selector("6a761202").unwrap());
    }

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
