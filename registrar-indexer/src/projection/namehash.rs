//! Domain hashing under the registrar's root node

use sha3::{Digest, Keccak256};
use shared::codec::{H256, concat};

/// Namehash of `eth`, the node every auctioned label is registered under
pub const ROOT_NODE: H256 = H256::new([
    0x93, 0xcd, 0xeb, 0x70, 0x8b, 0x75, 0x45, 0xdc, 0x66, 0x8e, 0xb9, 0x28, 0x01, 0x76, 0x16, 0x9d,
    0x1c, 0x33, 0xcf, 0xd8, 0xed, 0x6f, 0x04, 0x69, 0x0a, 0x0b, 0xcc, 0x88, 0xa9, 0x3f, 0xc4, 0xae,
]);

/// Keccak-256 (the pre-standard variant used by the EVM, not SHA3-256)
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::new(hasher.finalize().into())
}

/// `keccak256(ROOT_NODE ‖ label)`
pub fn domain_hash(label: &H256) -> H256 {
    keccak256(&concat(ROOT_NODE.as_bytes(), label.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node_is_namehash_of_eth() {
        let label = keccak256(b"eth");
        assert_eq!(
            label.to_hex(),
            "0x4f5b812789fc606be1b3b16908db13fc7a9adf7ca72641f84d75b47069d3d7f0"
        );
        assert_eq!(keccak256(&concat(&[0u8; 32], label.as_bytes())), ROOT_NODE);
    }

    #[test]
    fn test_domain_hash_known_vector() {
        let label = keccak256(b"foo");
        assert_eq!(
            label.to_hex(),
            "0x41b1a0649752af1b28b3dc29a1556eee781e4a4c3a1f7f53f90fa834de098c4d"
        );
        assert_eq!(
            domain_hash(&label).to_hex(),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_domain_hash_is_deterministic() {
        let label = H256::new([0x42; 32]);
        assert_eq!(domain_hash(&label), domain_hash(&label));
        assert_ne!(domain_hash(&label), domain_hash(&H256::new([0x43; 32])));
    }
}
