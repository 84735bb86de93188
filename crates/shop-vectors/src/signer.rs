//! `sign(bytes) -> Signature` collaborator (spec §4.4).
//!
//! The spec is explicit that curve arithmetic and key custody are out of
//! scope for the core (spec §1 Non-goals, §4.4: "verifying a signature... is
//! the collaborator contract — the core does not implement curve
//! arithmetic"). This wraps `k256`'s secp256k1 ECDSA over a Keccak-256
//! prehash, the same curve/hash pairing `shop-core` already uses for content
//! addressing, so vectors carry a signature that is at least internally
//! consistent with the address it claims to be from.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature as RecoverableSig, SigningKey};
use tiny_keccak::{Hasher as _, Keccak};

use shop_types::{EthereumAddress, Signature};

/// A signer backed by one secp256k1 keypair.
pub struct Signer {
    secret: SigningKey,
    address: EthereumAddress,
}

impl Signer {
    /// Derives a signer from a 32-byte secret scalar.
    pub fn from_secret_bytes(secret: [u8; 32]) -> Self {
        let secret = SigningKey::from_bytes((&secret).into()).expect("secret is a valid nonzero scalar");
        let address = address_from_signing_key(&secret);
        Self { secret, address }
    }

    /// This signer's on-chain address, derived from its public key the way
    /// an Ethereum account address is (spec glossary: `EthereumAddress`).
    pub fn address(&self) -> EthereumAddress {
        self.address
    }

    /// The raw 32-byte secret, for vectors that record it alongside the
    /// address (spec §6.2 `VectorsOkay.signer`).
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes().into()
    }

    /// Signs `message`'s Keccak-256 digest, returning a 64-byte `r ‖ s`
    /// signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let digest = keccak256(message);
        let sig: RecoverableSig = self
            .secret
            .sign_prehash(&digest)
            .expect("signing a 32-byte prehash cannot fail");
        Signature(sig.to_bytes().into())
    }
}

fn address_from_signing_key(secret: &SigningKey) -> EthereumAddress {
    let verifying_key = secret.verifying_key();
    let encoded = verifying_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    EthereumAddress::from_slice(&hash[12..])
}

fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_is_deterministic_for_a_fixed_secret() {
        let signer = Signer::from_secret_bytes([7u8; 32]);
        let sig_a = signer.sign(b"hello");
        let sig_b = signer.sign(b"hello");
        assert_eq!(sig_a.as_bytes(), sig_b.as_bytes());
    }

    #[test]
    fn different_messages_yield_different_signatures() {
        let signer = Signer::from_secret_bytes([9u8; 32]);
        assert_ne!(signer.sign(b"hello").as_bytes(), signer.sign(b"goodbye").as_bytes());
    }

    #[test]
    fn address_is_stable_for_a_fixed_secret() {
        let a = Signer::from_secret_bytes([3u8; 32]);
        let b = Signer::from_secret_bytes([3u8; 32]);
        assert_eq!(a.address(), b.address());
    }
}
