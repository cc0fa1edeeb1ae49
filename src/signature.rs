//! Signature verification primitive
//!
//! Validation only ever *verifies* signatures; producing them is the job of
//! whoever owns the keys. The default verifier checks secp256k1 ECDSA
//! signatures over SHA-256 of the signed payload.

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, VerifyOnly};
use sha2::{Digest, Sha256};

/// Verify(owner, message, signature) → {true, false}
pub trait SignatureVerifier {
    fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&[u8], &[u8], &[u8]) -> bool,
{
    fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
        self(owner, message, signature)
    }
}

/// The 32-byte digest a signer must sign for `message`.
pub fn message_digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// ECDSA over secp256k1. Owners are serialized public keys (compressed or
/// uncompressed); signatures are DER or 64-byte compact.
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Secp256k1Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secp256k1Verifier")
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
        // Parse public key
        let pubkey = match PublicKey::from_slice(owner) {
            Ok(pk) => pk,
            Err(_) => return false,
        };

        let signature = match parse_signature(signature) {
            Some(sig) => sig,
            None => return false,
        };

        let message = match Message::from_digest_slice(&message_digest(message)) {
            Ok(m) => m,
            Err(_) => return false,
        };

        self.secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
    }
}

/// DER when the bytes carry a well-formed SEQUENCE header, otherwise
/// 64-byte compact `r || s`.
fn parse_signature(bytes: &[u8]) -> Option<Signature> {
    let is_der = bytes.len() >= 2 && bytes[0] == 0x30 && bytes[1] as usize + 2 == bytes.len();
    if is_der {
        Signature::from_der(bytes).ok()
    } else if bytes.len() == 64 {
        Signature::from_compact(bytes).ok()
    } else {
        None
    }
}
