// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// keys: the xsk/xpk/pk wire types (§3) and seed->root conversion (§4.1).
//
// Types:
//   Seed               — opaque 64-byte caller-supplied secret
//   ExtendedSecretKey  — xsk, 96 bytes: kL || kR || c
//   ExtendedPublicKey  — xpk, 64 bytes: pk || c
//   PublicKey          — pk, 32 bytes, compressed Ed25519 point
// Functions:
//   seed_to_root()     — §4.1: SHA-512(seed) + clamp + BLAKE2b chaincode

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::primitives;

/// Opaque 64-byte seed. Owned by the caller; zeroized on drop here only
/// because we take it by value into [`seed_to_root`]'s local scratch.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Seed(pub [u8; 64]);

/// A 96-byte BIP32-Ed25519 extended secret key: `kL(32) || kR(32) || c(32)`.
///
/// `kL` is always clamped (§3 invariants). Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedSecretKey {
    kl: [u8; 32],
    kr: [u8; 32],
    chaincode: [u8; 32],
}

impl ExtendedSecretKey {
    pub(crate) fn from_parts(kl: [u8; 32], kr: [u8; 32], chaincode: [u8; 32]) -> Self {
        Self { kl, kr, chaincode }
    }

    pub fn kl(&self) -> &[u8; 32] {
        &self.kl
    }

    pub fn kr(&self) -> &[u8; 32] {
        &self.kr
    }

    pub fn chaincode(&self) -> &[u8; 32] {
        &self.chaincode
    }

    /// Concatenated wire form, `kL || kR || c`, 96 bytes.
    pub fn to_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[..32].copy_from_slice(&self.kl);
        out[32..64].copy_from_slice(&self.kr);
        out[64..].copy_from_slice(&self.chaincode);
        out
    }

    pub fn from_bytes(bytes: &[u8; 96]) -> Self {
        let mut kl = [0u8; 32];
        let mut kr = [0u8; 32];
        let mut chaincode = [0u8; 32];
        kl.copy_from_slice(&bytes[..32]);
        kr.copy_from_slice(&bytes[32..64]);
        chaincode.copy_from_slice(&bytes[64..]);
        Self { kl, kr, chaincode }
    }

    /// `pk = kL · B`, the compressed Ed25519 public key for this node.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(primitives::scalar_mult_base(&self.kl).to_bytes())
    }

    /// The extended public key counterpart: `pk || c`.
    pub fn extended_public_key(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            pk: self.public_key(),
            chaincode: self.chaincode,
        }
    }
}

/// A 64-byte extended public key: `pk(32) || c(32)`.
///
/// As sensitive as an xsk for the purposes of *public* child derivation —
/// whoever holds an xpk can derive every soft descendant's public key.
#[derive(Clone, Copy)]
pub struct ExtendedPublicKey {
    pk: PublicKey,
    chaincode: [u8; 32],
}

impl ExtendedPublicKey {
    pub(crate) fn from_parts(pk: PublicKey, chaincode: [u8; 32]) -> Self {
        Self { pk, chaincode }
    }

    pub fn public_key(&self) -> PublicKey {
        self.pk
    }

    pub fn chaincode(&self) -> &[u8; 32] {
        &self.chaincode
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.pk.0);
        out[32..].copy_from_slice(&self.chaincode);
        out
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut pk = [0u8; 32];
        let mut chaincode = [0u8; 32];
        pk.copy_from_slice(&bytes[..32]);
        chaincode.copy_from_slice(&bytes[32..]);
        Self {
            pk: PublicKey(pk),
            chaincode,
        }
    }
}

/// A 32-byte compressed Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

/// Domain byte prepended to the seed before BLAKE2b-256 when deriving the
/// root chaincode (§4.1 step 4). Part of the on-wire contract; must match
/// the reference test vectors exactly.
const ROOT_CHAINCODE_DOMAIN: u8 = 0x01;

/// Convert a 64-byte seed into a 96-byte extended root key (§4.1).
///
/// Fails with [`Error::UnusableSeed`] if bit 5 of byte 31 of the SHA-512
/// left half is set before clamping — the standard BIP32-Ed25519 safety
/// check that keeps clamped scalars out of a weak subspace.
pub fn seed_to_root(seed: &Seed) -> Result<ExtendedSecretKey> {
    let mut k = primitives::sha512(&seed.0);
    let mut kl = [0u8; 32];
    let mut kr = [0u8; 32];
    kl.copy_from_slice(&k[..32]);
    kr.copy_from_slice(&k[32..]);
    k.zeroize();

    if kl[31] & 0x20 != 0 {
        kl.zeroize();
        kr.zeroize();
        tracing::debug!("seed_to_root: rejecting seed, bit 5 of byte 31 set");
        return Err(Error::UnusableSeed);
    }

    kl[0] &= 0xF8;
    kl[31] &= 0x7F;
    kl[31] |= 0x40;

    let mut domain_input = Vec::with_capacity(1 + seed.0.len());
    domain_input.push(ROOT_CHAINCODE_DOMAIN);
    domain_input.extend_from_slice(&seed.0);
    let chaincode = primitives::blake2b256(&domain_input);
    domain_input.zeroize();

    Ok(ExtendedSecretKey::from_parts(kl, kr, chaincode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_preservation() {
        let seed = Seed([7u8; 64]);
        let xsk = seed_to_root(&seed).unwrap();
        assert_eq!(xsk.kl()[0] & 0x07, 0);
        assert_eq!(xsk.kl()[31] & 0xE0, 0x40);
    }

    #[test]
    fn unusable_seed_is_rejected() {
        // Force bit 5 of byte 31 of SHA-512(seed)[0..32] to be set by
        // scanning small seeds until one triggers the rejection path.
        let mut found = false;
        for i in 0u8..=255 {
            let seed = Seed([i; 64]);
            let k = primitives::sha512(&seed.0);
            if k[31] & 0x20 != 0 {
                assert!(matches!(seed_to_root(&seed), Err(Error::UnusableSeed)));
                found = true;
                break;
            }
        }
        assert!(found, "expected at least one probed seed to be unusable");
    }

    #[test]
    fn public_key_matches_scalar_mult() {
        let seed = Seed([42u8; 64]);
        let xsk = seed_to_root(&seed).unwrap();
        let expected = primitives::scalar_mult_base(xsk.kl()).to_bytes();
        assert_eq!(xsk.public_key().to_bytes(), expected);
    }
}
