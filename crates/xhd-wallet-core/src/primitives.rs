// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// primitives: uniform adapter over the underlying crypto building blocks —
// SHA-512, BLAKE2b, Ed25519 scalar/point arithmetic, Ed25519<->X25519
// conversion, X25519, and detached Ed25519 verification. Everything above
// this module treats these as black boxes; nothing here knows about
// derivation paths, signatures, or schemas.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2bMac512, Digest};
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, VerifyingKey};
use sha2::Sha512;

use crate::error::{Error, Result};

pub type Blake2b256 = Blake2b<U32>;

/// SHA-512 of `input`.
pub fn sha512(input: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// BLAKE2b-256, used to derive the root chaincode (§4.1).
pub fn blake2b256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// BLAKE2b-512 keyed by `key`, used for the per-level child PRFs (§4.2.1).
///
/// `key` is the parent chaincode; callers keyed by anything other than a
/// 32-byte chaincode indicate a programming error upstream.
pub fn blake2b512_keyed(key: &[u8; 32], input: &[u8]) -> Result<[u8; 64]> {
    use blake2::digest::Mac;
    let mut mac = Blake2bMac512::new_from_slice(key)
        .map_err(|e| Error::PrimitiveFailure(format!("BLAKE2b keyed init: {e}")))?;
    mac.update(input);
    Ok(mac
        .finalize()
        .into_bytes()
        .as_slice()
        .try_into()
        .expect("Blake2bMac512 output is 64 bytes"))
}

/// Little-endian 256-bit addition mod 2^256 (no reduction mod the group
/// order ℓ). Used to combine parent and PRF scalar material per §4.2.1 —
/// the derivation engine explicitly does *not* want ℓ-reduction here.
pub fn add_256_wrapping(x: &[u8; 32], y: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry: u16 = 0;
    for i in 0..32 {
        let r = x[i] as u16 + y[i] as u16 + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    out
}

/// Khovratovich left-scalar combine: take the low 28 bytes of `zl`, multiply
/// by 8 (left-shift 3 bits) as a little-endian integer, and add to `kl` mod
/// 2^256. Bytes 28..32 of `zl` are discarded (only 224 bits of entropy flow
/// in).
pub fn add_28_mul8(kl: &[u8; 32], zl: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry: u16 = 0;
    for i in 0..28 {
        let r = kl[i] as u16 + ((zl[i] as u16) << 3) + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    for i in 28..32 {
        let r = kl[i] as u16 + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    out
}

/// Peikert left-scalar combine: treat all 32 bytes of `zl` as a 256-bit
/// little-endian integer, left-shift by 3 bits (producing up to 259 bits,
/// truncated back to 256), and add to `kl` mod 2^256. All 256 bits of
/// entropy in `zl` participate, unlike the Khovratovich variant.
pub fn mul8_full(zl: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry: u16 = 0;
    for i in 0..32 {
        let r = ((zl[i] as u16) << 3) + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    out
}

/// Ed25519 basepoint scalar multiplication with no clamping: the caller's
/// 32-byte little-endian integer is reduced mod ℓ (the only reduction under
/// which scalar multiplication is well defined) and multiplied by the
/// basepoint.
pub fn scalar_mult_base(scalar_le: &[u8; 32]) -> CompressedEdwardsY {
    let s = Scalar::from_bytes_mod_order(*scalar_le);
    EdwardsPoint::mul_base(&s).compress()
}

/// Ed25519 point addition on compressed points, returning a compressed
/// result. Fails if either input is not a valid curve point.
pub fn point_add(a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32]> {
    let pa = CompressedEdwardsY(*a)
        .decompress()
        .ok_or_else(|| Error::PrimitiveFailure("invalid Ed25519 point (lhs)".into()))?;
    let pb = CompressedEdwardsY(*b)
        .decompress()
        .ok_or_else(|| Error::PrimitiveFailure("invalid Ed25519 point (rhs)".into()))?;
    Ok((pa + pb).compress().to_bytes())
}

/// Reduce a 64-byte value mod ℓ. Used for Ed25519 signing's nonce (`r`) and
/// challenge (`h`) scalars.
pub fn scalar_reduce_wide(wide: &[u8; 64]) -> Scalar {
    Scalar::from_bytes_mod_order_wide(wide)
}

/// Reduce a 32-byte little-endian value mod ℓ, producing a `Scalar` usable
/// in scalar arithmetic (addition, multiplication).
pub fn scalar_reduce(narrow: &[u8; 32]) -> Scalar {
    Scalar::from_bytes_mod_order(*narrow)
}

/// Detached Ed25519 signature verification. Permissive: returns `false` on
/// malformed signatures or keys rather than failing.
pub fn ed25519_verify(sig: &[u8; 64], msg: &[u8], pk: &[u8; 32]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(pk) else {
        return false;
    };
    let signature = Signature::from_bytes(sig);
    verifying_key.verify_strict(msg, &signature).is_ok()
}

/// Convert a compressed Ed25519 point to its X25519 Montgomery-form
/// counterpart (RFC 7748 birational map).
pub fn ed25519_point_to_x25519(pk: &[u8; 32]) -> Result<[u8; 32]> {
    let point = CompressedEdwardsY(*pk)
        .decompress()
        .ok_or_else(|| Error::PrimitiveFailure("invalid Ed25519 public key".into()))?;
    Ok(point.to_montgomery().to_bytes())
}

/// Derive an X25519 secret scalar from the 64-byte BIP32-Ed25519 extended
/// secret's left half, per the standard Ed25519→X25519 secret conversion:
/// clamp `kl` directly (it is already clamped as an xsk invariant, but we
/// re-clamp defensively since this function may also be handed a bare
/// 32-byte seed by callers outside the derivation engine).
pub fn ed25519_scalar_to_x25519(kl: &[u8; 32]) -> [u8; 32] {
    let mut out = *kl;
    out[0] &= 0xF8;
    out[31] &= 0x7F;
    out[31] |= 0x40;
    out
}

/// X25519 Diffie-Hellman: `scalar * point`.
pub fn x25519(scalar: &[u8; 32], point: &[u8; 32]) -> [u8; 32] {
    use x25519_dalek::{PublicKey, StaticSecret};
    let secret = StaticSecret::from(*scalar);
    let public = PublicKey::from(*point);
    secret.diffie_hellman(&public).to_bytes()
}
