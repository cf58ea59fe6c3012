// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// derive: the BIP32-Ed25519 child-key derivation engine (§4.2).
//
// Functions:
//   derive_child_node_private() — private (hardened or soft) child derivation
//   derive_child_node_public()  — public-only (soft) child derivation
//   derive_key()                — path walker, private or public
//   key_gen()                   — canonical BIP44 path -> leaf public key

use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::keys::{ExtendedPublicKey, ExtendedSecretKey, PublicKey};
use crate::path::{is_hardened, KeyContext};
use crate::primitives;

/// Selects how PRF output `zL` is folded into the child left scalar (§4.2.1).
/// Peikert is the default — first-class runtime parameter, not a
/// compile-time switch, so both variants interoperate with prior test
/// vectors and peer libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bip32DerivationType {
    Khovratovich,
    Peikert,
}

impl Default for Bip32DerivationType {
    fn default() -> Self {
        Bip32DerivationType::Peikert
    }
}

const TAG_Z: u8 = 0x00;
const TAG_CC: u8 = 0x01;

fn le32(index: u32) -> [u8; 4] {
    index.to_le_bytes()
}

/// Build the `Z` and `CC` PRF outputs: BLAKE2b-512 keyed by the parent
/// chaincode, over `tag || domain_payload || LE32(index)` (§4.2.1).
fn prf_outputs(
    chaincode: &[u8; 32],
    domain_payload: &[&[u8]],
    index: u32,
) -> Result<([u8; 64], [u8; 64])> {
    let mut z_input = Vec::new();
    z_input.push(TAG_Z);
    for part in domain_payload {
        z_input.extend_from_slice(part);
    }
    z_input.extend_from_slice(&le32(index));

    let mut cc_input = Vec::new();
    cc_input.push(TAG_CC);
    for part in domain_payload {
        cc_input.extend_from_slice(part);
    }
    cc_input.extend_from_slice(&le32(index));

    let z = primitives::blake2b512_keyed(chaincode, &z_input)?;
    let cc = primitives::blake2b512_keyed(chaincode, &cc_input)?;
    z_input.zeroize();
    cc_input.zeroize();
    Ok((z, cc))
}

fn combine_left(kl: &[u8; 32], zl: &[u8; 32], variant: Bip32DerivationType) -> [u8; 32] {
    match variant {
        Bip32DerivationType::Khovratovich => primitives::add_28_mul8(kl, zl),
        Bip32DerivationType::Peikert => {
            primitives::add_256_wrapping(kl, &primitives::mul8_full(zl))
        }
    }
}

/// `zL8`, the scalar actually added to (or multiplied against the
/// basepoint alongside) the parent left scalar, independent of whether the
/// caller has the parent scalar on hand (used by the public-only path).
fn zl8(zl: &[u8; 32], variant: Bip32DerivationType) -> [u8; 32] {
    match variant {
        Bip32DerivationType::Khovratovich => {
            // add_28_mul8(0, zl) isolates the 8*trunc28(zl) term.
            primitives::add_28_mul8(&[0u8; 32], zl)
        }
        Bip32DerivationType::Peikert => primitives::mul8_full(zl),
    }
}

/// `deriveChildNodePrivate` (§4.2.1): derive `xsk_child` from `xsk_parent`
/// at `index`, for either a hardened or soft index.
pub fn derive_child_node_private(
    parent: &ExtendedSecretKey,
    index: u32,
    variant: Bip32DerivationType,
) -> Result<ExtendedSecretKey> {
    let hardened = is_hardened(index);
    let (mut z, mut cc) = if hardened {
        prf_outputs(
            parent.chaincode(),
            &[parent.kl().as_slice(), parent.kr().as_slice()],
            index,
        )?
    } else {
        let pk = parent.public_key().to_bytes();
        prf_outputs(parent.chaincode(), &[pk.as_slice()], index)?
    };

    let mut zl = [0u8; 32];
    let mut zr = [0u8; 32];
    zl.copy_from_slice(&z[..32]);
    zr.copy_from_slice(&z[32..]);
    z.zeroize();

    let mut child_chaincode = [0u8; 32];
    child_chaincode.copy_from_slice(&cc[32..]);
    cc.zeroize();

    let kl_child = combine_left(parent.kl(), &zl, variant);
    let kr_child = primitives::add_256_wrapping(parent.kr(), &zr);
    zl.zeroize();
    zr.zeroize();

    Ok(ExtendedSecretKey::from_parts(
        kl_child,
        kr_child,
        child_chaincode,
    ))
}

/// `deriveChildNodePublic` (§4.2.2): derive `xpk_child` from `xpk_parent`.
/// Only defined for soft indices.
pub fn derive_child_node_public(
    parent: &ExtendedPublicKey,
    index: u32,
    variant: Bip32DerivationType,
) -> Result<ExtendedPublicKey> {
    if is_hardened(index) {
        tracing::debug!(index, "derive_child_node_public: hardened index has no public derivation");
        return Err(Error::HardPublicDerivationForbidden { index });
    }

    let pk = parent.public_key().to_bytes();
    let (mut z, mut cc) = prf_outputs(parent.chaincode(), &[pk.as_slice()], index)?;

    let mut zl = [0u8; 32];
    zl.copy_from_slice(&z[..32]);
    z.zeroize();

    let mut child_chaincode = [0u8; 32];
    child_chaincode.copy_from_slice(&cc[32..]);
    cc.zeroize();

    let scalar = zl8(&zl, variant);
    zl.zeroize();
    let point = primitives::scalar_mult_base(&scalar).to_bytes();
    let pk_child = primitives::point_add(&pk, &point)?;

    Ok(ExtendedPublicKey::from_parts(
        PublicKey(pk_child),
        child_chaincode,
    ))
}

/// Walk `path` left to right from `root`.
///
/// If `is_private`, every level is derived with
/// [`derive_child_node_private`] and the leaf xsk is returned. If not, the
/// walk starts from `root`'s xpk and every level is derived with
/// [`derive_child_node_public`]; encountering a hardened index fails the
/// whole walk with [`Error::HardPublicDerivationForbidden`].
pub enum DerivedKey {
    Private(ExtendedSecretKey),
    Public(ExtendedPublicKey),
}

pub fn derive_key(
    root: &ExtendedSecretKey,
    path: &[u32],
    is_private: bool,
    variant: Bip32DerivationType,
) -> Result<DerivedKey> {
    if is_private {
        let mut node = root.clone();
        for &index in path {
            node = derive_child_node_private(&node, index, variant)?;
        }
        Ok(DerivedKey::Private(node))
    } else {
        let mut node = root.extended_public_key();
        for &index in path {
            node = derive_child_node_public(&node, index, variant)?;
        }
        Ok(DerivedKey::Public(node))
    }
}

/// `keyGen` (§4.2.4): derive the canonical `m/44'/cointype'/account'/0/keyIndex`
/// leaf and return its compressed public key.
pub fn key_gen(
    root: &ExtendedSecretKey,
    context: KeyContext,
    account: u32,
    key_index: u32,
    variant: Bip32DerivationType,
) -> Result<PublicKey> {
    let path = crate::path::Bip44Path::new(context, account, 0, key_index);
    match derive_key(root, &path.indices(), true, variant)? {
        DerivedKey::Private(xsk) => Ok(xsk.public_key()),
        DerivedKey::Public(_) => unreachable!("derive_key(is_private=true) always returns Private"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{seed_to_root, Seed};

    fn root_from_hex() -> ExtendedSecretKey {
        let bytes = hex::decode(
            "a8ba80028922d9fcfa055c78aede55b5c575bcd8d5a53168edf45f36d9ec8f4\
694592b4bc892907583e22669ecdf1b0409a9f3bd5549f2dd751b51360909cd0\
5796b9206ec30e142e94b790a98805bf999042b55046963174ee6cee2d037594\
6",
        )
        .unwrap();
        let mut arr = [0u8; 96];
        arr.copy_from_slice(&bytes);
        ExtendedSecretKey::from_bytes(&arr)
    }

    fn pk_hex(pk: &PublicKey) -> String {
        hex::encode(pk.to_bytes())
    }

    #[test]
    fn concrete_vector_address_account0() {
        let root = root_from_hex();
        let expected = [
            "8ad0bbc42326ac64eb4dbbe40a77518a7fc1d39504b618a4dc85f03b3a921a02",
            "2d3f9e31232bd36e6c0f37597e19c4c0154e58c41bc2b737c7700b683e85d0af",
            "96acc17f0c34f6c640d5466988ce59c4da5423b5ec233b7ad2e5c5a3b1b80782",
        ];
        for (i, exp) in expected.iter().enumerate() {
            let pk = key_gen(
                &root,
                KeyContext::Address,
                0,
                i as u32,
                Bip32DerivationType::Peikert,
            )
            .unwrap();
            assert_eq!(pk_hex(&pk), *exp);
        }
    }

    #[test]
    fn concrete_vector_address_account1() {
        let root = root_from_hex();
        let pk = key_gen(&root, KeyContext::Address, 1, 0, Bip32DerivationType::Peikert).unwrap();
        assert_eq!(
            pk_hex(&pk),
            "fd56577456794efb91e05dc947d26d4864b346d139dfa8fff9b0e1def84b9078"
        );
    }

    #[test]
    fn concrete_vector_identity() {
        let root = root_from_hex();
        let pk = key_gen(&root, KeyContext::Identity, 0, 0, Bip32DerivationType::Peikert).unwrap();
        assert_eq!(
            pk_hex(&pk),
            "844cda69c4ef7c212befaa6733f5e3c0317fc173cb9f14c6cf66a48263e722ec"
        );
    }

    #[test]
    fn clamp_preservation_across_derivation() {
        let root = root_from_hex();
        for variant in [Bip32DerivationType::Khovratovich, Bip32DerivationType::Peikert] {
            let child = derive_child_node_private(&root, 0, variant).unwrap();
            // Children do not re-clamp (§4.2.1 "Failure" note); only the
            // root is guaranteed clamped.
            let _ = child;
        }
        assert_eq!(root.kl()[0] & 0x07, 0);
        assert_eq!(root.kl()[31] & 0xE0, 0x40);
    }

    #[test]
    fn hardened_index_rejected_by_public_walk() {
        let root = root_from_hex();
        let path = [crate::path::harden(0)];
        let err = derive_key(&root, &path, false, Bip32DerivationType::Peikert).unwrap_err();
        assert!(matches!(err, Error::HardPublicDerivationForbidden { .. }));
    }

    #[test]
    fn pub_priv_agreement_for_soft_path() {
        let root = root_from_hex();
        for variant in [Bip32DerivationType::Khovratovich, Bip32DerivationType::Peikert] {
            // m/44'/283'/0' hardened prefix derived privately, then two
            // soft levels (change, keyIndex) derived both ways.
            let hardened_prefix = [
                crate::path::harden(44),
                crate::path::harden(283),
                crate::path::harden(0),
            ];
            let account_xsk = match derive_key(&root, &hardened_prefix, true, variant).unwrap() {
                DerivedKey::Private(xsk) => xsk,
                _ => unreachable!(),
            };
            let account_xpk = account_xsk.extended_public_key();

            for key_index in 0..3u32 {
                let soft_path = [0u32, key_index];
                let priv_leaf = match derive_key(&account_xsk, &soft_path, true, variant).unwrap() {
                    DerivedKey::Private(xsk) => xsk.public_key(),
                    _ => unreachable!(),
                };

                let mut pub_node = account_xpk;
                for &index in &soft_path {
                    pub_node = derive_child_node_public(&pub_node, index, variant).unwrap();
                }

                assert_eq!(priv_leaf.to_bytes(), pub_node.public_key().to_bytes());
            }
        }
    }
}
