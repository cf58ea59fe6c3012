// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// ecdh: Ed25519->X25519 conversion and canonically-ordered session-key
// derivation (§4.4).
//
// Functions:
//   ecdh() — derive a 32-byte shared secret with a peer's Ed25519 pubkey

use crate::derive::{derive_key, Bip32DerivationType, DerivedKey};
use crate::error::{Error, Result};
use crate::keys::ExtendedSecretKey;
use crate::path::{Bip44Path, KeyContext};
use crate::primitives;

/// `ECDH` (§4.4.1): derive the local leaf key at
/// `m/44'/cointype(context)'/account'/0/keyIndex`, convert both local and
/// peer Ed25519 public keys to X25519, perform the DH, and fold the result
/// with a canonical ordering of the two X25519 public keys into a 32-byte
/// session key.
///
/// Both parties must call with opposite `me_first` to land on the same
/// secret (§8 "ECDH symmetry").
pub fn ecdh(
    root: &ExtendedSecretKey,
    context: KeyContext,
    account: u32,
    key_index: u32,
    other_party_pub: &[u8; 32],
    me_first: bool,
    variant: Bip32DerivationType,
) -> Result<[u8; 32]> {
    let path = Bip44Path::new(context, account, 0, key_index);
    let xsk = match derive_key(root, &path.indices(), true, variant)? {
        DerivedKey::Private(xsk) => xsk,
        DerivedKey::Public(_) => unreachable!("derive_key(is_private=true) always returns Private"),
    };

    let local_pk = xsk.public_key().to_bytes();
    let sk_x = primitives::ed25519_scalar_to_x25519(xsk.kl());
    let pk_x_self = primitives::ed25519_point_to_x25519(&local_pk)?;
    let pk_x_peer = primitives::ed25519_point_to_x25519(other_party_pub)?;

    let dh = primitives::x25519(&sk_x, &pk_x_peer);
    if dh == [0u8; 32] {
        tracing::debug!("ecdh: peer point produced the all-zero weak point");
        return Err(Error::WeakPoint);
    }

    let (first, second) = if me_first {
        (pk_x_self, pk_x_peer)
    } else {
        (pk_x_peer, pk_x_self)
    };

    let mut combined = Vec::with_capacity(96);
    combined.extend_from_slice(&dh);
    combined.extend_from_slice(&first);
    combined.extend_from_slice(&second);
    Ok(primitives::blake2b256(&combined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{seed_to_root, Seed};

    fn xsk_for(seed_byte: u8) -> ExtendedSecretKey {
        seed_to_root(&Seed([seed_byte; 64])).unwrap()
    }

    fn pk_for(root: &ExtendedSecretKey, variant: Bip32DerivationType) -> [u8; 32] {
        let path = Bip44Path::new(KeyContext::Identity, 0, 0, 0);
        match derive_key(root, &path.indices(), true, variant).unwrap() {
            DerivedKey::Private(xsk) => xsk.public_key().to_bytes(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn ecdh_is_symmetric_with_opposite_me_first() {
        let variant = Bip32DerivationType::Peikert;
        let alice_root = xsk_for(1);
        let bob_root = xsk_for(2);
        let alice_pk = pk_for(&alice_root, variant);
        let bob_pk = pk_for(&bob_root, variant);

        let alice_secret = ecdh(
            &alice_root,
            KeyContext::Identity,
            0,
            0,
            &bob_pk,
            true,
            variant,
        )
        .unwrap();
        let bob_secret = ecdh(
            &bob_root,
            KeyContext::Identity,
            0,
            0,
            &alice_pk,
            false,
            variant,
        )
        .unwrap();

        assert_eq!(alice_secret, bob_secret);
    }

    #[test]
    fn ecdh_end_to_end_secretbox_round_trip() {
        let variant = Bip32DerivationType::Peikert;
        let alice_root = xsk_for(3);
        let bob_root = xsk_for(4);
        let alice_pk = pk_for(&alice_root, variant);
        let bob_pk = pk_for(&bob_root, variant);

        let shared = ecdh(
            &alice_root,
            KeyContext::Identity,
            0,
            0,
            &bob_pk,
            true,
            variant,
        )
        .unwrap();
        let shared_bob = ecdh(
            &bob_root,
            KeyContext::Identity,
            0,
            0,
            &alice_pk,
            false,
            variant,
        )
        .unwrap();
        assert_eq!(shared, shared_bob);

        let sealed = crate::aead::seal(&shared, b"Hello, Bob!").unwrap();
        let opened = crate::aead::open(&shared, &sealed).unwrap();
        assert_eq!(opened, b"Hello, Bob!");
    }

    #[test]
    fn mismatched_me_first_on_same_side_disagrees() {
        let variant = Bip32DerivationType::Peikert;
        let alice_root = xsk_for(5);
        let bob_root = xsk_for(6);
        let bob_pk = pk_for(&bob_root, variant);

        let a = ecdh(
            &alice_root,
            KeyContext::Identity,
            0,
            0,
            &bob_pk,
            true,
            variant,
        )
        .unwrap();
        let b = ecdh(
            &alice_root,
            KeyContext::Identity,
            0,
            0,
            &bob_pk,
            false,
            variant,
        )
        .unwrap();
        assert_ne!(a, b);
    }
}
