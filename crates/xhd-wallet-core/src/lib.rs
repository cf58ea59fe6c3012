// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// xhd-wallet-core: BIP32-Ed25519 hierarchical deterministic wallet core.
//
// Modules:
//   primitives — uniform adapter over SHA-512/BLAKE2b/Ed25519/X25519 ops
//   keys       — xsk/xpk/pk wire types, seed->root conversion
//   path       — derivation indices, BIP44 cointype contexts, paths
//   derive     — the BIP32-Ed25519 child-key derivation engine
//   sign       — Algorand tx signing, schema-validated data signing, verify
//   ecdh       — Ed25519->X25519 conversion and session-key derivation
//   aead       — authenticated encryption for the ECDH usage example
//   error      — typed failures shared across every module above

pub mod aead;
pub mod derive;
pub mod ecdh;
pub mod error;
pub mod keys;
pub mod path;
pub mod primitives;
pub mod sign;

pub use derive::{
    derive_child_node_private, derive_child_node_public, derive_key, key_gen,
    Bip32DerivationType, DerivedKey,
};
pub use ecdh::ecdh;
pub use error::{Error, Result};
pub use keys::{seed_to_root, ExtendedPublicKey, ExtendedSecretKey, PublicKey, Seed};
pub use path::{harden, is_hardened, Bip44Path, KeyContext};
pub use sign::{sign_algo_transaction, sign_data, verify_with_public_key, Encoding, SignMetadata};
