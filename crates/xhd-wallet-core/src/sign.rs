// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// sign: the signing safety gate (§4.3) — Algorand transaction signing,
// schema-validated arbitrary-data signing, and permissive detached verify.
//
// Types:
//   Encoding      — signData's input encoding: none | base64 | msgpack
//   SignMetadata  — { encoding, schema }
// Functions:
//   sign_algo_transaction() — sign bytes that already carry an Algorand tag
//   sign_data()             — tag-reject, decode, schema-validate, then sign
//   verify_with_public_key() — thin detached-verify wrapper, never fails

use base64::Engine;

use crate::derive::{derive_key, Bip32DerivationType, DerivedKey};
use crate::error::{Error, Result};
use crate::keys::{ExtendedSecretKey, PublicKey};
use crate::path::{Bip44Path, KeyContext};
use crate::primitives;

/// Algorand consensus domain-separation prefixes (§6). Byte-prefix checks,
/// no terminator.
const TAGS: &[&[u8]] = &[b"TX", b"MX", b"Program", b"progData"];

fn starts_with_reserved_tag(data: &[u8]) -> Option<&'static str> {
    const NAMES: &[&str] = &["TX", "MX", "Program", "progData"];
    TAGS.iter()
        .zip(NAMES.iter())
        .find(|(tag, _)| data.starts_with(tag.as_ref() as &[u8]))
        .map(|(_, name)| *name)
}

/// How `signData`'s input payload is encoded before schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    None,
    Base64,
    Msgpack,
}

/// `{ encoding, schema }` — the decode-and-validate contract for `signData`.
pub struct SignMetadata {
    pub encoding: Encoding,
    pub schema: serde_json::Value,
}

fn leaf_xsk(
    root: &ExtendedSecretKey,
    context: KeyContext,
    account: u32,
    change: u32,
    key_index: u32,
    variant: Bip32DerivationType,
) -> Result<ExtendedSecretKey> {
    let path = Bip44Path::new(context, account, change, key_index);
    match derive_key(root, &path.indices(), true, variant)? {
        DerivedKey::Private(xsk) => Ok(xsk),
        DerivedKey::Public(_) => unreachable!("derive_key(is_private=true) always returns Private"),
    }
}

/// Sign `msg` with `(kL, kR)` directly, per the BIP32-Ed25519 signing
/// equations in §4.3.1. This is distinct from standard Ed25519 signing,
/// which re-expands a 32-byte seed via SHA-512; here `(kL, kR)` are used
/// as-is, already being the expanded secret and nonce seed.
fn bip32_sign(xsk: &ExtendedSecretKey, msg: &[u8]) -> [u8; 64] {
    let pk = xsk.public_key().to_bytes();

    let mut nonce_input = Vec::with_capacity(32 + msg.len());
    nonce_input.extend_from_slice(xsk.kr());
    nonce_input.extend_from_slice(msg);
    let nonce_hash = primitives::sha512(&nonce_input);
    let r = primitives::scalar_reduce_wide(&nonce_hash);

    let r_point = primitives::scalar_mult_base(r.as_bytes()).to_bytes();

    let mut challenge_input = Vec::with_capacity(32 + 32 + msg.len());
    challenge_input.extend_from_slice(&r_point);
    challenge_input.extend_from_slice(&pk);
    challenge_input.extend_from_slice(msg);
    let challenge_hash = primitives::sha512(&challenge_input);
    let h = primitives::scalar_reduce_wide(&challenge_hash);

    let a = primitives::scalar_reduce(xsk.kl());
    let s = r + h * a;

    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&r_point);
    sig[32..].copy_from_slice(s.as_bytes());
    sig
}

/// `signAlgoTransaction` (§4.3.1): the caller asserts `prefix_encoded_tx`
/// already carries one of the Algorand domain tags; we sign it as-is with
/// no further policy checks.
pub fn sign_algo_transaction(
    root: &ExtendedSecretKey,
    context: KeyContext,
    account: u32,
    change: u32,
    key_index: u32,
    prefix_encoded_tx: &[u8],
    variant: Bip32DerivationType,
) -> Result<[u8; 64]> {
    let xsk = leaf_xsk(root, context, account, change, key_index, variant)?;
    Ok(bip32_sign(&xsk, prefix_encoded_tx))
}

/// `signData` (§4.3.2): the safety pipeline. Any failure aborts before
/// anything is signed; the original (not decoded) bytes are what gets
/// signed on success.
#[allow(clippy::too_many_arguments)]
pub fn sign_data(
    root: &ExtendedSecretKey,
    context: KeyContext,
    account: u32,
    change: u32,
    key_index: u32,
    data: &[u8],
    metadata: &SignMetadata,
    variant: Bip32DerivationType,
) -> Result<[u8; 64]> {
    // 1. Outer tag rejection.
    if let Some(tag) = starts_with_reserved_tag(data) {
        tracing::debug!(tag, "sign_data: rejecting outer payload, looks like a consensus object");
        return Err(Error::DataIsTransactionLike { tag });
    }

    // 2. Decode per metadata.encoding, with the inner-tag check for base64.
    let decoded: serde_json::Value = match metadata.encoding {
        Encoding::None => serde_json::Value::Array(
            data.iter().map(|b| serde_json::Value::from(*b)).collect(),
        ),
        Encoding::Base64 => {
            let raw = base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| {
                    tracing::debug!(error = %e, "sign_data: base64 decode failed");
                    Error::InvalidEncoding {
                        encoding: "base64",
                        reason: e.to_string(),
                    }
                })?;
            if let Some(tag) = starts_with_reserved_tag(&raw) {
                tracing::debug!(tag, "sign_data: rejecting base64-decoded payload, looks like a consensus object");
                return Err(Error::DataIsTransactionLike { tag });
            }
            serde_json::Value::String(
                base64::engine::general_purpose::STANDARD.encode(&raw),
            )
        }
        Encoding::Msgpack => {
            let value: rmpv::Value = rmp_serde::from_slice(data).map_err(|e| {
                tracing::debug!(error = %e, "sign_data: msgpack decode failed");
                Error::InvalidEncoding {
                    encoding: "msgpack",
                    reason: e.to_string(),
                }
            })?;
            msgpack_to_json(&value)
        }
    };

    // 3. Schema validation of the decoded value.
    let validator = jsonschema::validator_for(&metadata.schema)
        .map_err(|e| Error::InvalidSchema(e.to_string()))?;
    if let Err(first_error) = validator.validate(&decoded) {
        tracing::debug!(error = %first_error, "sign_data: payload failed schema validation");
        return Err(Error::InvalidSchema(first_error.to_string()));
    }

    // 4. Sign the original bytes, not the decoded form.
    let xsk = leaf_xsk(root, context, account, change, key_index, variant)?;
    Ok(bip32_sign(&xsk, data))
}

fn msgpack_to_json(value: &rmpv::Value) -> serde_json::Value {
    match value {
        rmpv::Value::Nil => serde_json::Value::Null,
        rmpv::Value::Boolean(b) => serde_json::Value::Bool(*b),
        rmpv::Value::Integer(i) => i
            .as_i64()
            .map(serde_json::Number::from)
            .or_else(|| i.as_u64().map(serde_json::Number::from))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        rmpv::Value::F32(f) => serde_json::Number::from_f64(*f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        rmpv::Value::F64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        rmpv::Value::String(s) => {
            serde_json::Value::String(s.as_str().unwrap_or_default().to_string())
        }
        rmpv::Value::Binary(b) => {
            serde_json::Value::Array(b.iter().map(|x| serde_json::Value::from(*x)).collect())
        }
        rmpv::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(msgpack_to_json).collect())
        }
        rmpv::Value::Map(entries) => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                let key = k.as_str().unwrap_or_default().to_string();
                map.insert(key, msgpack_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        rmpv::Value::Ext(_, _) => serde_json::Value::Null,
    }
}

/// `verifyWithPublicKey` (§4.3.3): thin detached-verify wrapper. No
/// derivation, no tag policy — permissive by design.
pub fn verify_with_public_key(sig: &[u8; 64], msg: &[u8], pk: &PublicKey) -> bool {
    primitives::ed25519_verify(sig, msg, &pk.to_bytes())
}
