// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// aead: authenticated secretbox-style encryption, keyed directly by an
// already-derived 32-byte secret (e.g. an ECDH session key). Exists only to
// support the end-to-end ECDH usage example in §8 scenario 5 — the core
// derivation/signing/ECDH API never calls into this module itself.
//
// Types:
//   Sealed   — nonce || ciphertext container
// Functions:
//   seal()   — encrypt plaintext under a session key (random nonce)
//   open()   — decrypt and authenticate a Sealed value

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand_core::RngCore;

use crate::error::{Error, Result};

const NONCE_LEN: usize = 12;

/// A sealed message: random nonce plus ciphertext (with appended AEAD tag).
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key` (typically an ECDH shared secret) with a
/// fresh random nonce.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::PrimitiveFailure(format!("AEAD init: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand_core::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| Error::PrimitiveFailure(format!("AEAD seal: {e}")))?;

    Ok(Sealed {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt and authenticate a [`Sealed`] value under `key`.
pub fn open(key: &[u8; 32], sealed: &Sealed) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::PrimitiveFailure(format!("AEAD init: {e}")))?;
    let nonce = Nonce::from_slice(&sealed.nonce);

    cipher
        .decrypt(nonce, sealed.ciphertext.as_ref())
        .map_err(|_| Error::PrimitiveFailure("AEAD open: authentication failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = [9u8; 32];
        let sealed = seal(&key, b"Hello, Bob!").unwrap();
        let opened = open(&key, &sealed).unwrap();
        assert_eq!(opened, b"Hello, Bob!");
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let key = [1u8; 32];
        let other = [2u8; 32];
        let sealed = seal(&key, b"secret").unwrap();
        assert!(open(&other, &sealed).is_err());
    }
}
