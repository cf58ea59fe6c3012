// Copyright (C) 2025 axpnet
// SPDX-License-Identifier: GPL-3.0-or-later
//
// error: typed failures for the derivation, signing, and ECDH pipelines

use thiserror::Error;

/// All ways a core operation can fail.
///
/// `verifyWithPublicKey` never returns one of these — verification failure
/// is reported as `false`, not an error (see [`crate::sign::verify_with_public_key`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("seed is unusable: bit 5 of byte 31 of SHA-512(seed) left-half is set")]
    UnusableSeed,

    #[error("hardened index {index} requires the private derivation path")]
    HardPublicDerivationForbidden { index: u32 },

    #[error("payload begins with reserved Algorand domain tag {tag:?}")]
    DataIsTransactionLike { tag: &'static str },

    #[error("payload failed schema validation: {0}")]
    InvalidSchema(String),

    #[error("failed to decode payload as {encoding}: {reason}")]
    InvalidEncoding {
        encoding: &'static str,
        reason: String,
    },

    #[error("ECDH produced the all-zero weak point")]
    WeakPoint,

    #[error("underlying cryptographic primitive failed: {0}")]
    PrimitiveFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
