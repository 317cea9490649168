//! Authorization kinds of account updates

use crate::types::Bytes32;

/// Authorization tag of [`AuthorizationKind::NoneGiven`]
pub const NONE_GIVEN_TAG: u8 = 0;
/// Authorization tag of [`AuthorizationKind::Signature`]
pub const SIGNATURE_TAG: u8 = 1;
/// Authorization tag of [`AuthorizationKind::Proof`]
pub const PROOF_TAG: u8 = 2;

/// How an account update is authorized
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorizationKind {
    /// No authorization (only valid for updates that need none)
    NoneGiven,
    /// Authorized by a signature of the account key
    Signature,
    /// Authorized by a proof against a verification key
    Proof {
        /// Hash of the verification key the proof is checked against
        verification_key_hash: Bytes32,
    },
}

impl AuthorizationKind {
    /// Numeric tag used in the field encoding
    pub fn tag(&self) -> u8 {
        match self {
            Self::NoneGiven => NONE_GIVEN_TAG,
            Self::Signature => SIGNATURE_TAG,
            Self::Proof { .. } => PROOF_TAG,
        }
    }

    /// Verification key hash, present only for proof authorization
    pub fn verification_key_hash(&self) -> Option<&Bytes32> {
        match self {
            Self::Proof { verification_key_hash } => Some(verification_key_hash),
            Self::NoneGiven | Self::Signature => None,
        }
    }
}
