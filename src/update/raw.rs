//! Validation of externally supplied account updates
//!
//! A [`RawAccountUpdate`] mirrors the loosely typed shape in which updates
//! arrive from outside the crate. Converting it into an [`AccountUpdate`]
//! checks every field against its domain and fills in defaults.

use tracing::warn;

use super::authorization::{NONE_GIVEN_TAG, PROOF_TAG, SIGNATURE_TAG};
use super::{AccountUpdate, AuthorizationKind};
use crate::errors::{Error, UpdateError};
use crate::types::{Bytes32, CallDepth, PublicKey, TokenId};

/// An unvalidated account update
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawAccountUpdate {
    /// Account the update applies to (required)
    pub public_key: Option<PublicKey>,
    /// Token operated on, the native token when absent
    pub token_id: Option<TokenId>,
    /// Signed balance change, zero when absent
    pub balance_change: Option<i64>,
    /// Nonce increment flag, false when absent
    pub increment_nonce: Option<bool>,
    /// Authorization tag (required): 0 none, 1 signature, 2 proof
    pub authorization_kind: Option<u8>,
    /// Verification key hash, required for and only allowed with proof authorization
    pub verification_key_hash: Option<Bytes32>,
    /// Declared call depth, zero when absent
    pub call_depth: Option<CallDepth>,
}

fn malformed(field: &'static str, reason: impl Into<String>) -> Error {
    let reason = reason.into();
    warn!(field, %reason, "rejected account update payload");
    UpdateError::MalformedPayload { field, reason }.into()
}

impl TryFrom<RawAccountUpdate> for AccountUpdate {
    type Error = Error;

    fn try_from(raw: RawAccountUpdate) -> Result<Self, Self::Error> {
        let public_key = raw.public_key.ok_or_else(|| malformed("public_key", "is missing"))?;
        let tag =
            raw.authorization_kind.ok_or_else(|| malformed("authorization_kind", "is missing"))?;

        let authorization_kind = match (tag, raw.verification_key_hash) {
            (PROOF_TAG, Some(verification_key_hash)) => {
                AuthorizationKind::Proof { verification_key_hash }
            }
            (PROOF_TAG, None) => {
                return Err(malformed(
                    "verification_key_hash",
                    "is required for proof authorization",
                ))
            }
            (NONE_GIVEN_TAG | SIGNATURE_TAG, Some(_)) => {
                return Err(malformed(
                    "verification_key_hash",
                    "is only allowed with proof authorization",
                ))
            }
            (NONE_GIVEN_TAG, None) => AuthorizationKind::NoneGiven,
            (SIGNATURE_TAG, None) => AuthorizationKind::Signature,
            (other, _) => {
                return Err(malformed(
                    "authorization_kind",
                    format!("has unknown tag {other}"),
                ))
            }
        };

        let mut update = AccountUpdate::new(public_key, authorization_kind)
            .with_balance_change(raw.balance_change.unwrap_or(0))
            .with_increment_nonce(raw.increment_nonce.unwrap_or(false))
            .with_call_depth(raw.call_depth.unwrap_or(0));
        if let Some(token_id) = raw.token_id {
            update = update.with_token_id(token_id);
        }
        Ok(update)
    }
}
