//! Account updates
//!
//! An [`AccountUpdate`] is the atomic authorization unit of a transaction and
//! the leaf payload of a call forest. Its digest depends only on its own
//! fields: the declared call depth is carried for the flat transaction
//! encoding but is not part of the field encoding, so moving an update within
//! a forest never changes its digest.

mod authorization;
mod raw;

pub use authorization::AuthorizationKind;
pub use raw::RawAccountUpdate;

use crate::types::{Bytes32, CallDepth, PublicKey, TokenId, DEFAULT_TOKEN_ID};
use crate::zkp::types::{pack_bytes, u64_to_limbs, Val};

/// Number of field elements in the encoding of an account update
pub const UPDATE_FIELD_COUNT: usize = 40;

/// A single account update
///
/// Immutable once constructed; the `with_*` methods return modified copies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountUpdate {
    public_key: PublicKey,
    token_id: TokenId,
    balance_change: i64,
    increment_nonce: bool,
    authorization_kind: AuthorizationKind,
    call_depth: CallDepth,
}

impl AccountUpdate {
    /// Creates an update on the native token with no balance change
    ///
    /// # Arguments
    /// * `public_key` - The account the update applies to
    /// * `authorization_kind` - How the update is authorized
    pub fn new(public_key: PublicKey, authorization_kind: AuthorizationKind) -> Self {
        Self {
            public_key,
            token_id: DEFAULT_TOKEN_ID,
            balance_change: 0,
            increment_nonce: false,
            authorization_kind,
            call_depth: 0,
        }
    }

    /// Returns a copy operating on `token_id`
    pub fn with_token_id(mut self, token_id: TokenId) -> Self {
        self.token_id = token_id;
        self
    }

    /// Returns a copy with the given signed balance change
    pub fn with_balance_change(mut self, balance_change: i64) -> Self {
        self.balance_change = balance_change;
        self
    }

    /// Returns a copy that does (or does not) increment the account nonce
    pub fn with_increment_nonce(mut self, increment_nonce: bool) -> Self {
        self.increment_nonce = increment_nonce;
        self
    }

    /// Returns a copy declaring the given call depth
    pub fn with_call_depth(mut self, call_depth: CallDepth) -> Self {
        self.call_depth = call_depth;
        self
    }

    /// The account the update applies to
    pub fn public_key(&self) -> &PublicKey { &self.public_key }

    /// The token the update operates on
    pub fn token_id(&self) -> &TokenId { &self.token_id }

    /// Signed balance change
    pub fn balance_change(&self) -> i64 { self.balance_change }

    /// Whether the account nonce is incremented
    pub fn increment_nonce(&self) -> bool { self.increment_nonce }

    /// How the update is authorized
    pub fn authorization_kind(&self) -> &AuthorizationKind { &self.authorization_kind }

    /// Declared nesting depth in the flat transaction encoding
    pub fn call_depth(&self) -> CallDepth { self.call_depth }

    /// Encodes the update as field elements
    ///
    /// Layout (40 elements):
    /// - public key (11, 3 bytes per element)
    /// - token id (11)
    /// - balance change magnitude as four 16-bit limbs, then the sign (5)
    /// - increment nonce flag (1)
    /// - authorization tag (1)
    /// - verification key hash, zero unless proof-authorized (11)
    pub fn to_fields(&self) -> Vec<Val> {
        let mut fields = Vec::with_capacity(UPDATE_FIELD_COUNT);
        fields.extend(pack_bytes(&self.public_key));
        fields.extend(pack_bytes(&self.token_id));
        fields.extend(u64_to_limbs(self.balance_change.unsigned_abs()));
        fields.push(Val::new(u32::from(self.balance_change < 0)));
        fields.push(Val::new(u32::from(self.increment_nonce)));
        fields.push(Val::new(u32::from(self.authorization_kind.tag())));
        let verification_key_hash: Bytes32 =
            self.authorization_kind.verification_key_hash().copied().unwrap_or([0u8; 32]);
        fields.extend(pack_bytes(&verification_key_hash));
        fields
    }
}
