//! Derive: public key to account address.

use super::types::{DeriveRequest, DeriveResponse, RosettaPublicKey};
use super::ConstructionError;
use crate::config::CURVE_TYPE;
use crate::crypto::PublicKey;
use crate::identity::Address;
use crate::ledger::AccountIdentifier;

pub fn derive(req: &DeriveRequest) -> Result<DeriveResponse, ConstructionError> {
    let key = public_key(&req.public_key)?;
    Ok(DeriveResponse {
        account_identifier: AccountIdentifier::new(Address::from_public_key(&key)),
    })
}

/// Parse a Rosetta public key, accepting only secp256k1.
pub(crate) fn public_key(key: &RosettaPublicKey) -> Result<PublicKey, ConstructionError> {
    if key.curve_type != CURVE_TYPE {
        return Err(ConstructionError::UnsupportedCurve(key.curve_type.clone()));
    }
    PublicKey::from_hex(&key.hex_bytes).map_err(ConstructionError::InvalidPublicKey)
}
