//! Combine: attach an externally produced signature.

use super::derive::public_key;
use super::types::{CombineRequest, CombineResponse};
use super::ConstructionError;
use crate::action::{Action, UnsignedAction};
use crate::crypto::Signature;
use crate::identity::Address;

pub fn combine(req: &CombineRequest) -> Result<CombineResponse, ConstructionError> {
    let [signature] = req.signatures.as_slice() else {
        return Err(ConstructionError::InvalidInput(format!(
            "need exactly 1 signature, got {}",
            req.signatures.len()
        )));
    };

    let unsigned =
        UnsignedAction::from_hex(&req.unsigned_transaction).map_err(ConstructionError::Unmarshal)?;
    let core = unsigned.decode_core().map_err(ConstructionError::Unmarshal)?;
    let sender = unsigned
        .sender_address()
        .map_err(ConstructionError::Unmarshal)?;

    let signer = public_key(&signature.public_key)?;
    if Address::from_public_key(&signer) != sender {
        return Err(ConstructionError::InvalidSignature(format!(
            "public key does not belong to sender {sender}"
        )));
    }

    let bytes = hex::decode(signature.hex_bytes.trim_start_matches("0x"))
        .map_err(|e| ConstructionError::InvalidSignature(e.to_string()))?;
    let signature = Signature::from_bytes_for_signer(&bytes, &core.signing_digest(), &signer)
        .map_err(|e| ConstructionError::InvalidSignature(e.to_string()))?;

    let action = Action {
        core: Some(core),
        sender_pub_key: signer.to_uncompressed().to_vec(),
        signature: signature.as_bytes().to_vec(),
    };
    Ok(CombineResponse {
        signed_transaction: action.to_hex(),
    })
}
