//! Hash and submit signed actions.

use tracing::{info, warn};

use super::types::{SignedTransactionRequest, TransactionIdentifierResponse};
use super::ConstructionError;
use crate::action::Action;
use crate::client::ChainClient;
use crate::ledger::TransactionIdentifier;

pub fn hash(
    req: &SignedTransactionRequest,
) -> Result<TransactionIdentifierResponse, ConstructionError> {
    let action = Action::from_hex(&req.signed_transaction).map_err(ConstructionError::Parse)?;
    Ok(identifier(action.hash().to_string()))
}

/// Broadcast a signed action. The signature is checked first so the node
/// never sees an envelope this gateway would refuse to parse.
pub async fn submit(
    client: &dyn ChainClient,
    req: &SignedTransactionRequest,
) -> Result<TransactionIdentifierResponse, ConstructionError> {
    let action = Action::from_hex(&req.signed_transaction).map_err(ConstructionError::Parse)?;
    action
        .verify_signature()
        .map_err(|e| ConstructionError::InvalidSignature(e.to_string()))?;
    let local = action.hash().to_string();

    let hash = match client
        .submit_action(&action)
        .await
        .map_err(ConstructionError::Submit)?
    {
        Some(remote) if !remote.is_empty() => {
            if remote != local {
                warn!(local = %local, remote = %remote, "node reported a different action hash");
            }
            remote
        }
        _ => local,
    };

    info!(action_hash = %hash, "submitted action");
    Ok(identifier(hash))
}

fn identifier(hash: String) -> TransactionIdentifierResponse {
    TransactionIdentifierResponse {
        transaction_identifier: TransactionIdentifier { hash },
    }
}
