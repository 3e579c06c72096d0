//! Metadata: fill in nonce and gas from the node.
//!
//! The only construction stage besides submit that talks to the chain.
//! Values the caller pinned during preprocess are used as given.

use num_bigint::BigUint;
use tracing::debug;

use super::builder::ActionBuilder;
use super::intent::ConstructionIntent;
use super::types::{ConstructionMetadata, MetadataRequest, MetadataResponse};
use super::ConstructionError;
use crate::action::Action;
use crate::client::ChainClient;
use crate::config::FEE_MULTIPLIER_SCALE;
use crate::crypto::PrivateKey;
use crate::ledger::{Amount, Currency};

pub async fn metadata(
    client: &dyn ChainClient,
    req: &MetadataRequest,
    currency: &Currency,
    chain_id: u32,
) -> Result<MetadataResponse, ConstructionError> {
    let intent = &req.options;

    let nonce = match intent.nonce {
        Some(nonce) => nonce,
        None => {
            client
                .get_account(&intent.sender)
                .await
                .map_err(ConstructionError::Nonce)?
                .pending_nonce
        }
    };

    let gas_price = match intent.gas_price {
        Some(price) => price,
        None => {
            let suggested = client
                .suggest_gas_price()
                .await
                .map_err(ConstructionError::SuggestGasPrice)?;
            match intent.fee_multiplier {
                Some(multiplier) => apply_multiplier(suggested, multiplier)?,
                None => suggested,
            }
        }
    };

    let gas_limit = match intent.gas_limit {
        Some(limit) => limit,
        None => client
            .estimate_gas(&draft_action(intent, nonce, gas_price, chain_id))
            .await
            .map_err(ConstructionError::EstimateGas)?,
    };

    let fee = BigUint::from(gas_price) * BigUint::from(gas_limit);
    if let Some(max_fee) = &intent.max_fee {
        // Negative caps are refused in preprocess; treat one here as zero.
        let max = max_fee.value.to_biguint().unwrap_or_default();
        if fee > max {
            return Err(ConstructionError::ExceededFee { fee, max });
        }
    }

    debug!(
        sender = %intent.sender,
        nonce,
        gas_limit,
        gas_price,
        "construction metadata"
    );
    Ok(MetadataResponse {
        metadata: ConstructionMetadata {
            nonce,
            gas_limit,
            gas_price,
        },
        suggested_fee: vec![Amount::new(fee, currency)],
    })
}

/// A transfer signed by a throwaway key, good enough for gas estimation.
fn draft_action(intent: &ConstructionIntent, nonce: u64, gas_price: u64, chain_id: u32) -> Action {
    let amount = intent.amount.value.to_biguint().unwrap_or_default();
    let core = ActionBuilder::new(chain_id)
        .nonce(nonce)
        .gas_price(gas_price)
        .transfer(&intent.recipient, &amount)
        .build();
    let key = PrivateKey::generate();
    let signature = key.sign(&core.signing_digest());
    Action {
        core: Some(core),
        sender_pub_key: key.public_key().to_uncompressed().to_vec(),
        signature: signature.as_bytes().to_vec(),
    }
}

/// Scale a gas price by `multiplier` in micro-unit fixed point, rounding up.
fn apply_multiplier(price: u64, multiplier: f64) -> Result<u64, ConstructionError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(ConstructionError::InvalidInput(format!(
            "suggested_fee_multiplier must be a positive number, got {multiplier}"
        )));
    }
    let scale = u128::from(FEE_MULTIPLIER_SCALE);
    // Float to int casts saturate; the checked multiply catches the rest.
    let factor = (multiplier * FEE_MULTIPLIER_SCALE as f64).ceil() as u128;
    let scaled = u128::from(price)
        .checked_mul(factor)
        .map(|v| v.div_ceil(scale))
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| {
            ConstructionError::InvalidGasPrice(format!("{price} x {multiplier} overflows"))
        })?;
    Ok(scaled)
}
