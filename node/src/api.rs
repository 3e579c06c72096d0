//! # Rosetta HTTP API
//!
//! Builds the axum router for the Rosetta data and construction endpoints.
//! Every endpoint except `/health` is `POST` with a JSON body and answers
//! errors with status 500 and a catalog [`ErrorBody`].
//!
//! ## Endpoints
//!
//! | Path                         | Needs node |
//! |------------------------------|------------|
//! | `/network/list`              | no         |
//! | `/network/options`           | optional   |
//! | `/network/status`            | yes        |
//! | `/account/balance`           | yes        |
//! | `/block`                     | yes        |
//! | `/block/transaction`         | yes        |
//! | `/mempool`                   | yes        |
//! | `/mempool/transaction`       | no (13)    |
//! | `/construction/derive`       | no         |
//! | `/construction/preprocess`   | no         |
//! | `/construction/metadata`     | yes        |
//! | `/construction/payloads`     | no         |
//! | `/construction/combine`      | no         |
//! | `/construction/parse`        | no         |
//! | `/construction/hash`         | no         |
//! | `/construction/submit`       | yes        |
//! | `GET /health`                | no         |
//!
//! Without a [`ChainClient`] the gateway runs in offline mode and the
//! node-backed endpoints answer with the retriable `UnableToReachNode`.

use axum::{
    async_trait,
    extract::{FromRequest, MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use iotex_rosetta::client::{ChainClient, ClientError};
use iotex_rosetta::config::FALLBACK_NODE_VERSION;
use iotex_rosetta::construction::{
    CombineRequest, CombineResponse, Constructor, DeriveRequest, DeriveResponse, MetadataRequest,
    MetadataResponse, ParseRequest, ParseResponse, PayloadsRequest, PayloadsResponse,
    PreprocessRequest, PreprocessResponse, SignedTransactionRequest,
    TransactionIdentifierResponse,
};
use iotex_rosetta::error::{catalog, ApiError, ErrorBody, ErrorCode};
use iotex_rosetta::identity::Address;
use iotex_rosetta::ledger::{
    fetch_account_balance, fetch_block, fetch_block_transaction, Amount, Block, BlockIdentifier,
    LedgerContext, OperationStatus, OperationType, Transaction, TransactionIdentifier,
};

use crate::config::GatewayConfig;
use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared state for every handler. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    /// `None` runs the gateway in offline mode.
    pub client: Option<Arc<dyn ChainClient>>,
    pub constructor: Arc<Constructor>,
    pub ledger: Arc<LedgerContext>,
    pub metrics: SharedMetrics,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        client: Option<Arc<dyn ChainClient>>,
        metrics: SharedMetrics,
    ) -> Self {
        let constructor = Constructor::new(config.currency(), config.network.chain_id);
        let ledger = config.ledger_context();
        Self {
            config: Arc::new(config),
            client,
            constructor: Arc::new(constructor),
            ledger: Arc::new(ledger),
            metrics,
        }
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&dyn ChainClient, ApiError> {
        self.client.as_deref().ok_or_else(|| {
            ApiError::with_details(
                ErrorCode::UnableToReachNode,
                "gateway is running in offline mode",
            )
        })
    }

    /// Reject requests addressed to another chain.
    fn check_network(&self, id: Option<&NetworkIdentifier>) -> Result<(), ApiError> {
        let id = id.ok_or_else(|| ApiError::new(ErrorCode::MissingNetworkIdentifier))?;
        let network = &self.config.network;
        if id.blockchain != network.blockchain {
            return Err(ApiError::with_details(
                ErrorCode::InvalidBlockchain,
                &id.blockchain,
            ));
        }
        if id.sub_network_identifier.is_some() {
            return Err(ApiError::new(ErrorCode::InvalidSubnetwork));
        }
        if id.network != network.network {
            return Err(ApiError::with_details(ErrorCode::InvalidNetwork, &id.network));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors and extraction
// ---------------------------------------------------------------------------

/// An [`ApiError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct RosettaError(pub ApiError);

impl<E: Into<ApiError>> From<E> for RosettaError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for RosettaError {
    fn into_response(self) -> Response {
        let code = self.0.code;
        if self.0.retriable() {
            tracing::warn!(code = code.code(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = code.code(), error = %self.0, "request rejected");
        }
        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(self.0.body())).into_response();
        response.extensions_mut().insert(code);
        response
    }
}

type ApiResult<T> = Result<Json<T>, RosettaError>;

/// `Json` whose rejections are reported as catalog errors.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RosettaError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(RosettaError(ApiError::with_details(
                ErrorCode::InvalidInputParam,
                rejection.body_text(),
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentifier {
    pub blockchain: String,
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_network_identifier: Option<Value>,
}

/// A request body plus the network it is addressed to.
#[derive(Debug, Deserialize)]
pub struct Networked<T> {
    #[serde(default)]
    pub network_identifier: Option<NetworkIdentifier>,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct Empty {}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkListResponse {
    pub network_identifiers: Vec<NetworkIdentifier>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Version {
    pub rosetta_version: String,
    pub node_version: String,
    pub middleware_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: String,
    pub successful: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Allow {
    pub operation_statuses: Vec<StatusEntry>,
    pub operation_types: Vec<String>,
    pub errors: Vec<ErrorBody>,
    pub historical_balance_lookup: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkOptionsResponse {
    pub version: Version,
    pub allow: Allow,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkStatusResponse {
    pub current_block_identifier: BlockIdentifier,
    /// Milliseconds since the Unix epoch.
    pub current_block_timestamp: i64,
    pub genesis_block_identifier: BlockIdentifier,
    pub peers: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AccountRef {
    pub address: String,
    #[serde(default)]
    pub sub_account: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AccountBalanceRequest {
    pub account_identifier: AccountRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountBalanceResponse {
    pub block_identifier: BlockIdentifier,
    pub balances: Vec<Amount>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialBlockIdentifier {
    #[serde(default)]
    pub index: Option<u64>,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    #[serde(default)]
    pub block_identifier: PartialBlockIdentifier,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockResponse {
    pub block: Block,
}

#[derive(Debug, Deserialize)]
pub struct BlockTransactionRequest {
    pub block_identifier: BlockIdentifier,
    pub transaction_identifier: TransactionIdentifier,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockTransactionResponse {
    pub transaction: Transaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MempoolResponse {
    pub transaction_identifiers: Vec<TransactionIdentifier>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the API router with CORS, tracing and per-endpoint metrics.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/network/list", post(network_list))
        .route("/network/options", post(network_options))
        .route("/network/status", post(network_status))
        .route("/account/balance", post(account_balance))
        .route("/block", post(block))
        .route("/block/transaction", post(block_transaction))
        .route("/mempool", post(mempool))
        .route("/mempool/transaction", post(mempool_transaction))
        .route("/construction/derive", post(construction_derive))
        .route("/construction/preprocess", post(construction_preprocess))
        .route("/construction/metadata", post(construction_metadata))
        .route("/construction/payloads", post(construction_payloads))
        .route("/construction/combine", post(construction_combine))
        .route("/construction/parse", post(construction_parse))
        .route("/construction/hash", post(construction_hash))
        .route("/construction/submit", post(construction_submit))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the metrics port.
pub fn metrics_router(metrics: SharedMetrics) -> Router {
    Router::new()
        .route("/metrics", get(crate::metrics::metrics_handler))
        .with_state(metrics)
}

async fn track_requests(
    State(metrics): State<SharedMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    metrics.record_request(&endpoint);

    let response = next.run(request).await;
    if let Some(code) = response.extensions().get::<ErrorCode>() {
        metrics.record_error(&endpoint, code.code());
    }
    response
}

// ---------------------------------------------------------------------------
// Handlers: network
// ---------------------------------------------------------------------------

/// `GET /health`: liveness probe. Reports the mode, never the node.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mode = if state.is_online() { "online" } else { "offline" };
    Json(serde_json::json!({ "status": "ok", "mode": mode }))
}

async fn network_list(State(state): State<AppState>) -> Json<NetworkListResponse> {
    let network = &state.config.network;
    Json(NetworkListResponse {
        network_identifiers: vec![NetworkIdentifier {
            blockchain: network.blockchain.clone(),
            network: network.network.clone(),
            sub_network_identifier: None,
        }],
    })
}

/// Versions, operation vocabulary and the error catalog. Served offline
/// too, with the fallback node version.
async fn network_options(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<Empty>>,
) -> ApiResult<NetworkOptionsResponse> {
    state.check_network(req.network_identifier.as_ref())?;

    let node_version = match &state.client {
        Some(client) => client
            .server_version()
            .await
            .map_err(|e| ApiError::client(ErrorCode::UnableToGetNodeStatus, &e))?
            .filter(|v| !v.is_empty()),
        None => None,
    };

    Ok(Json(NetworkOptionsResponse {
        version: Version {
            rosetta_version: state.config.server.rosetta_version.clone(),
            node_version: node_version.unwrap_or_else(|| FALLBACK_NODE_VERSION.to_string()),
            middleware_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        allow: Allow {
            operation_statuses: OperationStatus::ALL
                .iter()
                .map(|s| StatusEntry {
                    status: s.as_str().to_string(),
                    successful: s.successful(),
                })
                .collect(),
            operation_types: OperationType::ALL
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            errors: catalog(),
            historical_balance_lookup: false,
        },
    }))
}

/// Tip and genesis identifiers. Block 1 is genesis.
async fn network_status(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<Empty>>,
) -> ApiResult<NetworkStatusResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let client = state.client()?;
    let status_err = |e: ClientError| ApiError::client(ErrorCode::UnableToGetNodeStatus, &e);

    let meta = client.get_chain_meta().await.map_err(status_err)?;
    let current = client.get_raw_block(meta.height).await.map_err(status_err)?;
    let genesis = client
        .get_raw_block(1)
        .await
        .map_err(|e| ApiError::client(ErrorCode::UnableToGetGenesisBlock, &e))?;

    Ok(Json(NetworkStatusResponse {
        current_block_identifier: BlockIdentifier {
            index: current.height,
            hash: current.hash,
        },
        current_block_timestamp: current.timestamp_ms,
        genesis_block_identifier: BlockIdentifier {
            index: genesis.height,
            hash: genesis.hash,
        },
        peers: Vec::new(),
    }))
}

// ---------------------------------------------------------------------------
// Handlers: data
// ---------------------------------------------------------------------------

/// Balance at the tip. Historical lookups are not offered.
async fn account_balance(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<AccountBalanceRequest>>,
) -> ApiResult<AccountBalanceResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let account = req.body.account_identifier;
    if account.sub_account.is_some() {
        return Err(ApiError::new(ErrorCode::MustSpecifySubAccount).into());
    }
    let address = Address::parse(&account.address)?;
    let client = state.client()?;

    let balance = fetch_account_balance(client, &address, &state.ledger).await?;

    let mut metadata = Map::new();
    metadata.insert("nonce".into(), balance.nonce.into());

    Ok(Json(AccountBalanceResponse {
        block_identifier: balance.block,
        balances: vec![Amount::new(
            BigInt::from(balance.balance),
            state.constructor.currency(),
        )],
        metadata,
    }))
}

/// Decoded block by index, or the tip when no identifier is given.
async fn block(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<BlockRequest>>,
) -> ApiResult<BlockResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let id = req.body.block_identifier;
    if id.index.is_none() && id.hash.is_some() {
        return Err(ApiError::new(ErrorCode::MustQueryByIndex).into());
    }
    let client = state.client()?;

    let height = match id.index {
        Some(index) => index,
        None => {
            client
                .get_chain_meta()
                .await
                .map_err(|e| ApiError::client(ErrorCode::UnableToGetLatestBlock, &e))?
                .height
        }
    };

    let timer = state.metrics.block_decode_seconds.start_timer();
    let block = fetch_block(client, height, &state.ledger).await?;
    timer.observe_duration();

    tracing::debug!(
        height,
        transactions = block.transactions.len(),
        "served block"
    );
    Ok(Json(BlockResponse { block }))
}

async fn block_transaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<BlockTransactionRequest>>,
) -> ApiResult<BlockTransactionResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let client = state.client()?;
    let transaction = fetch_block_transaction(
        client,
        req.body.block_identifier.index,
        &req.body.transaction_identifier.hash,
        &state.ledger,
    )
    .await?;
    Ok(Json(BlockTransactionResponse { transaction }))
}

/// Every action in the node's pool, identified by hash.
async fn mempool(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<Empty>>,
) -> ApiResult<MempoolResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let client = state.client()?;
    let hashes = client
        .get_mempool()
        .await
        .map_err(|e| ApiError::client(ErrorCode::UnableToGetTransactions, &e))?;
    Ok(Json(MempoolResponse {
        transaction_identifiers: hashes
            .iter()
            .map(|hash| TransactionIdentifier {
                hash: hash.to_string(),
            })
            .collect(),
    }))
}

/// `/mempool` already lists every pooled action; single lookups are not
/// served.
async fn mempool_transaction() -> ApiResult<Value> {
    Err(ApiError::new(ErrorCode::NotImplemented).into())
}

// ---------------------------------------------------------------------------
// Handlers: construction
// ---------------------------------------------------------------------------

async fn construction_derive(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<DeriveRequest>>,
) -> ApiResult<DeriveResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    Ok(Json(state.constructor.derive(&req.body)?))
}

async fn construction_preprocess(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<PreprocessRequest>>,
) -> ApiResult<PreprocessResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    Ok(Json(state.constructor.preprocess(&req.body)?))
}

async fn construction_metadata(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<MetadataRequest>>,
) -> ApiResult<MetadataResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let client = state.client()?;
    Ok(Json(state.constructor.metadata(client, &req.body).await?))
}

async fn construction_payloads(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<PayloadsRequest>>,
) -> ApiResult<PayloadsResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    Ok(Json(state.constructor.payloads(&req.body)?))
}

async fn construction_combine(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<CombineRequest>>,
) -> ApiResult<CombineResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    Ok(Json(state.constructor.combine(&req.body)?))
}

async fn construction_parse(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<ParseRequest>>,
) -> ApiResult<ParseResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    Ok(Json(state.constructor.parse(&req.body)?))
}

async fn construction_hash(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<SignedTransactionRequest>>,
) -> ApiResult<TransactionIdentifierResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    Ok(Json(state.constructor.hash(&req.body)?))
}

async fn construction_submit(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Networked<SignedTransactionRequest>>,
) -> ApiResult<TransactionIdentifierResponse> {
    state.check_network(req.network_identifier.as_ref())?;
    let client = state.client()?;
    Ok(Json(state.constructor.submit(client, &req.body).await?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
