//! RPC request handlers and their DTOs.
//!
//! Addresses travel as `0x`-prefixed strings, payloads as `0x`-prefixed hex.
//! Internal types never cross the wire directly.

use crate::error::RpcError;
use crate::state::VaultState;
use axum::extract::{Path, State};
use axum::Json;
use covault_types::{ActionRequest, Address, TxIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ── Submission ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub caller: String,
    pub target: String,
    pub value: u128,
    /// `0x`-prefixed hex call data.
    pub payload: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub index: TxIndex,
}

pub async fn submit(
    State(state): State<Arc<VaultState>>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    let target = parse_address(&req.target)?;
    let payload = parse_payload(&req.payload)?;

    let index = state
        .submit(&caller, ActionRequest::new(target, req.value, payload))
        .await?;
    Ok(Json(SubmitResponse { index }))
}

// ── Voting ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VoteRequest {
    pub caller: String,
    pub index: TxIndex,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub index: TxIndex,
    pub approvals: usize,
    pub rejections: usize,
}

pub async fn approve(
    State(state): State<Arc<VaultState>>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    state.approve(req.index, &caller).await?;
    vote_response(&state, req.index).await
}

pub async fn reject(
    State(state): State<Arc<VaultState>>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    state.reject(req.index, &caller).await?;
    vote_response(&state, req.index).await
}

async fn vote_response(
    state: &VaultState,
    index: TxIndex,
) -> Result<Json<VoteResponse>, RpcError> {
    let (tx, _, _) = state.transaction(index).await?;
    Ok(Json(VoteResponse {
        index,
        approvals: tx.approvals.len(),
        rejections: tx.rejections.len(),
    }))
}

// ── Execution ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExecuteRequest {
    pub caller: String,
    pub index: TxIndex,
}

#[derive(Serialize)]
pub struct ExecuteResponse {
    pub index: TxIndex,
    pub caller: String,
}

pub async fn execute(
    State(state): State<Arc<VaultState>>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    let record = state.execute(req.index, &caller).await?;
    Ok(Json(ExecuteResponse {
        index: record.index,
        caller: record.caller.to_string(),
    }))
}

// ── Queries ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TransactionResponse {
    pub index: TxIndex,
    pub target: String,
    pub value: u128,
    pub payload: String,
    pub executed: bool,
    pub approvals: Vec<String>,
    pub rejections: Vec<String>,
    pub approved: bool,
    pub rejected: bool,
}

pub async fn get_transaction(
    State(state): State<Arc<VaultState>>,
    Path(index): Path<TxIndex>,
) -> Result<Json<TransactionResponse>, RpcError> {
    let (tx, approved, rejected) = state.transaction(index).await?;

    let mut approvals: Vec<String> = tx.approvals.iter().map(|a| a.to_string()).collect();
    let mut rejections: Vec<String> = tx.rejections.iter().map(|a| a.to_string()).collect();
    // Sets carry no order; sort for stable responses.
    approvals.sort();
    rejections.sort();

    Ok(Json(TransactionResponse {
        index: tx.index,
        target: tx.action.target.to_string(),
        value: tx.action.value,
        payload: tx.action.payload_hex(),
        executed: tx.executed,
        approvals,
        rejections,
        approved,
        rejected,
    }))
}

#[derive(Serialize)]
pub struct LastIndexResponse {
    pub index: TxIndex,
}

pub async fn last_index(
    State(state): State<Arc<VaultState>>,
) -> Result<Json<LastIndexResponse>, RpcError> {
    let index = state.last_index().await?;
    Ok(Json(LastIndexResponse { index }))
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub no_pending: bool,
}

pub async fn pending(State(state): State<Arc<VaultState>>) -> Json<PendingResponse> {
    Json(PendingResponse {
        no_pending: state.has_no_pending().await,
    })
}

pub async fn health() -> &'static str {
    "ok"
}

// ── Parsing ──────────────────────────────────────────────────────────────

fn parse_address(raw: &str) -> Result<Address, RpcError> {
    Address::parse(raw)
        .ok_or_else(|| RpcError::InvalidRequest(format!("malformed address: {raw}")))
}

fn parse_payload(raw: &str) -> Result<Vec<u8>, RpcError> {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    if stripped.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(stripped).map_err(|e| RpcError::InvalidRequest(format!("malformed payload: {e}")))
}
