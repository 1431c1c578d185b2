//! # Outbound Ports
//!
//! Collaborators the engine drives at commit time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::{CommitReceipt, CommitRequest, DealCandidate, EngineError};

/// On-ramp contract on the source chain - outbound port.
#[async_trait]
pub trait OnRampContract: Send + Sync {
    /// Submit `commitAggregate` and wait until the transaction is mined.
    async fn commit_aggregate(
        &self,
        request: &CommitRequest,
        cancel: &CancellationToken,
    ) -> Result<CommitReceipt, EngineError>;
}

/// Durable remote copy of materialized aggregates - outbound port.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload the file at `path`; returns its public retrieval URL.
    async fn upload(&self, path: &Path) -> Result<String, EngineError>;
}

/// Storage deal proposal for a committed aggregate - outbound port.
#[async_trait]
pub trait DealProposer: Send + Sync {
    /// Propose one deal; any failure is reported as [`EngineError::Deal`].
    async fn propose(
        &self,
        candidate: &DealCandidate,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock on-ramp recording every commit.
#[derive(Clone, Default)]
pub struct MockOnRamp {
    commits: Arc<Mutex<Vec<CommitRequest>>>,
    /// Should fail?
    pub should_fail: bool,
}

impl MockOnRamp {
    /// Commits received so far.
    pub fn commits(&self) -> Vec<CommitRequest> {
        self.commits.lock().clone()
    }
}

#[async_trait]
impl OnRampContract for MockOnRamp {
    async fn commit_aggregate(
        &self,
        request: &CommitRequest,
        _cancel: &CancellationToken,
    ) -> Result<CommitReceipt, EngineError> {
        if self.should_fail {
            return Err(EngineError::Commit("Mock failure".to_string()));
        }
        let mut commits = self.commits.lock();
        commits.push(request.clone());
        Ok(CommitReceipt {
            tx_hash: format!("0x{:064x}", commits.len()),
            block_number: Some(commits.len() as u64),
            success: true,
        })
    }
}

/// Mock remote store handing out gateway-style URLs.
#[derive(Clone, Default)]
pub struct MockRemoteStore {
    uploads: Arc<Mutex<Vec<PathBuf>>>,
    /// Should fail?
    pub should_fail: bool,
}

impl MockRemoteStore {
    /// Files uploaded so far.
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn upload(&self, path: &Path) -> Result<String, EngineError> {
        if self.should_fail {
            return Err(EngineError::Upload("Mock failure".to_string()));
        }
        self.uploads.lock().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("https://gateway.test/ipfs/{}", name))
    }
}

/// Mock deal proposer; rejects every deal when `rejection` is set.
#[derive(Clone, Default)]
pub struct MockDealProposer {
    proposals: Arc<Mutex<Vec<DealCandidate>>>,
    /// Rejection message returned for every proposal.
    pub rejection: Option<String>,
}

impl MockDealProposer {
    /// Proposer rejecting everything with `message`.
    pub fn rejecting(message: &str) -> Self {
        Self {
            rejection: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Proposals received so far.
    pub fn proposals(&self) -> Vec<DealCandidate> {
        self.proposals.lock().clone()
    }
}

#[async_trait]
impl DealProposer for MockDealProposer {
    async fn propose(
        &self,
        candidate: &DealCandidate,
        _cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        self.proposals.lock().push(candidate.clone());
        match &self.rejection {
            Some(message) => Err(EngineError::Deal(format!(
                "deal proposal rejected: {}",
                message
            ))),
            None => Ok(()),
        }
    }
}
