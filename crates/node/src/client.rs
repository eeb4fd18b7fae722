//! HTTP implementation of the remote invocation adapter.
//!
//! One [HttpClient] serves a whole node; targets are addressed per call by
//! uri. Connect failures and timeouts map to
//! [Unreachable](chordal_core::error::Error::Unreachable), which is the
//! signal routing reads as "peer dead"; an HTTP-level error answer maps to
//! a distinct application error because the peer evidently is alive.

use std::time::Duration;

use async_trait::async_trait;
use chordal_core::dht::Did;
use chordal_core::dht::PeerInfo;
use chordal_core::error::Error as RingError;
use chordal_core::error::Result as RingResult;
use chordal_core::transport::NodeClient;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::rpc::ActiveResponse;
use crate::rpc::CandidatesRequest;
use crate::rpc::IdResponse;
use crate::rpc::LookupRequest;
use crate::rpc::MaybePeerResponse;
use crate::rpc::Method;
use crate::rpc::NotifyRequest;
use crate::rpc::PeerListResponse;
use crate::rpc::PeerResponse;
use crate::rpc::PredecessorLeavingRequest;
use crate::rpc::SuccessorLeavingRequest;

/// A [NodeClient] that tunnels the ring's operations over HTTP JSON.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::HttpClientBuild(e.to_string()))?;
        Ok(Self { inner })
    }

    async fn post<Req, Resp>(&self, uri: &str, method: Method, body: &Req) -> RingResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/rpc/{}", uri.trim_end_matches('/'), method);
        let response = self
            .inner
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    RingError::Unreachable
                } else {
                    RingError::Rpc(e.to_string())
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RingError::Rpc(format!("{method} -> {status}: {text}")));
        }
        response
            .json()
            .await
            .map_err(|e| RingError::Rpc(e.to_string()))
    }
}

#[async_trait]
impl NodeClient for HttpClient {
    async fn node_id(&self, uri: &str) -> RingResult<Did> {
        let resp: IdResponse = self.post(uri, Method::NodeId, &()).await?;
        Ok(resp.id)
    }

    async fn is_active(&self, uri: &str) -> RingResult<bool> {
        let resp: ActiveResponse = self.post(uri, Method::IsActive, &()).await?;
        Ok(resp.active)
    }

    async fn info(&self, uri: &str) -> RingResult<PeerInfo> {
        let resp: PeerResponse = self.post(uri, Method::Info, &()).await?;
        Ok(resp.peer)
    }

    async fn successor(&self, uri: &str) -> RingResult<PeerInfo> {
        let resp: PeerResponse = self.post(uri, Method::Successor, &()).await?;
        Ok(resp.peer)
    }

    async fn predecessor(&self, uri: &str) -> RingResult<Option<PeerInfo>> {
        let resp: MaybePeerResponse = self.post(uri, Method::Predecessor, &()).await?;
        Ok(resp.peer)
    }

    async fn successor_list(&self, uri: &str) -> RingResult<Vec<PeerInfo>> {
        let resp: PeerListResponse = self.post(uri, Method::SuccessorList, &()).await?;
        Ok(resp.peers)
    }

    async fn find_successor(&self, uri: &str, id: Did) -> RingResult<PeerInfo> {
        let resp: PeerResponse = self
            .post(uri, Method::FindSuccessor, &LookupRequest { id })
            .await?;
        Ok(resp.peer)
    }

    async fn find_predecessor(&self, uri: &str, id: Did) -> RingResult<PeerInfo> {
        let resp: PeerResponse = self
            .post(uri, Method::FindPredecessor, &LookupRequest { id })
            .await?;
        Ok(resp.peer)
    }

    async fn closest_preceding_finger(&self, uri: &str, id: Did) -> RingResult<PeerInfo> {
        let resp: PeerResponse = self
            .post(uri, Method::ClosestPrecedingFinger, &LookupRequest { id })
            .await?;
        Ok(resp.peer)
    }

    async fn notify(&self, uri: &str, candidate: PeerInfo) -> RingResult<()> {
        self.post(uri, Method::Notify, &NotifyRequest { candidate })
            .await
    }

    async fn notify_predecessor_leaving(
        &self,
        uri: &str,
        node: PeerInfo,
        new_predecessor: Option<PeerInfo>,
    ) -> RingResult<()> {
        self.post(
            uri,
            Method::NotifyPredecessorLeaving,
            &PredecessorLeavingRequest {
                node,
                new_predecessor,
            },
        )
        .await
    }

    async fn notify_successor_leaving(
        &self,
        uri: &str,
        node: PeerInfo,
        successors: Vec<PeerInfo>,
    ) -> RingResult<()> {
        self.post(
            uri,
            Method::NotifySuccessorLeaving,
            &SuccessorLeavingRequest { node, successors },
        )
        .await
    }

    async fn successor_candidates(
        &self,
        uri: &str,
        id: Did,
        max: usize,
    ) -> RingResult<Vec<PeerInfo>> {
        let resp: PeerListResponse = self
            .post(uri, Method::SuccessorCandidates, &CandidatesRequest { id, max })
            .await?;
        Ok(resp.peers)
    }
}
