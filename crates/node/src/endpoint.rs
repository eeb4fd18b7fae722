//! HTTP endpoint exposing the ring's public operations.
//!
//! Every operation of the routing surface is a JSON POST route under
//! `/rpc/`, so any peer (or a curious operator with curl) can invoke them
//! by uri.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chordal_core::dht::Chord;
use chordal_core::dht::Ring;

use crate::error::Error;
use crate::error::Result;
use crate::rpc::ActiveResponse;
use crate::rpc::CandidatesRequest;
use crate::rpc::IdResponse;
use crate::rpc::LookupRequest;
use crate::rpc::MaybePeerResponse;
use crate::rpc::NotifyRequest;
use crate::rpc::PeerListResponse;
use crate::rpc::PeerResponse;
use crate::rpc::PredecessorLeavingRequest;
use crate::rpc::SuccessorLeavingRequest;

/// Errors surfaced to remote callers. Anything that is not a clean answer
/// maps to a 500 with the error text; reachability itself is the
/// transport-level signal peers actually act on.
struct HttpError(chordal_core::error::Error);

impl From<chordal_core::error::Error> for HttpError {
    fn from(e: chordal_core::error::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Build the rpc router around a ring.
pub fn router(ring: Arc<Ring>) -> Router {
    Router::new()
        .route("/rpc/node_id", post(node_id))
        .route("/rpc/is_active", post(is_active))
        .route("/rpc/info", post(info))
        .route("/rpc/successor", post(successor))
        .route("/rpc/predecessor", post(predecessor))
        .route("/rpc/successor_list", post(successor_list))
        .route("/rpc/find_successor", post(find_successor))
        .route("/rpc/find_predecessor", post(find_predecessor))
        .route(
            "/rpc/closest_preceding_finger",
            post(closest_preceding_finger),
        )
        .route("/rpc/notify", post(notify))
        .route(
            "/rpc/notify_predecessor_leaving",
            post(notify_predecessor_leaving),
        )
        .route(
            "/rpc/notify_successor_leaving",
            post(notify_successor_leaving),
        )
        .route("/rpc/successor_candidates", post(successor_candidates))
        .with_state(ring)
}

/// Bind the endpoint. Failing to bind is fatal at startup; the serve
/// future runs until the process exits.
pub fn bind(
    addr: SocketAddr,
    ring: Arc<Ring>,
) -> Result<(SocketAddr, impl Future<Output = hyper::Result<()>>)> {
    let server = axum::Server::try_bind(&addr)
        .map_err(|_| Error::AddressInUse(addr))?
        .serve(router(ring).into_make_service());
    let bound = server.local_addr();
    tracing::info!("rpc endpoint listening on http://{}", bound);
    Ok((bound, server))
}

async fn node_id(State(ring): State<Arc<Ring>>) -> Json<IdResponse> {
    Json(IdResponse { id: ring.info.did })
}

async fn is_active(State(ring): State<Arc<Ring>>) -> Json<ActiveResponse> {
    Json(ActiveResponse {
        active: ring.is_active(),
    })
}

async fn info(State(ring): State<Arc<Ring>>) -> Json<PeerResponse> {
    Json(PeerResponse {
        peer: ring.info.clone(),
    })
}

async fn successor(State(ring): State<Arc<Ring>>) -> std::result::Result<Json<PeerResponse>, HttpError> {
    Ok(Json(PeerResponse {
        peer: ring.successor()?,
    }))
}

async fn predecessor(
    State(ring): State<Arc<Ring>>,
) -> std::result::Result<Json<MaybePeerResponse>, HttpError> {
    Ok(Json(MaybePeerResponse {
        peer: ring.lock_predecessor()?.clone(),
    }))
}

async fn successor_list(
    State(ring): State<Arc<Ring>>,
) -> std::result::Result<Json<PeerListResponse>, HttpError> {
    Ok(Json(PeerListResponse {
        peers: ring.lock_successors()?.list(),
    }))
}

async fn find_successor(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<LookupRequest>,
) -> std::result::Result<Json<PeerResponse>, HttpError> {
    Ok(Json(PeerResponse {
        peer: ring.find_successor(req.id).await?,
    }))
}

async fn find_predecessor(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<LookupRequest>,
) -> std::result::Result<Json<PeerResponse>, HttpError> {
    Ok(Json(PeerResponse {
        peer: ring.find_predecessor(req.id).await?,
    }))
}

async fn closest_preceding_finger(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<LookupRequest>,
) -> std::result::Result<Json<PeerResponse>, HttpError> {
    Ok(Json(PeerResponse {
        peer: ring.closest_preceding_finger(req.id).await?,
    }))
}

async fn notify(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<NotifyRequest>,
) -> std::result::Result<Json<()>, HttpError> {
    ring.notify(req.candidate)?;
    Ok(Json(()))
}

async fn notify_predecessor_leaving(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<PredecessorLeavingRequest>,
) -> std::result::Result<Json<()>, HttpError> {
    ring.notify_predecessor_leaving(req.node, req.new_predecessor)?;
    Ok(Json(()))
}

async fn notify_successor_leaving(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<SuccessorLeavingRequest>,
) -> std::result::Result<Json<()>, HttpError> {
    ring.notify_successor_leaving(req.node, req.successors)?;
    Ok(Json(()))
}

async fn successor_candidates(
    State(ring): State<Arc<Ring>>,
    Json(req): Json<CandidatesRequest>,
) -> std::result::Result<Json<PeerListResponse>, HttpError> {
    Ok(Json(PeerListResponse {
        peers: ring.successor_candidates(req.id, req.max).await?,
    }))
}
