//! Per-connection session: registry binding, lifecycle and correlation
//!
//! A [`Session`] owns one [`ToolRegistry`] and moves through
//! `Connecting -> Open -> Closed`. Frames are only processed while `Open`;
//! anything arriving later is dropped.
//!
//! [`Session::spawn`] starts a driver task that reads inbound frames from a
//! channel and runs each request as its own task, so independent tool calls
//! interleave freely and replies leave in completion order. Every reply
//! carries the id of the request that produced it. At most
//! [`DEFAULT_MAX_IN_FLIGHT`] requests run at once (see
//! [`Session::spawn_with_limit`]), and a request reusing the id of one that
//! is still running is refused.
//!
//! Closing is explicit ([`Session::close`], e.g. when an SSE stream is
//! dropped) or happens when the inbound channel ends. An explicit close
//! aborts in-flight calls, which drops their pending remote requests. An
//! ended inbound channel is a half-close: calls already running finish and
//! their replies are still delivered.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{internal_error, invalid_request, method_not_found, McpResult};
use crate::protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse, RequestId, ServerIdentity};
use crate::registry::{ToolInvocation, ToolRegistry};
use crate::result::error_result;

/// Capacity of the inbound and outbound frame channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Requests one session runs concurrently before it stops reading frames
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

impl SessionState {
    fn as_u8(self) -> u8 {
        match self {
            SessionState::Connecting => 0,
            SessionState::Open => 1,
            SessionState::Closed => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Connecting,
            1 => SessionState::Open,
            _ => SessionState::Closed,
        }
    }
}

struct SessionInner {
    id: String,
    registry: Arc<ToolRegistry>,
    identity: Arc<ServerIdentity>,
    state: AtomicU8,
    cancel: CancellationToken,
}

/// Cheaply cloneable handle to one client session
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

/// Channel ends returned by [`Session::spawn`]
pub struct SessionChannel {
    pub session: Session,
    /// Frames from the client
    pub inbound: mpsc::Sender<String>,
    /// Serialized replies for the client
    pub outbound: mpsc::Receiver<String>,
}

type ActiveIds = Arc<Mutex<HashSet<RequestId>>>;

/// A request id reserved for one running request; released on drop, so an
/// aborted or panicked task frees its id too
struct ClaimedId {
    active: ActiveIds,
    id: RequestId,
}

impl ClaimedId {
    fn claim(active: &ActiveIds, id: RequestId) -> Result<Self, RequestId> {
        if !lock(active).insert(id.clone()) {
            return Err(id);
        }
        Ok(Self {
            active: Arc::clone(active),
            id,
        })
    }
}

impl Drop for ClaimedId {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.id);
    }
}

fn lock(active: &ActiveIds) -> MutexGuard<'_, HashSet<RequestId>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(registry: ToolRegistry, identity: Arc<ServerIdentity>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: uuid::Uuid::new_v4().to_string(),
                registry: Arc::new(registry),
                identity,
                state: AtomicU8::new(SessionState::Connecting.as_u8()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.inner.registry
    }

    /// Token cancelled when the session closes
    pub fn cancellation(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Move from `Connecting` to `Open`; a closed session stays closed
    pub fn open(&self) {
        if self
            .inner
            .state
            .compare_exchange(
                SessionState::Connecting.as_u8(),
                SessionState::Open.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            debug!(session_id = %self.id(), "session open");
        }
    }

    /// Enter `Closed` and cancel in-flight work. Idempotent.
    pub fn close(&self) {
        let previous = self
            .inner
            .state
            .swap(SessionState::Closed.as_u8(), Ordering::AcqRel);
        if previous != SessionState::Closed.as_u8() {
            self.inner.cancel.cancel();
            debug!(session_id = %self.id(), "session closing");
        }
    }

    /// Process one raw frame, returning the serialized reply if there is one
    ///
    /// Malformed frames and frames for a session that is not open are
    /// logged and dropped. Notifications never produce a reply.
    pub async fn handle_frame(&self, frame: &str) -> Option<String> {
        let request = self.decode(frame)?;
        let response = self.handle_request(request).await?;
        self.encode(response)
    }

    /// Answer one decoded message
    ///
    /// Anything other than a `"2.0"` envelope is refused with `-32600`,
    /// or dropped when it carries no id.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if !request.is_v2() {
            warn!(session_id = %self.id(), version = %request.jsonrpc, "unsupported jsonrpc version");
            let message = format!("unsupported jsonrpc version: {}", request.jsonrpc);
            return request
                .id
                .map(|id| JsonRpcResponse::from_outcome(id, Err(invalid_request(message))));
        }

        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        let Some(id) = id else {
            debug!(session_id = %self.id(), %method, "notification");
            return None;
        };

        let outcome = match method.as_str() {
            "initialize" => Ok(self.inner.identity.initialize_result(params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(&id, params).await,
            other => Err(method_not_found(other)),
        };

        Some(JsonRpcResponse::from_outcome(id, outcome))
    }

    fn decode(&self, frame: &str) -> Option<JsonRpcRequest> {
        if self.state() != SessionState::Open {
            debug!(session_id = %self.id(), state = ?self.state(), "dropping frame");
            return None;
        }

        match serde_json::from_str(frame) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!(session_id = %self.id(), error = %e, "dropping malformed frame");
                None
            }
        }
    }

    fn encode(&self, response: JsonRpcResponse) -> Option<String> {
        if self.is_closed() {
            debug!(session_id = %self.id(), id = %response.id, "session closed, reply dropped");
            return None;
        }

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                error!(session_id = %self.id(), error = %e, "failed to serialize reply");
                None
            }
        }
    }

    async fn deliver(&self, response: JsonRpcResponse, outbound: &mpsc::Sender<String>) {
        if let Some(reply) = self.encode(response) {
            if outbound.send(reply).await.is_err() {
                debug!(session_id = %self.id(), "outbound channel gone, reply dropped");
            }
        }
    }

    fn list_tools(&self) -> McpResult<Value> {
        let tools = serde_json::to_value(self.inner.registry.definitions())
            .map_err(|e| internal_error(e.to_string()))?;
        Ok(json!({ "tools": tools }))
    }

    async fn call_tool(&self, id: &RequestId, params: Option<Value>) -> McpResult<Value> {
        let result = match params.map(serde_json::from_value::<CallToolParams>) {
            Some(Ok(params)) => {
                let invocation =
                    ToolInvocation::new(params.name, params.arguments.unwrap_or_default())
                        .with_correlation_id(id.to_string());
                self.inner.registry.dispatch(invocation).await
            }
            Some(Err(e)) => error_result(format!("Invalid tools/call params: {}", e)),
            None => error_result("Invalid tools/call params: params are required"),
        };
        serde_json::to_value(result).map_err(|e| internal_error(e.to_string()))
    }

    /// Open the session and start its driver task
    pub fn spawn(self, capacity: usize) -> SessionChannel {
        self.spawn_with_limit(capacity, DEFAULT_MAX_IN_FLIGHT)
    }

    /// Like [`Session::spawn`], running at most `max_in_flight` requests
    /// at once. Further frames wait in the inbound channel.
    pub fn spawn_with_limit(self, capacity: usize, max_in_flight: usize) -> SessionChannel {
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);

        self.open();
        tokio::spawn(
            self.clone()
                .drive(inbound_rx, outbound_tx, max_in_flight.max(1)),
        );

        SessionChannel {
            session: self,
            inbound: inbound_tx,
            outbound: outbound_rx,
        }
    }

    async fn drive(
        self,
        mut inbound: mpsc::Receiver<String>,
        outbound: mpsc::Sender<String>,
        max_in_flight: usize,
    ) {
        let cancel = self.cancellation();
        let active = Arc::new(Mutex::new(HashSet::new()));
        let mut in_flight = JoinSet::new();
        let mut inbound_open = true;

        loop {
            if !inbound_open && in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    self.log_join(joined);
                }
                frame = inbound.recv(), if inbound_open && in_flight.len() < max_in_flight => match frame {
                    Some(frame) => {
                        if let Some(request) = self.decode(&frame) {
                            self.start(request, &active, &outbound, &mut in_flight);
                        }
                    }
                    None => {
                        debug!(session_id = %self.id(), "inbound channel ended");
                        inbound_open = false;
                    }
                },
            }
        }

        let abandoned = in_flight.len();
        self.close();
        in_flight.abort_all();
        info!(session_id = %self.id(), abandoned, "session closed");
    }

    /// Run one request as its own task. An id already in flight is
    /// refused with `-32600` and the running request is left alone.
    fn start(
        &self,
        request: JsonRpcRequest,
        active: &ActiveIds,
        outbound: &mpsc::Sender<String>,
        in_flight: &mut JoinSet<()>,
    ) {
        let claim = match request.id.clone() {
            Some(id) => match ClaimedId::claim(active, id) {
                Ok(claim) => Some(claim),
                Err(id) => {
                    warn!(session_id = %self.id(), %id, "request id already in flight");
                    let message = format!("request id {} is already in flight", id);
                    let response = JsonRpcResponse::from_outcome(id, Err(invalid_request(message)));
                    let session = self.clone();
                    let outbound = outbound.clone();
                    in_flight.spawn(async move { session.deliver(response, &outbound).await });
                    return;
                }
            },
            None => None,
        };

        let session = self.clone();
        let outbound = outbound.clone();
        in_flight.spawn(async move {
            let response = session.handle_request(request).await;
            drop(claim);
            if let Some(response) = response {
                session.deliver(response, &outbound).await;
            }
        });
    }

    fn log_join(&self, joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            if e.is_panic() {
                error!(session_id = %self.id(), "request task panicked");
            }
        }
    }
}
