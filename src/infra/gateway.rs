//! Lazy, single-flight store connection shared by the whole process.
//!
//! The gateway owns the lifecycle `{uninitialized, connecting, ready,
//! failed}` of one store handle. Whoever calls [`StoreGateway::acquire`]
//! first starts the establishment attempt; everyone arriving while it is in
//! flight awaits that same attempt. A failure clears the in-flight slot so
//! a later call can retry. With `await_connection` disabled the caller is
//! never blocked: the attempt runs in the background and requests observe
//! [`InfraError::StoreNotReady`] until the handle is ready.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::infra::error::InfraError;

pub type ConnectFuture<T> = BoxFuture<'static, Result<T, Arc<InfraError>>>;
type SharedAttempt<T> = Shared<ConnectFuture<T>>;

/// Produces one connection attempt. Called at most once per establishment
/// cycle, however many callers are waiting on the result.
pub trait Connector<T>: Send + Sync + 'static {
    fn connect(&self) -> ConnectFuture<T>;
}

impl<T, F> Connector<T> for F
where
    F: Fn() -> ConnectFuture<T> + Send + Sync + 'static,
{
    fn connect(&self) -> ConnectFuture<T> {
        (self)()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Uninitialized,
    Connecting,
    Ready,
    Failed,
}

impl GatewayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GatewayStatus::Uninitialized => "uninitialized",
            GatewayStatus::Connecting => "connecting",
            GatewayStatus::Ready => "ready",
            GatewayStatus::Failed => "failed",
        }
    }
}

enum State<T> {
    Idle { last_error: Option<Arc<InfraError>> },
    Connecting(SharedAttempt<T>),
    Ready(T),
}

pub struct StoreGateway<T>
where
    T: Clone + Send + Sync + 'static,
{
    connector: Box<dyn Connector<T>>,
    await_connection: bool,
    state: Arc<Mutex<State<T>>>,
}

impl<T> StoreGateway<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(connector: impl Connector<T>, await_connection: bool) -> Self {
        Self {
            connector: Box::new(connector),
            await_connection,
            state: Arc::new(Mutex::new(State::Idle { last_error: None })),
        }
    }

    /// Hand out the shared store handle, establishing it on first use.
    pub async fn acquire(&self) -> Result<T, InfraError> {
        let attempt = {
            let mut state = self.state.lock().await;
            match &*state {
                State::Ready(handle) => return Ok(handle.clone()),
                State::Connecting(attempt) => attempt.clone(),
                State::Idle { .. } => {
                    let attempt = self.spawn_attempt();
                    *state = State::Connecting(attempt.clone());
                    attempt
                }
            }
        };

        if !self.await_connection {
            return Err(InfraError::StoreNotReady);
        }

        match attempt.clone().await {
            Ok(handle) => Ok(handle),
            Err(error) => {
                self.clear_failed_attempt(&attempt, &error).await;
                Err(clone_error(&error))
            }
        }
    }

    pub async fn status(&self) -> GatewayStatus {
        match &*self.state.lock().await {
            State::Idle { last_error: None } => GatewayStatus::Uninitialized,
            State::Idle { last_error: Some(_) } => GatewayStatus::Failed,
            State::Connecting(_) => GatewayStatus::Connecting,
            State::Ready(_) => GatewayStatus::Ready,
        }
    }

    fn spawn_attempt(&self) -> SharedAttempt<T> {
        counter!("hottake_store_connect_attempts_total").increment(1);
        info!(target = "hottake::gateway", "establishing store connection");

        let attempt = self.connector.connect().shared();

        // The monitor drives the attempt even when no caller awaits it
        // (fire-and-forget mode) and records the terminal state.
        let state = Arc::clone(&self.state);
        let monitored = attempt.clone();
        tokio::spawn(async move {
            match monitored.clone().await {
                Ok(handle) => {
                    info!(target = "hottake::gateway", "store connection ready");
                    *state.lock().await = State::Ready(handle);
                }
                Err(error) => {
                    warn!(
                        target = "hottake::gateway",
                        error = %error,
                        "store connection failed"
                    );
                    let mut state = state.lock().await;
                    if let State::Connecting(current) = &*state {
                        if current.ptr_eq(&monitored) {
                            *state = State::Idle {
                                last_error: Some(error),
                            };
                        }
                    }
                }
            }
        });

        attempt
    }

    /// Clear the in-flight slot if it still holds the attempt that failed,
    /// so the next caller retries instead of re-awaiting a dead future.
    async fn clear_failed_attempt(&self, attempt: &SharedAttempt<T>, error: &Arc<InfraError>) {
        let mut state = self.state.lock().await;
        if let State::Connecting(current) = &*state {
            if current.ptr_eq(attempt) {
                *state = State::Idle {
                    last_error: Some(Arc::clone(error)),
                };
            }
        }
    }
}

fn clone_error(error: &InfraError) -> InfraError {
    match error {
        InfraError::Io(err) => InfraError::database(err.to_string()),
        InfraError::Database { message } => InfraError::database(message.clone()),
        InfraError::StoreNotReady => InfraError::StoreNotReady,
        InfraError::Telemetry(message) => InfraError::telemetry(message.clone()),
        InfraError::Configuration { message } => InfraError::configuration(message.clone()),
    }
}
