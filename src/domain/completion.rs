use super::operation::{OperationKind, RequestCode};
use crate::error::{BridgeError, Result};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// The settling half of a pending call.
///
/// `settle` and `reject` consume the handle, so a call settles at most once.
#[derive(Debug)]
pub struct Completion<T> {
    tx: oneshot::Sender<Result<T>>,
}

/// The caller's half of a pending call.
#[derive(Debug)]
pub struct PendingOutcome<T> {
    kind: OperationKind,
    request_code: RequestCode,
    rx: oneshot::Receiver<Result<T>>,
}

/// Creates a linked completion handle and pending outcome.
pub fn completion<T>(kind: OperationKind, request_code: RequestCode) -> (Completion<T>, PendingOutcome<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Completion { tx },
        PendingOutcome {
            kind,
            request_code,
            rx,
        },
    )
}

impl<T> Completion<T> {
    /// Returns `false` when the caller is no longer waiting.
    pub fn reject(self, error: BridgeError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    pub fn settle(self, result: Result<T>) -> bool {
        self.tx.send(result).is_ok()
    }
}

impl<T> PendingOutcome<T> {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn request_code(&self) -> RequestCode {
        self.request_code
    }

    /// Waits for the call to settle.
    pub async fn wait(self) -> Result<T> {
        self.rx.await.unwrap_or(Err(BridgeError::Dropped))
    }

    /// Returns the settlement if it has already happened.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(BridgeError::Dropped)),
        }
    }
}
