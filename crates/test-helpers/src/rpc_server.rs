// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::MockFheEngine;
use anyhow::{anyhow, Result};
use fhe_oracle::proto::{
    decryption_oracle_server::{DecryptionOracle, DecryptionOracleServer},
    DecryptRequest, DecryptResponse, FheEncrypted, IsNilRequest, IsNilResponse, ReencryptRequest,
    ReencryptResponse,
};
use fhe_oracle_crypto::seal_for_recipient;
use fhe_oracle_engine::FheEngine;
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::{sync::oneshot, task::JoinHandle};
use tonic::{
    transport::{server::TcpIncoming, Server},
    Request, Response, Status,
};
use tracing::{debug, warn};

struct OracleState {
    engine: Arc<MockFheEngine>,
    signature: String,
    calls: AtomicUsize,
}

struct OracleService {
    state: Arc<OracleState>,
}

impl OracleService {
    fn plaintext(&self, method: &str, encrypted: Option<FheEncrypted>) -> Result<u64, Status> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        debug!(method, "rpc oracle call");
        let ciphertext = encrypted
            .ok_or_else(|| Status::invalid_argument("missing ciphertext"))?
            .to_ciphertext();
        self.state
            .engine
            .decrypt(ciphertext.bytes(), ciphertext.uint_type)
            .map_err(|e| Status::failed_precondition(e.to_string()))
    }
}

#[tonic::async_trait]
impl DecryptionOracle for OracleService {
    async fn decrypt(
        &self,
        request: Request<DecryptRequest>,
    ) -> Result<Response<DecryptResponse>, Status> {
        let value = self.plaintext("Decrypt", request.into_inner().encrypted)?;
        Ok(Response::new(DecryptResponse {
            decrypted: value.to_string(),
            signature: self.state.signature.clone(),
        }))
    }

    async fn reencrypt(
        &self,
        request: Request<ReencryptRequest>,
    ) -> Result<Response<ReencryptResponse>, Status> {
        let request = request.into_inner();
        let value = self.plaintext("Reencrypt", request.encrypted)?;
        let recipient = hex::decode(&request.user_public_key)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        let sealed = seal_for_recipient(value, &recipient)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        Ok(Response::new(ReencryptResponse {
            reencrypted: sealed,
            signature: self.state.signature.clone(),
        }))
    }

    async fn assert_is_nil(
        &self,
        request: Request<IsNilRequest>,
    ) -> Result<Response<IsNilResponse>, Status> {
        let value = self.plaintext("AssertIsNil", request.into_inner().encrypted)?;
        Ok(Response::new(IsNilResponse {
            is_nil: value != 0,
            signature: self.state.signature.clone(),
        }))
    }
}

/// In-process `oracle.DecryptionOracle` gRPC server on an ephemeral port,
/// answering from a [`MockFheEngine`].
pub struct RpcOracleServer {
    addr: SocketAddr,
    state: Arc<OracleState>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RpcOracleServer {
    /// Starts serving. An empty `signature` is sent when `None`.
    pub async fn start(engine: Arc<MockFheEngine>, signature: Option<&str>) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let incoming = TcpIncoming::from_listener(listener, true, None)
            .map_err(|e| anyhow!("could not listen for rpc: {e}"))?;

        let state = Arc::new(OracleState {
            engine,
            signature: signature.unwrap_or_default().to_string(),
            calls: AtomicUsize::new(0),
        });
        let service = DecryptionOracleServer::new(OracleService {
            state: state.clone(),
        });

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = Server::builder()
                .add_service(service)
                .serve_with_incoming_shutdown(incoming, async move {
                    let _ = signal.await;
                })
                .await;
            if let Err(err) = served {
                warn!("rpc oracle stopped: {err}");
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown,
            task,
        })
    }

    /// `host:port` without a scheme, as it appears in configuration.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Calls received over all three methods.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}
