// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::proto::{
    decryption_oracle_client::DecryptionOracleClient, DecryptRequest, FheEncrypted, IsNilRequest,
    ReencryptRequest,
};
use super::{AuthorityClient, Signed};
use crate::AuthorityError;
use async_trait::async_trait;
use fhe_oracle_config::{DEFAULT_ORACLE_ADDRESS, DEFAULT_RPC_TIMEOUT_SECS};
use fhe_oracle_engine::Ciphertext;
use std::{future::Future, sync::Mutex, time::Duration};
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info, warn};

enum ChannelState {
    Idle(Endpoint),
    Ready(DecryptionOracleClient<Channel>),
    Closed,
}

/// Remote decryption oracle reached over gRPC.
///
/// One channel is shared by every call. Each call is a single attempt bounded
/// by the configured timeout.
pub struct RpcAuthority {
    address: String,
    timeout: Duration,
    state: Mutex<ChannelState>,
}

/// Prefixes `http://` when `address` carries no scheme.
pub fn normalize_address(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

fn signature(raw: String) -> Option<String> {
    (!raw.is_empty()).then_some(raw)
}

impl RpcAuthority {
    /// Prepares a channel to `address`. The connection itself is made on the
    /// first call.
    pub fn new(address: Option<&str>, timeout: Duration) -> Result<Self, AuthorityError> {
        let address = normalize_address(address.unwrap_or(DEFAULT_ORACLE_ADDRESS));
        let endpoint = Endpoint::from_shared(address.clone())
            .map_err(|e| AuthorityError::Transport(format!("invalid oracle address: {e}")))?
            .connect_timeout(timeout);
        info!(address = %address, "Creating RPC authority");
        Ok(Self {
            address,
            timeout,
            state: Mutex::new(ChannelState::Idle(endpoint)),
        })
    }

    pub fn with_default_timeout(address: Option<&str>) -> Result<Self, AuthorityError> {
        Self::new(address, Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn client(&self) -> Result<DecryptionOracleClient<Channel>, AuthorityError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AuthorityError::Transport("rpc channel lock poisoned".to_string()))?;
        match &*state {
            ChannelState::Ready(client) => Ok(client.clone()),
            ChannelState::Closed => Err(AuthorityError::Closed),
            ChannelState::Idle(endpoint) => {
                let client = DecryptionOracleClient::new(endpoint.connect_lazy());
                *state = ChannelState::Ready(client.clone());
                Ok(client)
            }
        }
    }

    async fn call<F, Fut, R>(&self, method: &'static str, f: F) -> Result<R, AuthorityError>
    where
        F: FnOnce(DecryptionOracleClient<Channel>) -> Fut,
        Fut: Future<Output = Result<tonic::Response<R>, tonic::Status>>,
    {
        let client = self.client()?;
        match tokio::time::timeout(self.timeout, f(client)).await {
            Ok(Ok(response)) => {
                debug!(method, "RPC call succeeded");
                Ok(response.into_inner())
            }
            Ok(Err(status)) => {
                warn!(method, address = %self.address, "RPC call failed: {status}");
                Err(AuthorityError::Transport(format!(
                    "{method}: {}",
                    status.message()
                )))
            }
            Err(_) => {
                warn!(method, address = %self.address, "RPC call timed out after {:?}", self.timeout);
                Err(AuthorityError::Timeout)
            }
        }
    }
}

#[async_trait]
impl AuthorityClient for RpcAuthority {
    async fn get_require(&self, ciphertext: &Ciphertext) -> Result<Signed<bool>, AuthorityError> {
        let request = IsNilRequest {
            encrypted: Some(FheEncrypted::from(ciphertext)),
        };
        let response = self
            .call("AssertIsNil", |mut client| async move {
                client.assert_is_nil(request).await
            })
            .await?;
        Ok(Signed {
            value: response.is_nil,
            signature: signature(response.signature),
        })
    }

    async fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Signed<String>, AuthorityError> {
        let request = DecryptRequest {
            encrypted: Some(FheEncrypted::from(ciphertext)),
        };
        let response = self
            .call("Decrypt", |mut client| async move {
                client.decrypt(request).await
            })
            .await?;
        Ok(Signed {
            value: response.decrypted,
            signature: signature(response.signature),
        })
    }

    async fn reencrypt(
        &self,
        ciphertext: &Ciphertext,
        recipient: &[u8],
    ) -> Result<Signed<String>, AuthorityError> {
        let request = ReencryptRequest {
            encrypted: Some(FheEncrypted::from(ciphertext)),
            user_public_key: hex::encode(recipient),
        };
        let response = self
            .call("Reencrypt", |mut client| async move {
                client.reencrypt(request).await
            })
            .await?;
        Ok(Signed {
            value: response.reencrypted,
            signature: signature(response.signature),
        })
    }

    async fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = ChannelState::Closed;
        }
    }
}
