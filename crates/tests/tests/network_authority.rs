// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use fhe_oracle::{AuthorityClient, AuthorityError, DecryptOracle, OracleError, RpcAuthority};
use fhe_oracle_config::{AuthorityMode, OracleConfig};
use fhe_oracle_crypto::{open_sealed, recipient_public_key};
use fhe_oracle_data::InMemStore;
use fhe_oracle_engine::{Ciphertext, UintType};
use fhe_oracle_test_helpers::{MockFheEngine, RpcOracleServer};
use std::{
    net::TcpListener,
    sync::Arc,
    time::{Duration, Instant},
};

fn network_config(address: String, rpc_timeout_secs: u64) -> OracleConfig {
    OracleConfig {
        authority: AuthorityMode::Network,
        oracle_address: Some(address),
        rpc_timeout_secs,
        ..OracleConfig::default()
    }
}

#[tokio::test]
async fn unreachable_oracle_fails_once() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let oracle = DecryptOracle::from_config(&network_config(addr.to_string(), 10), None)?;
    let ct = MockFheEngine::new().encrypt(2, UintType::Uint8);

    let err = oracle.get_require(&ct).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::Transport(_)))
    ));
    oracle.close().await;
    Ok(())
}

#[tokio::test]
async fn silent_oracle_hits_the_call_timeout() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let oracle = DecryptOracle::from_config(&network_config(addr.to_string(), 1), None)?;
    let ct = MockFheEngine::new().encrypt(2, UintType::Uint8);

    let started = Instant::now();
    let err = oracle.decrypt(&ct).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::Timeout))
    ));
    assert!(started.elapsed().as_secs_f64() < 5.0);
    drop(listener);
    Ok(())
}

#[tokio::test]
async fn closed_network_oracle_refuses_queries() -> Result<()> {
    let config = OracleConfig {
        authority: AuthorityMode::Network,
        ..OracleConfig::default()
    };
    let oracle = DecryptOracle::from_config(&config, None)?;
    oracle.close().await;

    let ct = MockFheEngine::new().encrypt(2, UintType::Uint8);
    let err = oracle.seal_output(&ct, &[0u8; 32]).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::Closed))
    ));
    Ok(())
}

#[tokio::test]
async fn served_answers_reach_the_caller() -> Result<()> {
    let engine = Arc::new(MockFheEngine::new());
    let server = RpcOracleServer::start(engine.clone(), Some("cafe")).await?;
    let authority = RpcAuthority::new(Some(&server.address()), Duration::from_secs(5))?;

    let zero = engine.encrypt(0, UintType::Uint16);
    let answer = authority.get_require(&zero).await?;
    assert!(!answer.value);
    assert_eq!(answer.signature.as_deref(), Some("cafe"));
    assert!(authority.get_require(&engine.encrypt(3, UintType::Uint16)).await?.value);

    let decrypted = authority.decrypt(&engine.encrypt(4_000_000, UintType::Uint32)).await?;
    assert_eq!(decrypted.value, "4000000");

    let secret = [7u8; 32];
    let sealed = authority
        .reencrypt(&engine.encrypt(42, UintType::Uint8), &recipient_public_key(&secret))
        .await?;
    assert_eq!(open_sealed(&secret, &sealed.value)?, 42);
    assert_eq!(server.calls(), 4);

    authority.close().await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn empty_signature_is_absent() -> Result<()> {
    let engine = Arc::new(MockFheEngine::new());
    let server = RpcOracleServer::start(engine.clone(), None).await?;
    let authority = RpcAuthority::new(Some(&server.address()), Duration::from_secs(5))?;

    let answer = authority.decrypt(&engine.encrypt(1, UintType::Uint8)).await?;
    assert_eq!(answer.value, "1");
    assert_eq!(answer.signature, None);
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn network_oracle_caches_remote_answers() -> Result<()> {
    let engine = Arc::new(MockFheEngine::new());
    let server = RpcOracleServer::start(engine.clone(), None).await?;
    let oracle = DecryptOracle::from_config(&network_config(server.address(), 5), None)?;
    let ct = engine.encrypt(9, UintType::Uint32);

    assert!(oracle.get_require(&ct).await?);
    assert!(oracle.get_require(&ct).await?);
    assert_eq!(server.calls(), 1);

    assert_eq!(oracle.decrypt(&ct).await?, "9");
    assert_eq!(oracle.decrypt(&ct).await?, "9");
    assert_eq!(server.calls(), 2);

    oracle.close().await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn remote_seal_never_touches_the_store() -> Result<()> {
    let engine = Arc::new(MockFheEngine::new());
    let server = RpcOracleServer::start(engine.clone(), None).await?;
    let store = Arc::new(InMemStore::new(true));
    let oracle = DecryptOracle::new(
        store.clone(),
        Arc::new(RpcAuthority::new(
            Some(&server.address()),
            Duration::from_secs(5),
        )?),
    );
    let ct = engine.encrypt(17, UintType::Uint16);
    let secret = [3u8; 32];

    let first = oracle.seal_output(&ct, &recipient_public_key(&secret)).await?;
    let second = oracle.seal_output(&ct, &recipient_public_key(&secret)).await?;
    assert_ne!(first, second);
    assert_eq!(open_sealed(&secret, &second)?, 17);
    assert_eq!(server.calls(), 2);
    assert!(store.is_empty());
    assert!(store.get_log().is_empty());

    oracle.close().await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn remote_failure_is_not_cached() -> Result<()> {
    let engine = Arc::new(MockFheEngine::new());
    let server = RpcOracleServer::start(engine.clone(), None).await?;
    let store = Arc::new(InMemStore::new(true));
    let oracle = DecryptOracle::new(
        store.clone(),
        Arc::new(RpcAuthority::new(
            Some(&server.address()),
            Duration::from_secs(5),
        )?),
    );
    let ct = engine.encrypt(2, UintType::Uint8);
    let wrong_width = Ciphertext::new(ct.bytes().to_vec(), UintType::Uint16);

    let err = oracle.get_require(&wrong_width).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::Transport(_)))
    ));
    assert!(store.is_empty());
    assert!(oracle.get_require(&ct).await?);

    oracle.close().await;
    server.stop().await;
    Ok(())
}
