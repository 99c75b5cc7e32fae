// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use fhe_oracle::{
    AuthorityClient, AuthorityError, DecryptOracle, HttpAuthority, OracleError, RetryPolicy,
    SignedRequire,
};
use fhe_oracle_config::{AuthorityMode, OracleConfig};
use fhe_oracle_crypto::{require_key, RequireSigner};
use fhe_oracle_data::InMemStore;
use fhe_oracle_engine::UintType;
use fhe_oracle_test_helpers::{
    write_oracle_keys, MockFheEngine, RequireServer, RequireServerMode,
};
use std::sync::Arc;
use tracing_test::traced_test;

/// The oracle node, able to sign, and a plain node that only verifies.
fn nodes(
    server: &RequireServer,
    signer: &RequireSigner,
) -> (DecryptOracle, DecryptOracle, Arc<InMemStore>) {
    let oracle = DecryptOracle::new(
        Arc::new(InMemStore::default()),
        Arc::new(HttpAuthority::new(
            server.base_url(),
            signer.verifier(),
            Some(signer.clone()),
        )),
    );
    let node_store = Arc::new(InMemStore::new(true));
    let node = DecryptOracle::new(
        node_store.clone(),
        Arc::new(HttpAuthority::new(server.base_url(), signer.verifier(), None)),
    );
    (oracle, node, node_store)
}

#[actix_web::test]
async fn published_result_is_verified_and_cached() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::Store).await?;
    let signer = RequireSigner::generate();
    let (oracle, node, node_store) = nodes(&server, &signer);
    let ct = MockFheEngine::new().encrypt(11, UintType::Uint32);

    assert!(oracle.store_require(&ct, 11).await?);
    assert_eq!(server.puts(), 1);

    let key = require_key(ct.bytes());
    let published = server
        .record(key.as_str())
        .ok_or_else(|| anyhow::anyhow!("not published"))?;
    assert!(published.value);
    assert!(signer
        .verifier()
        .verify(ct.bytes(), true, &published.signature)
        .is_ok());

    assert!(node.get_require(&ct).await?);
    assert!(node.get_require(&ct).await?);
    assert_eq!(server.gets(), 1);
    assert_eq!(node_store.get_log().len(), 1);

    server.stop().await;
    Ok(())
}

#[actix_web::test]
#[traced_test]
async fn tampered_value_is_rejected_and_not_stored() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::Tampered).await?;
    let signer = RequireSigner::generate();
    let (oracle, node, node_store) = nodes(&server, &signer);
    let ct = MockFheEngine::new().encrypt(0, UintType::Uint8);

    oracle.put_require(&ct, false).await?;

    let err = node.get_require(&ct).await.err();
    assert!(err.as_ref().is_some_and(OracleError::is_verification));
    assert!(node_store.is_empty());
    assert!(logs_contain("Rejected require response"));

    // signature failures are never retried
    assert_eq!(server.gets(), 1);
    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn foreign_signature_is_rejected() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::Store).await?;
    let signer = RequireSigner::generate();
    let impostor = RequireSigner::generate();
    let (_, node, node_store) = nodes(&server, &signer);
    let ct = MockFheEngine::new().encrypt(3, UintType::Uint16);

    server.seed(
        require_key(ct.bytes()).as_str(),
        SignedRequire {
            value: true,
            signature: impostor.sign(ct.bytes(), true),
        },
    );
    let err = node.get_require(&ct).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::Verification(_)))
    ));
    assert!(node_store.is_empty());

    server.seed(
        require_key(ct.bytes()).as_str(),
        SignedRequire {
            value: true,
            signature: "not hex".to_string(),
        },
    );
    assert!(node
        .get_require(&ct)
        .await
        .err()
        .is_some_and(|e| e.is_verification()));
    server.stop().await;
    Ok(())
}

#[actix_web::test]
#[traced_test]
async fn get_gives_up_after_four_attempts() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::AlwaysFail(500)).await?;
    let signer = RequireSigner::generate();
    let (_, node, node_store) = nodes(&server, &signer);
    let ct = MockFheEngine::new().encrypt(1, UintType::Uint8);

    let err = node.get_require(&ct).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::RetriesExhausted { attempts: 4, .. }))
    ));
    assert_eq!(server.gets(), 4);
    assert!(node_store.is_empty());
    assert!(logs_contain("Attempt 3/4 failed"));
    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn put_gives_up_after_four_attempts() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::AlwaysFail(503)).await?;
    let signer = RequireSigner::generate();
    let (oracle, _, _) = nodes(&server, &signer);
    let ct = MockFheEngine::new().encrypt(1, UintType::Uint8);

    let err = oracle.put_require(&ct, true).await.err();
    assert!(matches!(
        err,
        Some(OracleError::Authority(AuthorityError::RetriesExhausted { attempts: 4, .. }))
    ));
    assert_eq!(server.puts(), 4);
    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn missing_result_counts_as_failed_attempt() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::Store).await?;
    let signer = RequireSigner::generate();
    let authority = HttpAuthority::new(server.base_url(), signer.verifier(), None).with_retry(
        RetryPolicy {
            retries: 1,
            delay_ms: 1,
        },
    );
    let ct = MockFheEngine::new().encrypt(1, UintType::Uint8);

    let err = authority.get_require(&ct).await.err();
    assert!(matches!(
        err,
        Some(AuthorityError::RetriesExhausted { attempts: 2, .. })
    ));
    assert_eq!(server.gets(), 2);
    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn configured_http_nodes_share_results() -> Result<()> {
    let server = RequireServer::start(RequireServerMode::Store).await?;
    let home = tempfile::tempdir()?;
    let keys = write_oracle_keys(home.path())?;

    let oracle_config = OracleConfig {
        authority: AuthorityMode::Http,
        is_oracle: true,
        oracle_address: Some(server.base_url().to_string()),
        home_dir: Some(home.path().to_path_buf()),
        ..OracleConfig::default()
    };
    let node_config = OracleConfig {
        is_oracle: false,
        // the node never needs the private key
        oracle_private_key_path: "/does/not/exist".into(),
        ..oracle_config.clone()
    };

    let oracle = DecryptOracle::from_config(&oracle_config, None)?;
    let node = DecryptOracle::from_config(&node_config, None)?;
    let ct = MockFheEngine::new().encrypt(0, UintType::Uint32);

    assert!(!oracle.store_require(&ct, 0).await?);
    assert!(!node.get_require(&ct).await?);

    let key = require_key(ct.bytes());
    let record = server
        .record(key.as_str())
        .ok_or_else(|| anyhow::anyhow!("not published"))?;
    assert!(keys
        .signer
        .verifier()
        .verify(ct.bytes(), false, &record.signature)
        .is_ok());

    // a verified answer is never replaced
    assert!(matches!(
        node.put_require(&ct, true).await,
        Err(OracleError::Conflict { cached: false, .. })
    ));
    assert!(!node.get_require(&ct).await?);

    // a plain node cannot publish, and keeps nothing when it tries
    let fresh = MockFheEngine::new().encrypt(5, UintType::Uint32);
    assert!(matches!(
        node.put_require(&fresh, true).await,
        Err(OracleError::Authority(AuthorityError::Unsupported(_)))
    ));
    assert!(server.record(require_key(fresh.bytes()).as_str()).is_none());
    assert_eq!(server.gets(), 1);
    assert!(matches!(
        node.decrypt(&ct).await,
        Err(OracleError::Authority(AuthorityError::Unsupported(_)))
    ));

    node.close().await;
    oracle.close().await;
    server.stop().await;
    Ok(())
}
