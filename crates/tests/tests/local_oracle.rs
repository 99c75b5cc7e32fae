// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use fhe_oracle::{AuthorityClient, DecryptOracle, LocalAuthority, OracleError};
use fhe_oracle_config::{AuthorityMode, OracleConfig};
use fhe_oracle_crypto::{decrypt_key, open_sealed, recipient_public_key, require_key};
use fhe_oracle_data::{Get, InMemStore, Insert, ResultStore, SledStore};
use fhe_oracle_engine::{FheEngine, UintType};
use fhe_oracle_test_helpers::{CountingAuthority, MockFheEngine, PanicOnCallAuthority};
use std::sync::Arc;

fn local_oracle() -> (
    DecryptOracle,
    Arc<MockFheEngine>,
    Arc<CountingAuthority>,
    Arc<InMemStore>,
) {
    let engine = Arc::new(MockFheEngine::new());
    let authority = Arc::new(CountingAuthority::new(Arc::new(LocalAuthority::new(
        engine.clone(),
    ))));
    let store = Arc::new(InMemStore::new(true));
    let oracle = DecryptOracle::new(store.clone(), authority.clone());
    (oracle, engine, authority, store)
}

#[test]
fn content_keys_are_stable_and_tagged() {
    let first = require_key(&[0x01, 0x02, 0x03]);
    let second = require_key(&[0x01, 0x02, 0x03]);
    assert_eq!(first, second);
    assert_eq!(first.as_str().len(), 62);
    assert_ne!(first.as_str(), decrypt_key(&[0x01, 0x02, 0x03]).as_str());
}

#[test]
fn store_hit_and_not_found() -> Result<()> {
    let store = InMemStore::new(false);
    store.insert(Insert::new("k", br#"{"value":true}"#.to_vec()))?;
    assert_eq!(store.get(Get::new("k"))?, Some(br#"{"value":true}"#.to_vec()));
    assert_eq!(store.get(Get::new("unrelated"))?, None);
    Ok(())
}

#[tokio::test]
async fn require_is_non_zero() -> Result<()> {
    let (oracle, engine, _, _) = local_oracle();
    assert!(!oracle.get_require(&engine.encrypt(0, UintType::Uint32)).await?);
    assert!(oracle.get_require(&engine.encrypt(5, UintType::Uint32)).await?);
    Ok(())
}

#[tokio::test]
async fn miss_then_hit_contacts_authority_once() -> Result<()> {
    let (oracle, engine, authority, store) = local_oracle();
    let ct = engine.encrypt(7, UintType::Uint8);

    assert!(oracle.get_require(&ct).await?);
    assert_eq!(authority.calls(), 1);
    assert_eq!(store.get_log().len(), 1);

    assert!(oracle.get_require(&ct).await?);
    assert_eq!(authority.calls(), 1);
    assert_eq!(store.get_log().len(), 1);
    assert_eq!(engine.decrypts(), 1);
    Ok(())
}

#[tokio::test]
async fn decrypt_is_cached_separately() -> Result<()> {
    let (oracle, engine, authority, store) = local_oracle();
    let ct = engine.encrypt(65_000, UintType::Uint16);

    assert_eq!(oracle.decrypt(&ct).await?, "65000");
    assert!(oracle.get_require(&ct).await?);
    assert_eq!(oracle.decrypt(&ct).await?, "65000");
    assert_eq!(authority.calls(), 2);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[tokio::test]
async fn identical_plaintexts_are_distinct_handles() -> Result<()> {
    let (oracle, engine, authority, _) = local_oracle();
    oracle.get_require(&engine.encrypt(1, UintType::Uint8)).await?;
    oracle.get_require(&engine.encrypt(1, UintType::Uint8)).await?;
    assert_eq!(authority.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn put_require_answers_without_authority() -> Result<()> {
    let store = Arc::new(InMemStore::new(false));
    let oracle = DecryptOracle::new(store.clone(), Arc::new(PanicOnCallAuthority));
    let engine = MockFheEngine::new();
    let ct = engine.encrypt(0, UintType::Uint32);

    oracle.put_require(&ct, true).await?;
    assert!(oracle.get_require(&ct).await?);
    assert!(!oracle.store_require(&engine.encrypt(0, UintType::Uint8), 0).await?);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[tokio::test]
async fn seal_output_is_per_recipient_and_uncached() -> Result<()> {
    let (oracle, engine, authority, store) = local_oracle();
    let ct = engine.encrypt(42, UintType::Uint32);
    let (alice, bob) = ([1u8; 32], [2u8; 32]);

    let for_alice = oracle
        .seal_output(&ct, &recipient_public_key(&alice))
        .await?;
    let for_bob = oracle.seal_output(&ct, &recipient_public_key(&bob)).await?;

    assert_ne!(for_alice, for_bob);
    assert_eq!(open_sealed(&alice, &for_alice)?, 42);
    assert_eq!(open_sealed(&bob, &for_bob)?, 42);
    assert!(open_sealed(&alice, &for_bob).is_err());
    assert_eq!(authority.calls(), 2);
    assert!(store.is_empty());
    assert!(store.get_log().is_empty());
    Ok(())
}

#[tokio::test]
async fn engine_failure_reaches_caller_and_is_not_cached() -> Result<()> {
    let (oracle, engine, _, store) = local_oracle();
    let ct = engine.encrypt(3, UintType::Uint8);
    let wrong_width = fhe_oracle_engine::Ciphertext::new(ct.bytes().to_vec(), UintType::Uint32);

    let err = oracle.get_require(&wrong_width).await.err();
    assert!(matches!(err, Some(OracleError::Authority(_))));
    assert!(store.is_empty());

    // the process keeps serving other queries
    assert!(oracle.get_require(&ct).await?);
    Ok(())
}

#[tokio::test]
async fn concurrent_queries_share_the_store() -> Result<()> {
    let (oracle, engine, authority, store) = local_oracle();
    let handles: Vec<_> = (0..16u64)
        .map(|value| {
            let oracle = oracle.clone();
            let ct = engine.encrypt(value, UintType::Uint16);
            tokio::spawn(async move { oracle.get_require(&ct).await })
        })
        .collect();

    for (value, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await??, value != 0);
    }
    assert_eq!(authority.calls(), 16);
    assert_eq!(store.len(), 16);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_on_one_key_agree() -> Result<()> {
    let (oracle, engine, authority, store) = local_oracle();
    let ct = engine.encrypt(300, UintType::Uint16);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let oracle = oracle.clone();
            let ct = ct.clone();
            tokio::spawn(async move {
                let require = oracle.get_require(&ct).await?;
                let plaintext = oracle.decrypt(&ct).await?;
                Ok::<_, OracleError>((require, plaintext))
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await??, (true, "300".to_string()));
    }

    // duplicate misses may both reach the authority and rewrite the same record
    let calls = authority.calls();
    assert!((2..=16).contains(&calls), "authority calls: {calls}");
    assert_eq!(store.len(), 2);
    let writes = store.get_log().len();
    assert!((2..=16).contains(&writes), "store writes: {writes}");

    assert!(oracle.get_require(&ct).await?);
    assert_eq!(authority.calls(), calls);
    Ok(())
}

#[tokio::test]
async fn sled_results_outlive_the_oracle() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = Arc::new(MockFheEngine::new());
    let ct = engine.encrypt(9, UintType::Uint8);

    let config = OracleConfig {
        authority: AuthorityMode::Local,
        home_dir: Some(dir.path().to_path_buf()),
        db_path: Some("data/oracle.db".into()),
        ..OracleConfig::default()
    };
    let fhe: Arc<dyn FheEngine> = engine.clone();
    let oracle = DecryptOracle::from_config(&config, Some(fhe))?;
    assert_eq!(oracle.decrypt(&ct).await?, "9");
    assert!(oracle.get_require(&ct).await?);
    oracle.close().await;
    oracle.close().await;

    let store = Arc::new(SledStore::new(&dir.path().join("data/oracle.db"))?);
    let reopened = DecryptOracle::new(store, Arc::new(PanicOnCallAuthority));
    assert_eq!(reopened.decrypt(&ct).await?, "9");
    assert!(reopened.get_require(&ct).await?);
    assert_eq!(engine.decrypts(), 2);
    Ok(())
}

#[tokio::test]
async fn closed_local_authority_is_harmless() -> Result<()> {
    let engine = Arc::new(MockFheEngine::new());
    let authority = LocalAuthority::new(engine.clone());
    authority.close().await;
    assert!(authority.get_require(&engine.encrypt(1, UintType::Uint8)).await?.value);
    Ok(())
}
