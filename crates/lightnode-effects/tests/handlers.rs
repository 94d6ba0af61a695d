//! Production handler construction and transport failure mapping

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;

use lightnode_core::effects::{
    ProverEffects, SigningEffects, SubmissionEffects, TimeEffects, TreeSourceEffects,
};
use lightnode_core::{
    LightNodeConfig, ProofArtifact, ProofSubmission, ProveError, QueryError, SigningError,
    SubmitError, TreeId,
};
use lightnode_effects::{recover_address, HandlerError, ProductionEffects};

const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

/// Configuration pointing every collaborator at a closed local port
fn unreachable_config() -> LightNodeConfig {
    let mut config = LightNodeConfig::default();
    config.chain.lcd_url = "http://127.0.0.1:9".into();
    config.chain.contract_address = "cosmos1contract".into();
    config.prover.url = "http://127.0.0.1:9".into();
    config.submission.url = "http://127.0.0.1:9".into();
    config.api.timeout_seconds = 2;
    config.wallet.private_key = KEY.into();
    config
}

#[test]
fn missing_key_is_rejected() {
    let mut config = unreachable_config();
    config.wallet.private_key.clear();

    assert_matches!(
        ProductionEffects::from_config(&config),
        Err(HandlerError::Signing(SigningError::InvalidKey { .. }))
    );
}

#[test]
fn signatures_bind_the_wallet() {
    let effects = ProductionEffects::from_config(&unreachable_config()).unwrap();
    let signature = effects.sign("proof-hash").unwrap();

    let recovered = recover_address("proof-hash", &signature).unwrap();
    assert_eq!(recovered.to_checksum(None), effects.wallet_address());
    assert!(effects.now_ms() > 0);
}

#[tokio::test]
async fn unreachable_collaborators_map_to_transport_errors() {
    let effects = ProductionEffects::from_config(&unreachable_config()).unwrap();

    assert_matches!(
        effects.list_tree_ids().await,
        Err(QueryError::Transport { .. })
    );
    assert_matches!(
        effects.get_tree(&TreeId::from("t1")).await,
        Err(QueryError::Transport { .. })
    );
    assert_matches!(
        effects.prove(&["a".to_string()], "a").await,
        Err(ProveError::Transport { .. })
    );

    let submission = ProofSubmission {
        wallet_address: effects.wallet_address(),
        signature: "0x".into(),
        proof: ProofArtifact {
            leaf_value: "a".into(),
            proof_path: vec![],
        },
        proof_hash: "h".into(),
        receipt: "r".into(),
        tree_id: TreeId::from("t1"),
    };
    assert_matches!(
        effects.submit(&submission).await,
        Err(SubmitError::Transport { .. })
    );
}
