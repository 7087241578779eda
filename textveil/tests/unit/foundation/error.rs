use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EditorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        EditorError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(EditorError::font("x").to_string().contains("font error:"));
    assert!(
        EditorError::preview_unavailable("x")
            .to_string()
            .contains("preview unavailable:")
    );
}

#[test]
fn missing_remote_asset_names_layer_and_key() {
    let err = EditorError::MissingRemoteAsset {
        layer: LayerKind::Subject,
        key: "abc123".to_owned(),
    };
    let msg = err.to_string();
    assert!(msg.contains("subject"));
    assert!(msg.contains("abc123"));
}

#[test]
fn retryable_classification() {
    assert!(EditorError::preview_unavailable("detached").is_retryable());
    assert!(EditorError::storage("timeout").is_retryable());
    assert!(!EditorError::validation("bad").is_retryable());
    assert!(
        !EditorError::MissingRemoteAsset {
            layer: LayerKind::Subject,
            key: "k".to_owned(),
        }
        .is_retryable()
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EditorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
