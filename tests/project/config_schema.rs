use character_checker::config::Config;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn minimal_config_deserializes_with_defaults() {
    let toml = r#"
[gateway]
port = 9000
"#;

    let parsed: Config = toml::from_str(toml).expect("minimal config should deserialize");

    assert_eq!(parsed.gateway.port, 9000);
    assert_eq!(parsed.gateway.host, "127.0.0.1");
    assert_eq!(parsed.gateway.max_body_mb, 50);
    assert_eq!(parsed.palette.n_colors, 5);
    assert_eq!(
        (parsed.palette.resize_width, parsed.palette.resize_height),
        (100, 100)
    );
    assert_eq!(parsed.vision.models[0], "gemini-2.0-flash-exp");
    assert_eq!((parsed.limits.min_images, parsed.limits.max_images), (2, 5));
    assert!(parsed.uploads.persist);
    assert!(parsed.vision.api_key.is_none());
}

#[test]
fn load_from_places_workspace_next_to_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[vision]
models = ["gemini-1.5-flash"]

[uploads]
persist = false
"#,
    )
    .expect("config written");

    let config = Config::load_from(&path).expect("config should load");

    assert_eq!(config.config_path, path);
    assert_eq!(config.workspace_dir, dir.path().join("workspace"));
    assert_eq!(config.upload_dir(), dir.path().join("workspace").join("uploads"));
    assert_eq!(config.vision.models, ["gemini-1.5-flash"]);
    assert!(!config.uploads.persist);
}

#[test]
fn load_from_rejects_invalid_values() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");

    for body in [
        "[palette]\nn_colors = 0\n",
        "[vision]\nmodels = []\n",
        "[limits]\nmin_images = 6\nmax_images = 5\n",
    ] {
        std::fs::write(&path, body).expect("config written");
        assert!(Config::load_from(&path).is_err(), "accepted: {body}");
    }
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = Config::default();
    config.config_path = dir.path().join("nested").join("config.toml");
    config.gateway.allowed_origins = vec!["https://example.test".into()];
    config.palette.seed = 7;

    config.save().expect("config saved");
    let loaded = Config::load_from(Path::new(&config.config_path)).expect("config loaded");

    assert_eq!(loaded.gateway.allowed_origins, ["https://example.test"]);
    assert_eq!(loaded.palette.seed, 7);
}
