use std::process::Command;

use tempfile::TempDir;

/// Commands that reach the platform fail fast with the exact variable to set
/// when no credentials are configured anywhere.
#[test]
fn test_stacks_without_credentials_names_missing_variable() {
    let bin = env!("CARGO_BIN_EXE_liftgate");
    // Isolated home so a developer's real ~/.config/liftgate/config.toml
    // cannot leak into the test
    let home = TempDir::new().unwrap();

    let output = Command::new(bin)
        .env_remove("SPACELIFT_API_ENDPOINT")
        .env_remove("SPACELIFT_API_KEY_ID")
        .env_remove("SPACELIFT_API_KEY_SECRET")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .arg("stacks")
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SPACELIFT_API_ENDPOINT"),
        "error should name the first missing variable; got:\n{stderr}"
    );
}

#[test]
fn test_config_file_satisfies_credential_resolution_order() {
    let bin = env!("CARGO_BIN_EXE_liftgate");
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("liftgate");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
[credentials]
endpoint = "https://example.app.spacelift.io"
api_key_id = "key-id"
"#,
    )
    .unwrap();

    let output = Command::new(bin)
        .env_remove("SPACELIFT_API_ENDPOINT")
        .env_remove("SPACELIFT_API_KEY_ID")
        .env_remove("SPACELIFT_API_KEY_SECRET")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .arg("stacks")
        .output()
        .unwrap();

    // Endpoint and key id come from the file, so the secret is the one
    // still missing
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SPACELIFT_API_KEY_SECRET"),
        "error should name the remaining missing variable; got:\n{stderr}"
    );
}
