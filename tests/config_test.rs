use credgate::config::GateConfig;
use credgate::error::CredGateError;
use credgate::fingerprint::HashAlgorithm;

#[test]
fn default_template_is_valid_toml() {
    std::env::set_var("CREDGATE_AUTH_TOKEN", "template-test-token");
    let template = include_str!("../templates/default.toml");

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("credgate.toml");
    std::fs::write(&config_path, template).unwrap();

    let config = GateConfig::load_from_path(&config_path).unwrap();
    assert_eq!(config.server.listen, "127.0.0.1:18443");
    assert_eq!(config.credentials.username_path, "username");
    assert_eq!(config.credentials.password_path, "password");
    assert_eq!(config.lookup.algorithm, HashAlgorithm::Sha256);
    assert_eq!(config.lookup.auth.as_deref(), Some("template-test-token"));
    assert_eq!(config.detection.header, "X-Credential-Detected");
}

#[test]
fn env_substitution_fills_auth_credential() {
    std::env::set_var("CREDGATE_CONFIG_TEST_TOKEN", "integration-token");
    let toml = r#"
        [server]
        listen = "127.0.0.1:0"

        [origin]
        url = "http://127.0.0.1:9000"

        [credentials]
        username_path = "username"
        password_path = "password"

        [lookup]
        url = "http://127.0.0.1:9001/check"
        auth = "${CREDGATE_CONFIG_TEST_TOKEN}"

        [report]
        url = "http://127.0.0.1:9001/report"
    "#;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("credgate.toml");
    std::fs::write(&config_path, toml).unwrap();

    let config = GateConfig::load_from_path(&config_path).unwrap();
    assert_eq!(config.lookup.auth.as_deref(), Some("integration-token"));
}

#[test]
fn unset_env_variable_fails_load_with_its_name() {
    let toml = r#"
        [server]
        listen = "127.0.0.1:0"

        [origin]
        url = "http://127.0.0.1:9000"

        [credentials]
        username_path = "username"
        password_path = "password"

        [lookup]
        url = "http://127.0.0.1:9001/check"
        auth = "${CREDGATE_NO_SUCH_VARIABLE}"

        [report]
        url = "http://127.0.0.1:9001/report"
    "#;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("credgate.toml");
    std::fs::write(&config_path, toml).unwrap();

    let err = GateConfig::load_from_path(&config_path).unwrap_err();
    assert!(
        matches!(err, CredGateError::ConfigEnvVar(ref name) if name == "CREDGATE_NO_SUCH_VARIABLE"),
        "unexpected error: {err}"
    );
}

#[test]
fn missing_file_fails_with_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GateConfig::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, CredGateError::Io(_)));
}

#[test]
fn config_without_auth_loads_with_lookups_disabled() {
    let toml = r#"
        [server]
        listen = "127.0.0.1:0"

        [origin]
        url = "http://127.0.0.1:9000"

        [credentials]
        username_path = "login.username"
        password_path = "login.password"
        min_username_len = 4
        min_password_len = 8

        [lookup]
        url = "http://127.0.0.1:9001/check"
        algorithm = "sha1"

        [report]
        url = "http://127.0.0.1:9001/report"
        group = "login-cluster"
    "#;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("credgate.toml");
    std::fs::write(&config_path, toml).unwrap();

    let config = GateConfig::load_from_path(&config_path).unwrap();
    assert!(config.lookup.auth.is_none());
    assert_eq!(config.lookup.algorithm, HashAlgorithm::Sha1);
    assert_eq!(config.credentials.min_password_len, 8);
    assert_eq!(config.report.group, "login-cluster");
}
