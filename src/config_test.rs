use super::*;

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_addressbook_env() {
    unsafe {
        std::env::remove_var("ADDRESSBOOK_BASE_URL");
        std::env::remove_var("ADDRESSBOOK_TIMEOUT_MS");
        std::env::remove_var("ADDRESSBOOK_STORAGE_DIR");
    }
}

#[test]
fn new_trims_trailing_slash() {
    let cfg = ClientConfig::new("http://localhost:5000/api/", Duration::from_secs(5), PathBuf::from("/tmp/ab")).unwrap();
    assert_eq!(cfg.base_url, "http://localhost:5000/api");
}

#[test]
fn new_rejects_bad_urls() {
    let dir = PathBuf::from("/tmp/ab");
    let timeout = Duration::from_secs(5);
    assert!(matches!(ClientConfig::new("not a url", timeout, dir.clone()), Err(ConfigError::InvalidBaseUrl(_))));
    assert!(matches!(ClientConfig::new("ftp://host/api", timeout, dir), Err(ConfigError::InvalidBaseUrl(_))));
}

#[test]
fn new_rejects_zero_timeout() {
    let err = ClientConfig::new(DEFAULT_BASE_URL, Duration::ZERO, PathBuf::from("/tmp/ab")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
}

#[test]
fn from_env_defaults_and_overrides() {
    unsafe {
        clear_addressbook_env();
        std::env::set_var("ADDRESSBOOK_STORAGE_DIR", "/tmp/addressbook-test");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    assert_eq!(cfg.storage_dir, PathBuf::from("/tmp/addressbook-test"));

    unsafe {
        std::env::set_var("ADDRESSBOOK_BASE_URL", "https://contacts.example.test/api/");
        std::env::set_var("ADDRESSBOOK_TIMEOUT_MS", "1500");
    }
    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://contacts.example.test/api");
    assert_eq!(cfg.timeout, Duration::from_millis(1500));

    unsafe {
        std::env::set_var("ADDRESSBOOK_TIMEOUT_MS", "soon");
    }
    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("ADDRESSBOOK_TIMEOUT_MS=soon"));

    unsafe { clear_addressbook_env() };
}
