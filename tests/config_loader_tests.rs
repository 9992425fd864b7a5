use ong::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const KEYS: [&str; 9] = [
    "ONG_PROFILE",
    "ONG_API_BIND_ADDR",
    "ONG_LOG_LEVEL",
    "ONG_JWT_SECRET",
    "ONG_PUBLIC_BASE_URL",
    "ONG_EXPOSE_ERROR_DETAILS",
    "ONG_SENDGRID_API_KEY",
    "ONG_DATABASE_URL",
    "ONG_JWT_EXPIRATION_HOURS",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for key in KEYS {
        unsafe { env::remove_var(key) };
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();
    let dir = TempDir::new().unwrap();

    let cfg = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.public_base_url, "http://localhost:8080");
    assert_eq!(cfg.jwt_expiration_hours, 24);
    assert!(cfg.expose_error_details);
    assert!(cfg.sendgrid_api_key.is_none());
    assert_eq!(cfg.asset_base_url(), "http://localhost:8080/uploads");
    cfg.bind_addr().expect("default bind addr parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();
    let dir = TempDir::new().unwrap();

    write_env_file(&dir, ".env", "ONG_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &dir,
        ".env.local",
        "ONG_PROFILE=test\nONG_API_BIND_ADDR=127.0.0.1:4000\n",
    );
    write_env_file(&dir, ".env.test", "ONG_API_BIND_ADDR=192.168.0.10:5000\n");
    write_env_file(
        &dir,
        ".env.test.local",
        "ONG_API_BIND_ADDR=10.0.0.5:6000\nONG_LOG_LEVEL=debug\n",
    );

    let cfg = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .expect("layered config loads");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.log_level, "debug");
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();
    let dir = TempDir::new().unwrap();
    write_env_file(
        &dir,
        ".env",
        "ONG_PUBLIC_BASE_URL=https://files.example.org\nONG_EXPOSE_ERROR_DETAILS=true\n",
    );

    unsafe {
        env::set_var("ONG_PUBLIC_BASE_URL", "https://api.example.org");
        env::set_var("ONG_EXPOSE_ERROR_DETAILS", "off");
    }

    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    clear_env();
    let cfg = result.expect("config loads");

    assert_eq!(cfg.public_base_url, "https://api.example.org");
    assert!(!cfg.expose_error_details);
}

#[test]
fn production_profile_rejects_development_secret() {
    let _guard = env_guard();
    clear_env();
    let dir = TempDir::new().unwrap();
    write_env_file(&dir, ".env", "ONG_PROFILE=prod\n");

    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(result, Err(ConfigError::WeakJwtSecret)));

    unsafe {
        env::set_var("ONG_JWT_SECRET", "a-production-secret-of-sufficient-length");
    }
    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    clear_env();
    assert_eq!(result.expect("strong secret accepted").profile, "prod");
}

#[test]
fn invalid_values_are_reported() {
    let _guard = env_guard();
    clear_env();
    let dir = TempDir::new().unwrap();

    unsafe { env::set_var("ONG_API_BIND_ADDR", "not-an-addr") };
    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
    clear_env();

    unsafe { env::set_var("ONG_EXPOSE_ERROR_DETAILS", "maybe") };
    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(result, Err(ConfigError::InvalidBool { .. })));
    clear_env();

    unsafe { env::set_var("ONG_JWT_EXPIRATION_HOURS", "24h") };
    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
    clear_env();

    unsafe { env::set_var("ONG_JWT_EXPIRATION_HOURS", "100000000") };
    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidJwtExpiration { .. })
    ));
    clear_env();

    unsafe { env::set_var("ONG_PUBLIC_BASE_URL", "not a url") };
    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    clear_env();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidPublicBaseUrl { .. })
    ));
}
