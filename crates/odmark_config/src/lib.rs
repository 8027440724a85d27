use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
pub mod models;
pub use models::*;

/// Loads the unified application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `config/default` at the workspace root (any format the `config`
///    crate understands)
/// 2. `config/<RUN_ENV>` (RUN_ENV defaults to "debug")
/// 3. Environment variables prefixed with `ODMARK`, nested with `__`
///    (e.g. `ODMARK_SERVER__PORT=8080`)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "ODMARK".to_string());

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let workspace_root = manifest_dir
        .ancestors()
        .nth(2) // go from crates/odmark_config to workspace root
        .unwrap_or(&manifest_dir)
        .to_path_buf();

    let default_path = workspace_root.join("config/default");
    let env_path = workspace_root.join(format!("config/{}", run_env));

    let builder = Config::builder()
        .add_source(File::with_name(default_path.to_str().unwrap()).required(false))
        .add_source(File::with_name(env_path.to_str().unwrap()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(raw_config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is loaded at most once per process. `DOTENV_OVERRIDE` names an
/// alternative file; otherwise ".env" is used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_config_defaults_match_reference_deployment() {
        let scanner = ScannerConfig::default();
        assert_eq!(scanner.dedup_window_ms, 2000);
        assert_eq!(scanner.torch_probe_attempts, 16);
        assert_eq!(scanner.torch_probe_interval_ms, 500);
        assert_eq!(scanner.status_clear_ms, 3000);
        assert_eq!(scanner.frame_rate, 10);
        assert_eq!(scanner.decode_box_px, 250);
    }

    #[test]
    fn app_config_parses_with_minimal_sections() {
        let raw = r#"
            {
                "server": { "host": "127.0.0.1", "port": 8086 },
                "institution": { "email_domain": "ritchennai.edu.in" }
            }
        "#;
        let cfg: AppConfig = serde_json::from_str(raw).unwrap();
        assert!(!cfg.use_firestore);
        assert!(cfg.firestore.is_none());
        assert_eq!(cfg.scanner.dedup_window_ms, 2000);
        assert!(cfg.auth.static_tokens.is_empty());
    }
}
