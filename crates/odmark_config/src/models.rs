// --- File: crates/odmark_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Institution Config ---
// Identifies the institution whose students are being scanned. The email
// domain is used to synthesize a student address when no profile exists.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstitutionConfig {
    pub name: Option<String>,
    pub email_domain: String, // e.g. "ritchennai.edu.in"
}

// --- Scanner Config ---
// Tuning knobs for the scan core. Every field has a default matching the
// behavior of the reference deployment, so a bare config file is valid.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScannerConfig {
    /// Suppression window for repeated identical decodes, in milliseconds.
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
    /// Interval between torch capability probe attempts, in milliseconds.
    #[serde(default = "default_torch_probe_interval_ms")]
    pub torch_probe_interval_ms: u64,
    /// Probe attempts before torch capability is considered absent.
    #[serde(default = "default_torch_probe_attempts")]
    pub torch_probe_attempts: u32,
    /// How long transient scan feedback stays visible, in milliseconds.
    #[serde(default = "default_status_clear_ms")]
    pub status_clear_ms: u64,
    /// Target decode frame rate requested from the camera.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Side length of the square decode region, in pixels.
    #[serde(default = "default_decode_box_px")]
    pub decode_box_px: u32,
    /// Capacity of the decode event channel between camera and controller.
    #[serde(default = "default_decode_queue_depth")]
    pub decode_queue_depth: usize,
}

fn default_dedup_window_ms() -> u64 {
    2000
}
fn default_torch_probe_interval_ms() -> u64 {
    500
}
fn default_torch_probe_attempts() -> u32 {
    16
}
fn default_status_clear_ms() -> u64 {
    3000
}
fn default_frame_rate() -> u32 {
    10
}
fn default_decode_box_px() -> u32 {
    250
}
fn default_decode_queue_depth() -> usize {
    16
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            dedup_window_ms: default_dedup_window_ms(),
            torch_probe_interval_ms: default_torch_probe_interval_ms(),
            torch_probe_attempts: default_torch_probe_attempts(),
            status_clear_ms: default_status_clear_ms(),
            frame_rate: default_frame_rate(),
            decode_box_px: default_decode_box_px(),
            decode_queue_depth: default_decode_queue_depth(),
        }
    }
}

// --- Firestore Config ---
// Holds non-secret Firestore config. The service account key is read from
// the file at key_path; nothing secret lives in the config file itself.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FirestoreConfig {
    pub project_id: Option<String>,
    pub key_path: Option<String>,
}

// --- Auth Config ---
// Static bearer tokens mapping to club identities. A real deployment
// would verify tokens against the identity provider; the token table is
// the development stand-in.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub static_tokens: Vec<StaticToken>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaticToken {
    pub token: String,
    pub email: String,
    pub display_name: Option<String>,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    pub institution: InstitutionConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_firestore: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub firestore: Option<FirestoreConfig>,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}
