mod company;
mod services;
mod session;

pub use company::{Company, Config, ExportSettings};
pub use services::{AiSettings, ConfirmationBackend, ConfirmationSettings};
pub use session::SessionSettings;

use crate::error::{LedgerError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir or ~/.ledgerbook/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "ledgerbook") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        LedgerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".ledgerbook"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export directory; relative paths live under the config dir
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load config.toml from the config directory
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(LedgerError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(LedgerError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| LedgerError::ConfigParse { path, source: e })
}

pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Acme Corp Ltd"
currency_symbol = "₦"

[session]
email = "admin@acme.com"
# business_name = "Acme Corp Ltd"   # optional, defaults to company name
plan = "SME"                        # SME, Startup or Enterprise
seed_samples = false                # start with two demo ledger entries

[confirmation]
backend = "simulated"   # simulated, deterministic or remote
delay_ms = 2000
# endpoint = "https://ledger.example.com/confirm"   # required for remote
timeout_secs = 10

[ai]
endpoint = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.5-flash"
api_key_env = "GEMINI_API_KEY"
timeout_secs = 60
max_attempts = 3
backoff_ms = 500

[export]
output_dir = "output"   # relative to this directory, or an absolute/~ path
raster_scale = 2.0      # PDF export resolution (2.0 = 144 ppi)
# print_command = "lp"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Plan;

    #[test]
    fn template_parses_with_defaults() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.company.name, "Acme Corp Ltd");
        assert_eq!(config.session.plan, Plan::Sme);
        assert_eq!(config.session.user(), "admin");
        assert_eq!(config.confirmation.backend, ConfirmationBackend::Simulated);
        assert_eq!(config.confirmation.delay_ms, 2000);
        assert_eq!(config.ai.max_attempts, 3);
        assert_eq!(config.export.raster_scale, 2.0);
    }

    #[test]
    fn minimal_config_fills_sections() {
        let config = parse_config("[company]\nname = \"Tiny Ltd\"\n").unwrap();
        assert_eq!(config.company.currency_symbol, "₦");
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert!(!config.session.seed_samples);
    }

    #[test]
    fn relative_output_dir_resolves_under_config_dir() {
        let dir = Path::new("/tmp/ledgerbook-cfg");
        assert_eq!(
            resolve_output_dir("output", dir),
            PathBuf::from("/tmp/ledgerbook-cfg/output")
        );
        assert_eq!(
            resolve_output_dir("/var/exports", dir),
            PathBuf::from("/var/exports")
        );
    }
}
