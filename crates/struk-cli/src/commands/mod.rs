pub mod batch;
pub mod chat;
pub mod config;
pub mod extract;

use std::path::Path;

use struk_core::StrukConfig;

/// Load `--config`, else the default file if it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StrukConfig> {
    if let Some(path) = config_path {
        return Ok(StrukConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(StrukConfig::from_file(&default_path)?)
    } else {
        Ok(StrukConfig::default())
    }
}
