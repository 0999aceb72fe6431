//! Session options from an optional TOML config file.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use tabgrid_core::SessionOptions;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    interaction: Option<InteractionFile>,
    history: Option<HistoryFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InteractionFile {
    edge_threshold: Option<f64>,
    resize_min: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HistoryFile {
    limit: Option<usize>,
}

/// Loads session options, falling back to the defaults for anything
/// missing or invalid. Problems are reported as warnings, never as
/// hard errors: a broken config file must not make documents
/// unopenable.
pub fn load_options(config_file: Option<&PathBuf>) -> (SessionOptions, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut options = SessionOptions::default();
    let config_path = config_file.cloned().or_else(user_config_path);
    let mut file: Option<ConfigFile> = None;

    if let Some(path) = config_path.as_ref() {
        if path.exists() {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
                    warnings.push(format!(
                        "Refusing to read {}: file too large ({} bytes, max {})",
                        path.display(),
                        meta.len(),
                        MAX_CONFIG_FILE_BYTES
                    ));
                }
                Ok(_) => match std::fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                        Ok(parsed) => file = Some(parsed),
                        Err(err) => {
                            warnings.push(format!("Failed to parse {}: {}", path.display(), err))
                        }
                    },
                    Err(err) => {
                        warnings.push(format!("Failed to read {}: {}", path.display(), err))
                    }
                },
                Err(err) => warnings.push(format!(
                    "Failed to read metadata for {}: {}",
                    path.display(),
                    err
                )),
            }
        } else if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    let Some(file) = file else {
        return (options, warnings);
    };

    if let Some(interaction) = file.interaction {
        if let Some(threshold) = interaction.edge_threshold {
            if threshold.is_finite() && threshold >= 0.0 {
                options.edge_threshold = threshold;
            } else {
                warnings.push(format!(
                    "Ignoring edge_threshold {}: must be finite and >= 0",
                    threshold
                ));
            }
        }
        if let Some(min) = interaction.resize_min {
            if min.is_finite() && min > 0.0 {
                options.resize_min = min;
            } else {
                warnings.push(format!(
                    "Ignoring resize_min {}: must be finite and > 0",
                    min
                ));
            }
        }
    }

    if let Some(history) = file.history
        && let Some(limit) = history.limit
    {
        if limit > 0 {
            options.history_limit = limit;
        } else {
            warnings.push("Ignoring history limit 0: must be at least 1".to_string());
        }
    }

    (options, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tabgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("tabgrid.toml");
    Some(path)
}
