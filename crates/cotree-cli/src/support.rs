use crate::cli::SemiringKind;
use cotree_kernel::{DeltaMode, Tree};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "cotree.toml";

/// Defaults read from a TOML file. Command-line flags win over these.
///
/// ```toml
/// mode = "symmetric-orbit"
/// semiring = "rat"
/// labels = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub mode: Option<DeltaMode>,
    #[serde(default)]
    pub semiring: Option<SemiringKind>,
    #[serde(default)]
    pub labels: Option<bool>,
}

impl Config {
    /// Effective mode: flag, then file, then planar.
    pub fn mode(&self, flag: Option<&str>) -> DeltaMode {
        match flag {
            Some(raw) => parse_mode_or_exit(raw),
            None => self.mode.unwrap_or_default(),
        }
    }

    /// Effective semiring: flag, then file, then rationals for orbit mode
    /// and naturals otherwise.
    pub fn semiring(&self, flag: Option<SemiringKind>, mode: DeltaMode) -> SemiringKind {
        flag.or(self.semiring).unwrap_or(match mode {
            DeltaMode::SymmetricOrbit => SemiringKind::Rat,
            DeltaMode::Planar | DeltaMode::SymmetricAgg => SemiringKind::Nat,
        })
    }

    pub fn labels(&self, flag: bool) -> bool {
        flag || self.labels.unwrap_or(false)
    }
}

/// Load `--config` if given, else `cotree.toml` in the working directory if
/// present, else defaults.
pub fn load_config_or_exit(arg: Option<&str>) -> Config {
    let path = match arg {
        Some(explicit) => explicit.to_string(),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => DEFAULT_CONFIG_PATH.to_string(),
        None => return Config::default(),
    };
    let text = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("error: failed to read config at {path}: {e}");
        std::process::exit(1);
    });
    let config: Config = toml::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: failed to parse config TOML at {path}: {e}");
        std::process::exit(1);
    });
    tracing::debug!(path = %path, ?config, "loaded config");
    config
}

pub fn parse_tree_or_exit(raw: &str) -> Tree<String> {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("error: invalid tree `{raw}`: {e}");
        std::process::exit(1);
    })
}

pub fn parse_mode_or_exit(raw: &str) -> DeltaMode {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn print_json(payload: &serde_json::Value) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|err| {
        eprintln!("error: failed to render json: {err}");
        std::process::exit(2);
    });
    println!("{rendered}");
}
