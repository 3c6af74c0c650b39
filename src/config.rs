use std::collections::HashMap;
use std::{ io, fmt };
use std::io::{ BufRead, BufReader };
use std::fs::File;
use log::LevelFilter;

#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix for diagnostics, e.g. `tiny-shell: ls: No such file or directory`.
    pub shell_name: String,
    /// Target of a bare `cd`; falls back to `$HOME` when unset.
    pub home: Option<String>,
    /// Program search path; falls back to `$PATH` when unset.
    pub search_path: Option<String>,
    pub pipeline_status: PipelineStatus,
    pub log_level: LevelFilter,
    pub env_vars: HashMap<String, String>,
}

/// How the two sides of a pipe combine into one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// The right side's status when it is non-zero, else the left side's.
    RightmostNonzero,
    /// Always the right side's status.
    Rightmost,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            shell_name: "tiny-shell".to_string(),
            home: None,
            search_path: None,
            pipeline_status: PipelineStatus::RightmostNonzero,
            log_level: LevelFilter::Warn,
            env_vars: HashMap::new(),
        }
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path).map_err(ConfigError::Io)?;
        let mut src = String::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(ConfigError::Io)?;
            src.push_str(&line);
            src.push('\n');
        }
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = ConfigLoader::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("Line {}: No '=' found: {}", lineno+1, line)));
            };
            let key = key.trim();
            let value = value.trim_end();

            match key {
                "shell_name" => config.shell_name = value.to_string(),
                "home" => config.home = Some(value.to_string()),
                "search_path" => config.search_path = Some(value.to_string()),
                "pipeline_status" => {
                    config.pipeline_status = match value {
                        "rightmost-nonzero" => PipelineStatus::RightmostNonzero,
                        "rightmost" => PipelineStatus::Rightmost,
                        _ => return Err(ConfigError::Parse(format!("Line {}: Invalid pipeline_status: {}", lineno+1, value))),
                    };
                }
                "log_level" => match value.parse::<LevelFilter>() {
                    Ok(level) => config.log_level = level,
                    Err(_) => return Err(ConfigError::Parse(format!("Line {}: Invalid log_level: {}", lineno+1, value))),
                },
                k if k.starts_with("env.") => {
                    let var = k.trim_start_matches("env.").to_string();
                    config.env_vars.insert(var, value.to_string());
                }
                _ => return Err(ConfigError::Parse(format!("Line {}: Unknown key: {}", lineno+1, key))),
            }
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(String),
}
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
