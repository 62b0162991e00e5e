use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{Console, Result};

static CONFIG_DIR_NAME: &str = "snatch";
static CONFIG_FILE_NAME: &str = "snatch.yaml";

/// User configuration, merged from defaults and the optional config file.
/// Command-line arguments override both (see `Config::resolve_conf`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Config {
    /// Used when a command does not give a location argument.
    location: Option<String>,
    /// Directory under which `prep` materializes contest directories.
    root_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: None,
            root_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn new(location: Option<String>, root_dir: PathBuf) -> Self {
        Self { location, root_dir }
    }

    pub fn load(cnsl: &mut Console) -> Result<Self> {
        let path = match Self::file_path() {
            Some(path) if path.is_file() => path,
            _ => return Ok(Self::default()),
        };
        let file = File::open(&path)
            .with_context(|| format!("Could not open config file : {}", path.display()))?;
        let config = serde_yaml::from_reader(file)
            .with_context(|| format!("Could not read config file : {}", path.display()))?;
        writeln!(cnsl, "Loaded config from {}", path.display())?;
        Ok(config)
    }

    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Merges the config file defaults with command-line arguments into the
    /// run configuration handed to site processors.
    pub fn resolve_conf(&self, location: Option<&str>, problems: &[String]) -> Conf {
        let location = location
            .map(str::to_owned)
            .or_else(|| self.location.clone())
            .unwrap_or_else(|| "localhost".to_owned());
        Conf {
            location: normalize_location(&location),
            problems: problems.to_vec(),
        }
    }
}

/// Merged run configuration.
///
/// `location` always carries a scheme; `problems` keeps the user-supplied
/// tokens untouched, in order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conf {
    pub location: String,
    pub problems: Vec<String>,
}

fn normalize_location(location: &str) -> String {
    if location.contains("://") {
        location.to_owned()
    } else {
        format!("http://{}", location)
    }
}
