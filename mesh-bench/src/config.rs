//! User configuration options.

use crate::{BASE_DIR, CLIOptions};
use dirs::config_dir;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt,
    fs::{File, OpenOptions, create_dir_all},
    io::{self, Read, Write},
    path::PathBuf,
    str::FromStr,
};

const LOG_TAG: &str = "UserConfig";

#[derive(Debug)]
pub enum ConfigError {
    NoConfigDir,
    Io(PathBuf, io::Error),
    Serialise(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "{LOG_TAG}: couldn't find the user config dir"),
            ConfigError::Io(path, e) => write!(f, "{LOG_TAG}: {path:?}: {e}"),
            ConfigError::Serialise(e) => write!(f, "{LOG_TAG}: couldn't serialise config: {e}"),
        }
    }
}

impl Error for ConfigError {}

fn get_cfg_file() -> Result<PathBuf, ConfigError> {
    let mut dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir).map_err(|e| ConfigError::Io(dir.clone(), e))?;
    }
    dir.push("user.toml");
    Ok(dir)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshKind {
    #[default]
    Sphere,
    Torus,
}

impl FromStr for MeshKind {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sphere" => Ok(Self::Sphere),
            "torus" => Ok(Self::Torus),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "Invalid mesh kind",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub width: u32,
    pub height: u32,
    pub fov: f32,
    pub frames: u32,
    pub mesh: MeshKind,
    pub detail: u32,
    pub flat: bool,
    pub span_based: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fov: 90.0,
            frames: 360,
            mesh: MeshKind::Sphere,
            detail: 12,
            flat: false,
            span_based: false,
        }
    }
}

impl UserConfig {
    /// Read the config, recreating it with defaults if it is empty or can't
    /// be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = get_cfg_file()?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| ConfigError::Io(path.clone(), e))?;
        let mut buf = String::new();
        if let Ok(read_len) = file.read_to_string(&mut buf) {
            if read_len == 0 {
                return UserConfig::create_default(&mut file, &path);
            } else {
                if let Ok(data) = toml::from_str(&buf) {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return Ok(data);
                }
                warn!(target: LOG_TAG, "Could not deserialise {:?} recreating config", path);
            }
        }
        // The file may be part read, start it over
        let mut file = File::create(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        UserConfig::create_default(&mut file, &path)
    }

    fn create_default(file: &mut File, path: &PathBuf) -> Result<Self, ConfigError> {
        let config = UserConfig::default();
        let data = toml::to_string(&config).map_err(ConfigError::Serialise)?;
        file.write_all(data.as_bytes())
            .map_err(|e| ConfigError::Io(path.clone(), e))?;
        info!(target: LOG_TAG, "Saved default user config to {:?}", path);
        Ok(config)
    }

    pub fn write(&self) -> Result<(), ConfigError> {
        let path = get_cfg_file()?;
        let mut file = File::create(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let data = toml::to_string_pretty(self).map_err(ConfigError::Serialise)?;
        file.write_all(data.as_bytes())
            .map_err(|e| ConfigError::Io(path, e))
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if cli.width != 0 && cli.width != self.width {
            self.width = cli.width;
        } else {
            cli.width = self.width;
        }

        if cli.height != 0 && cli.height != self.height {
            self.height = cli.height;
        } else {
            cli.height = self.height;
        }

        if let Some(fov) = cli.fov {
            if fov != self.fov {
                self.fov = fov;
            }
        } else {
            cli.fov = Some(self.fov);
        }

        if cli.frames != 0 && cli.frames != self.frames {
            self.frames = cli.frames;
        } else {
            cli.frames = self.frames;
        }

        if let Some(mesh) = cli.mesh {
            if mesh != self.mesh {
                self.mesh = mesh;
                info!(target: LOG_TAG, "Mesh changed to: {:?}", mesh);
            }
        } else {
            cli.mesh = Some(self.mesh);
        }

        if cli.detail != 0 && cli.detail != self.detail {
            self.detail = cli.detail;
        } else {
            cli.detail = self.detail;
        }

        if let Some(f) = cli.flat {
            if f != self.flat {
                self.flat = f;
            }
        } else {
            cli.flat = Some(self.flat);
        }

        if let Some(f) = cli.span_based {
            if f != self.span_based {
                self.span_based = f;
            }
        } else {
            cli.span_based = Some(self.span_based);
        }
    }
}
