use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_BOUNDARY_SOURCE: &str =
    "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/brazil-states.geojson";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub boundary: BoundaryConfig,
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub spreadsheet: PathBuf,
    pub sheet: Option<String>, // First sheet when unset
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub html: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    pub enabled: bool,
    pub source: String, // URL or local GeoJSON path
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center: [f64; 2], // [lat, lon]
    pub zoom: u8,
    pub tiles: String,
    pub attribution: String,
    pub icon: String,
    pub popup_max_width: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            spreadsheet: PathBuf::from("rampa.xlsx"),
            sheet: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: PathBuf::from("mapa_escolas_com_limites.html"),
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: DEFAULT_BOUNDARY_SOURCE.to_string(),
            name: "State boundaries".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [-15.788, -47.879],
            zoom: 4,
            tiles: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            icon: "cloud".to_string(),
            popup_max_width: 300,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration: {:?}", path))?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise `config.toml` is picked up when
    /// present and the built-in defaults are used when it isn't.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load_from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn with_overrides(mut self, input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input.spreadsheet = input;
        }
        if let Some(output) = output {
            self.output.html = output;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_fixed_file_names() {
        let config = AppConfig::default();
        assert_eq!(config.input.spreadsheet, PathBuf::from("rampa.xlsx"));
        assert_eq!(config.output.html, PathBuf::from("mapa_escolas_com_limites.html"));
        assert!(config.boundary.enabled);
        assert_eq!(config.boundary.source, DEFAULT_BOUNDARY_SOURCE);
        assert_eq!(config.map.center, [-15.788, -47.879]);
        assert_eq!(config.map.zoom, 4);
        assert_eq!(config.map.popup_max_width, 300);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[input]
spreadsheet = "schools.csv"

[boundary]
enabled = false

[map]
zoom = 6
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.input.spreadsheet, PathBuf::from("schools.csv"));
        assert_eq!(config.input.sheet, None);
        assert!(!config.boundary.enabled);
        assert_eq!(config.boundary.name, "State boundaries");
        assert_eq!(config.map.zoom, 6);
        assert_eq!(config.map.icon, "cloud");
        assert_eq!(config.output.html, PathBuf::from("mapa_escolas_com_limites.html"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope.toml");
        let err = AppConfig::resolve(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[map]\nzoom = \"far\"\n").unwrap();
        assert!(AppConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn cli_overrides_replace_paths() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("in.csv")),
            Some(PathBuf::from("out/map.html")),
        );
        assert_eq!(config.input.spreadsheet, PathBuf::from("in.csv"));
        assert_eq!(config.output.html, PathBuf::from("out/map.html"));

        let untouched = AppConfig::default().with_overrides(None, None);
        assert_eq!(untouched.input.spreadsheet, PathBuf::from("rampa.xlsx"));
    }
}
