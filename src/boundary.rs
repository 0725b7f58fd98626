use crate::config::AppConfig;
use anyhow::{Context, Result, anyhow};
use geojson::GeoJson;
use std::fs;
use tracing::info;

#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    pub name: String,
    pub geojson: GeoJson,
}

pub fn load_boundary(config: &AppConfig) -> Result<Option<BoundaryLayer>> {
    if !config.boundary.enabled {
        info!("Boundary overlay disabled");
        return Ok(None);
    }

    let source = config.boundary.source.as_str();
    let body = if is_remote(source) {
        fetch_remote(source)?
    } else {
        info!("Loading boundaries from {:?}...", source);
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read boundary file: {:?}", source))?
    };

    let geojson = parse_geojson(&body)
        .with_context(|| format!("Failed to parse boundary GeoJSON from {}", source))?;

    Ok(Some(BoundaryLayer {
        name: config.boundary.name.clone(),
        geojson,
    }))
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// Blocking, single attempt.
fn fetch_remote(url: &str) -> Result<String> {
    info!("Fetching boundaries from {}", url);
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to fetch boundaries: {}", url))?
        .error_for_status()
        .with_context(|| format!("Boundary request rejected: {}", url))?;
    response.text()
        .with_context(|| format!("Failed to read boundary response body: {}", url))
}

fn parse_geojson(body: &str) -> Result<GeoJson> {
    let geojson: GeoJson = body.parse()
        .map_err(|e| anyhow!("Invalid GeoJSON: {}", e))?;
    if let GeoJson::FeatureCollection(fc) = &geojson {
        info!("Boundary overlay has {} features", fc.features.len());
    }
    Ok(geojson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Distrito Federal"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-48.2, -15.5], [-47.3, -15.5], [-47.3, -16.0], [-48.2, -16.0], [-48.2, -15.5]]]
            }
        }]
    }"#;

    fn local_config(source: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.boundary.source = source.to_string();
        config
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.org/states.geojson"));
        assert!(is_remote("HTTP://example.org/states.geojson"));
        assert!(!is_remote("data/states.geojson"));
        assert!(!is_remote("/tmp/https.geojson"));
    }

    #[test]
    fn loads_local_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("states.geojson");
        fs::write(&path, STATES).unwrap();

        let layer = load_boundary(&local_config(path.to_str().unwrap()))
            .unwrap()
            .unwrap();
        assert_eq!(layer.name, "State boundaries");
        match layer.geojson {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn disabled_overlay_is_none() {
        let mut config = AppConfig::default();
        config.boundary.enabled = false;
        assert!(load_boundary(&config).unwrap().is_none());
    }

    #[test]
    fn invalid_geojson_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.geojson");
        fs::write(&path, r#"{"type": "Nonsense"}"#).unwrap();

        let err = load_boundary(&local_config(path.to_str().unwrap())).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse boundary GeoJSON"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("absent.geojson");
        assert!(load_boundary(&local_config(path.to_str().unwrap())).is_err());
    }
}
