use crate::boundary::BoundaryLayer;
use crate::color::{MarkerColor, color_for_kits};
use crate::config::AppConfig;
use crate::types::{LoadedRecords, SchoolRecord};
use anyhow::{Context, Result};
use geojson::GeoJson;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

const MISSING: &str = "N/A";

#[derive(Debug, Serialize)]
pub struct MapDocument {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tiles: TileLayer,
    pub popup_max_width: u32,
    pub groups: Vec<RegionGroup>,
    pub boundary: Option<BoundaryOverlay>,
    pub fullscreen: bool,
    pub layer_control_collapsed: bool,
}

#[derive(Debug, Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

/// One marker cluster per region code.
#[derive(Debug, Serialize)]
pub struct RegionGroup {
    pub region: String,
    pub label: String,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub color: MarkerColor,
    pub icon: String,
    pub popup: String,
}

#[derive(Debug, Serialize)]
pub struct BoundaryOverlay {
    pub name: String,
    pub data: GeoJson,
}

impl MapDocument {
    pub fn assemble(config: &AppConfig, loaded: LoadedRecords, boundary: Option<BoundaryLayer>) -> Self {
        // Seed every region so groups come out sorted even when empty
        let mut by_region: BTreeMap<String, Vec<Marker>> = loaded.regions
            .iter()
            .map(|region| (region.clone(), Vec::new()))
            .collect();

        for record in &loaded.records {
            let color = color_for_kits(record.wifi_kits);
            by_region.entry(record.region.clone())
                .or_default()
                .push(build_marker(record, color, &config.map.icon));
        }

        let groups: Vec<RegionGroup> = by_region.into_iter()
            .map(|(region, markers)| RegionGroup {
                label: if region.is_empty() { MISSING.to_string() } else { region.clone() },
                region,
                markers,
            })
            .collect();

        info!(
            "Assembled {} region groups with {} markers",
            groups.len(),
            loaded.records.len()
        );

        MapDocument {
            center: config.map.center,
            zoom: config.map.zoom,
            tiles: TileLayer {
                url: config.map.tiles.clone(),
                attribution: config.map.attribution.clone(),
            },
            popup_max_width: config.map.popup_max_width,
            groups,
            boundary: boundary.map(|b| BoundaryOverlay { name: b.name, data: b.geojson }),
            fullscreen: true,
            layer_control_collapsed: false,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.groups.iter().map(|g| g.markers.len()).sum()
    }

    pub fn to_html(&self) -> Result<String> {
        let json = serde_json::to_string(self).context("Failed to serialize map data")?;
        Ok(PAGE_TEMPLATE.replace("__MAP_DATA__", &script_safe_json(&json)))
    }
}

pub fn build_marker(record: &SchoolRecord, color: MarkerColor, icon: &str) -> Marker {
    Marker {
        lat: record.latitude(),
        lon: record.longitude(),
        color,
        icon: icon.to_string(),
        popup: popup_html(record),
    }
}

pub fn maps_search_link(record: &SchoolRecord) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        record.latitude(),
        record.longitude()
    )
}

pub fn popup_html(record: &SchoolRecord) -> String {
    let show = |value: &Option<String>| escape_html(value.as_deref().unwrap_or(MISSING));
    let kits = record.wifi_kits
        .map(|k| k.to_string())
        .unwrap_or_else(|| MISSING.to_string());
    let region = if record.region.is_empty() { MISSING } else { record.region.as_str() };

    let corrected = match record.corrected_geolocation.as_deref().map(str::trim) {
        Some(note) if !note.is_empty() => {
            format!("<p><b>Corrected geolocation:</b> {}</p>", escape_html(note))
        }
        _ => String::new(),
    };

    format!(
        r##"<div style="font-family: Arial, sans-serif; line-height: 1.5; padding: 10px;">
<h4 style="margin: 0; color: #2a9d8f;">{name}</h4>
<p style="margin-bottom: 5px;"><i>{municipality}</i>, {region}</p>
<p><b>Address:</b> {address}</p>
<p><b>Wi-Fi kits (estimated):</b> {kits}</p>
<p><b>Additional APs (estimated):</b> {aps}</p>
<p><b>Backup power:</b> {backup}</p>
{corrected}<p><a href="{link}" target="_blank" rel="noopener">Open in Google Maps</a></p>
</div>"##,
        name = show(&record.school_name),
        municipality = show(&record.municipality),
        region = escape_html(region),
        address = show(&record.address),
        kits = kits,
        aps = show(&record.extra_access_points),
        backup = show(&record.backup_power),
        corrected = corrected,
        link = escape_html(&maps_search_link(record)),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// `<` only occurs inside JSON strings, so the escape keeps the payload valid
// and nothing in it can close the surrounding <script> element.
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

pub fn save_map(document: &MapDocument, path: &Path) -> Result<()> {
    let html = document.to_html()?;
    fs::write(path, html).with_context(|| format!("Failed to write map to {:?}", path))?;
    info!("Wrote {} markers to {:?}", document.marker_count(), path);
    Ok(())
}

pub fn save_failure_message(err: &anyhow::Error) -> String {
    format!("Failed to save map: {:#}", err)
}

/// Saves the map and reports the outcome on the console. Save errors stop here.
pub fn save_and_report(document: &MapDocument, path: &Path) -> bool {
    match save_map(document, path) {
        Ok(()) => {
            println!("Map saved to {}", path.display());
            true
        }
        Err(e) => {
            eprintln!("{}", save_failure_message(&e));
            false
        }
    }
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>School map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css"/>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css"/>
  <link rel="stylesheet" href="https://netdna.bootstrapcdn.com/bootstrap/3.0.0/css/bootstrap-glyphicons.css"/>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css"/>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.css"/>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.min.js"></script>
  <style>
    html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
    #map { position: absolute; top: 0; bottom: 0; left: 0; right: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script type="application/json" id="map-data">__MAP_DATA__</script>
  <script>
    const doc = JSON.parse(document.getElementById("map-data").textContent);
    const map = L.map("map", { center: doc.center, zoom: doc.zoom });
    const base = L.tileLayer(doc.tiles.url, { attribution: doc.tiles.attribution, maxZoom: 19 }).addTo(map);
    const layers = L.control.layers({ "OpenStreetMap": base }, {}, { collapsed: doc.layer_control_collapsed });

    for (const group of doc.groups) {
      const cluster = L.markerClusterGroup();
      for (const m of group.markers) {
        const icon = L.AwesomeMarkers.icon({ icon: m.icon, markerColor: m.color, prefix: "glyphicon", iconColor: "white" });
        L.marker([m.lat, m.lon], { icon: icon })
          .bindPopup(m.popup, { maxWidth: doc.popup_max_width })
          .addTo(cluster);
      }
      cluster.addTo(map);
      layers.addOverlay(cluster, group.label);
    }

    if (doc.boundary) {
      const boundary = L.geoJSON(doc.boundary.data).addTo(map);
      layers.addOverlay(boundary, doc.boundary.name);
    }

    if (doc.fullscreen) {
      L.control.fullscreen({ position: "topleft" }).addTo(map);
    }
    layers.addTo(map);
  </script>
</body>
</html>
"##;
