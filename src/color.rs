use serde::Serialize;

/// Marker palette understood by Leaflet.awesome-markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Blue,
    Green,
    Purple,
    Orange,
    DarkRed,
    LightRed,
    Beige,
    DarkBlue,
    DarkGreen,
    CadetBlue,
    DarkPurple,
    White,
    Pink,
    LightBlue,
    LightGreen,
    Gray,
}

impl MarkerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerColor::Blue => "blue",
            MarkerColor::Green => "green",
            MarkerColor::Purple => "purple",
            MarkerColor::Orange => "orange",
            MarkerColor::DarkRed => "darkred",
            MarkerColor::LightRed => "lightred",
            MarkerColor::Beige => "beige",
            MarkerColor::DarkBlue => "darkblue",
            MarkerColor::DarkGreen => "darkgreen",
            MarkerColor::CadetBlue => "cadetblue",
            MarkerColor::DarkPurple => "darkpurple",
            MarkerColor::White => "white",
            MarkerColor::Pink => "pink",
            MarkerColor::LightBlue => "lightblue",
            MarkerColor::LightGreen => "lightgreen",
            MarkerColor::Gray => "gray",
        }
    }
}

/// Color for an estimated Wi-Fi kit count. Anything outside 1..=15 is gray.
pub fn color_for_kits(kits: Option<i64>) -> MarkerColor {
    match kits {
        Some(1) => MarkerColor::Blue,
        Some(2) => MarkerColor::Green,
        Some(3) => MarkerColor::Purple,
        Some(4) => MarkerColor::Orange,
        Some(5) => MarkerColor::DarkRed,
        Some(6) => MarkerColor::LightRed,
        Some(7) => MarkerColor::Beige,
        Some(8) => MarkerColor::DarkBlue,
        Some(9) => MarkerColor::DarkGreen,
        Some(10) => MarkerColor::CadetBlue,
        Some(11) => MarkerColor::DarkPurple,
        Some(12) => MarkerColor::White,
        Some(13) => MarkerColor::Pink,
        Some(14) => MarkerColor::LightBlue,
        Some(15) => MarkerColor::LightGreen,
        _ => MarkerColor::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entries() {
        assert_eq!(color_for_kits(Some(1)), MarkerColor::Blue);
        assert_eq!(color_for_kits(Some(3)), MarkerColor::Purple);
        assert_eq!(color_for_kits(Some(6)), MarkerColor::LightRed);
        assert_eq!(color_for_kits(Some(15)), MarkerColor::LightGreen);
        assert_eq!(color_for_kits(Some(3)).as_str(), "purple");
    }

    #[test]
    fn outside_table_is_gray() {
        for kits in [None, Some(0), Some(-3), Some(16), Some(1_000)] {
            assert_eq!(color_for_kits(kits), MarkerColor::Gray, "{:?}", kits);
        }
    }

    #[test]
    fn every_mapped_count_is_distinct_and_not_gray() {
        let colors: Vec<MarkerColor> = (1..=15).map(|k| color_for_kits(Some(k))).collect();
        for (i, color) in colors.iter().enumerate() {
            assert_ne!(*color, MarkerColor::Gray);
            assert!(!colors[i + 1..].contains(color));
        }
    }

    #[test]
    fn serializes_as_palette_name() {
        let json = serde_json::to_string(&MarkerColor::DarkPurple).unwrap();
        assert_eq!(json, "\"darkpurple\"");
        for kits in 1..=15 {
            let color = color_for_kits(Some(kits));
            assert_eq!(
                serde_json::to_string(&color).unwrap(),
                format!("\"{}\"", color.as_str())
            );
        }
    }
}
