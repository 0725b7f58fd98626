use geo::Point;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SchoolRecord {
    pub lot: Option<String>,
    pub region: String, // Empty when the row has no region code
    pub municipality: Option<String>,
    pub school_id: Option<String>,
    pub school_name: Option<String>,
    pub address: Option<String>,
    pub location: Point<f64>, // x = longitude, y = latitude
    pub wifi_kits: Option<i64>,
    pub extra_access_points: Option<String>,
    pub backup_power: Option<String>,
    pub corrected_geolocation: Option<String>,
}

impl SchoolRecord {
    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<SchoolRecord>,
    pub regions: BTreeSet<String>,
}

impl LoadedRecords {
    pub fn push(&mut self, record: SchoolRecord) {
        self.regions.insert(record.region.clone());
        self.records.push(record);
    }
}
