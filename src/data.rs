use crate::config::AppConfig;
use crate::types::{LoadedRecords, SchoolRecord};
use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, Xlsx, open_workbook};
use csv::ReaderBuilder;
use geo::Point;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Column positions in the school sheet
mod cols {
    pub const LOT: usize = 0;
    pub const REGION: usize = 1;
    pub const MUNICIPALITY: usize = 2;
    pub const SCHOOL_ID: usize = 3;
    pub const SCHOOL_NAME: usize = 4;
    pub const ADDRESS: usize = 5;
    pub const LATITUDE: usize = 6;
    pub const LONGITUDE: usize = 7;
    pub const WIFI_KITS: usize = 8;
    pub const EXTRA_APS: usize = 9;
    pub const BACKUP_POWER: usize = 10;
    pub const CORRECTED_GEO: usize = 11;
}

/// One spreadsheet row, normalized to trimmed text. Empty cells are `None`.
pub type Row = Vec<Option<String>>;

pub fn load_records(config: &AppConfig) -> Result<LoadedRecords> {
    let path = &config.input.spreadsheet;
    info!("Loading schools from {:?}", path);

    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Input spreadsheet has no extension: {:?}", path))?;

    let rows = match extension.as_str() {
        "xlsx" | "xlsm" => read_xlsx_rows(path, config.input.sheet.as_deref())?,
        "csv" => read_csv_rows(path)?,
        _ => return Err(anyhow!("Unsupported spreadsheet format: {}", extension)),
    };

    let loaded = collect_records(rows);
    info!(
        "Loaded {} schools across {} regions",
        loaded.records.len(),
        loaded.regions.len()
    );
    Ok(loaded)
}

/// Data rows only; the header row never reaches the parser.
pub fn collect_records<I>(rows: I) -> LoadedRecords
where
    I: IntoIterator<Item = Row>,
{
    let mut loaded = LoadedRecords::default();
    for row in rows {
        if let Some(record) = parse_row(&row) {
            loaded.push(record);
        }
    }
    loaded
}

/// `None` when latitude or longitude is missing or not a finite number.
pub fn parse_row(row: &[Option<String>]) -> Option<SchoolRecord> {
    let latitude = parse_coordinate(cell(row, cols::LATITUDE))?;
    let longitude = parse_coordinate(cell(row, cols::LONGITUDE))?;

    Some(SchoolRecord {
        lot: owned(row, cols::LOT),
        region: owned(row, cols::REGION).unwrap_or_default(),
        municipality: owned(row, cols::MUNICIPALITY),
        school_id: owned(row, cols::SCHOOL_ID),
        school_name: owned(row, cols::SCHOOL_NAME),
        address: owned(row, cols::ADDRESS),
        location: Point::new(longitude, latitude),
        wifi_kits: cell(row, cols::WIFI_KITS).and_then(parse_count),
        extra_access_points: owned(row, cols::EXTRA_APS),
        backup_power: owned(row, cols::BACKUP_POWER),
        corrected_geolocation: owned(row, cols::CORRECTED_GEO),
    })
}

fn cell(row: &[Option<String>], col: usize) -> Option<&str> {
    row.get(col).and_then(|c| c.as_deref())
}

fn owned(row: &[Option<String>], col: usize) -> Option<String> {
    cell(row, col).map(str::to_string)
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_count(value: &str) -> Option<i64> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    // "3.0" style counts
    value.parse::<f64>().ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

fn read_xlsx_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Row>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {:?}", path))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook.sheet_names()
            .first()
            .context("Excel file has no sheets")?
            .clone(),
    };
    debug!("Reading sheet {:?}", sheet_name);

    let range = workbook.worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    // calamine trims leading empty rows/columns; keep positions absolute
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows = Vec::new();

    for (idx, cells) in range.rows().enumerate() {
        if first_row as usize + idx == 0 {
            continue; // Header
        }
        let mut row: Row = vec![None; first_col as usize];
        row.extend(cells.iter().map(cell_text));
        rows.push(row);
    }

    Ok(rows)
}

fn cell_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("Failed to read CSV row in {:?}", path))?;
        rows.push(
            record.iter()
                .map(|field| {
                    let field = field.trim();
                    if field.is_empty() { None } else { Some(field.to_string()) }
                })
                .collect(),
        );
    }

    Ok(rows)
}
