use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::column::{Column, ColumnSet};
use super::dataset::Dataset;
use super::value::{Datatype, Value};
use super::vector::Vector;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with column names, one record per row
/// * `.json` – `[{ "country": "us", "gdp": 100 }, ...]`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    match ext.as_str() {
        "csv" => read_csv(file),
        "json" => read_json(file),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV reader / writer
// ---------------------------------------------------------------------------

/// Read a CSV document, inferring column types.
///
/// A column is NUMERIC when every non-empty cell parses as a number,
/// STRING otherwise. Empty cells are `Missing`.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let (headers, records) = read_records(reader)?;

    let columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let numeric = records.iter().all(|rec| {
                let cell = rec[i].trim();
                cell.is_empty() || cell.parse::<f64>().is_ok()
            });
            Column::new(i, name.as_str(), if numeric { Datatype::Numeric } else { Datatype::String })
        })
        .collect();
    let columns = ColumnSet::new(columns).context("building CSV schema")?;

    let rows = parse_rows(&columns, &records)?;
    Ok(Dataset::new(columns, rows)?)
}

/// Read a CSV document against a known schema; each cell goes through its
/// column's parser. The header must list the schema's names, in order.
pub fn read_csv_with_schema<R: Read>(reader: R, columns: &ColumnSet) -> Result<Dataset> {
    let (headers, records) = read_records(reader)?;
    if !headers.iter().map(String::as_str).eq(columns.names()) {
        bail!(
            "CSV header {headers:?} does not match schema {:?}",
            columns.names().collect::<Vec<_>>()
        );
    }
    let rows = parse_rows(columns, &records)?;
    Ok(Dataset::new(columns.clone(), rows)?)
}

fn read_records<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} cells but {} columns",
                record.len(),
                headers.len()
            );
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, records))
}

fn parse_rows(columns: &ColumnSet, records: &[Vec<String>]) -> Result<Vec<Vector>> {
    records
        .iter()
        .enumerate()
        .map(|(row_no, rec)| {
            columns
                .iter()
                .zip(rec)
                .map(|(col, cell)| {
                    col.parse_value(cell)
                        .with_context(|| format!("Row {row_no}, column {}", col.name()))
                })
                .collect::<Result<Vector>>()
        })
        .collect()
}

/// Write a dataset as CSV: a header row, then one record per row with each
/// cell rendered by its column's format hook. `Missing` is an empty cell.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(dataset.columns().names())
        .context("writing CSV header")?;
    for (row_no, row) in dataset.iter().enumerate() {
        let cells = dataset.columns().iter().zip(row).map(|(col, v)| {
            if v.is_missing() {
                String::new()
            } else {
                col.format_value(v)
            }
        });
        writer
            .write_record(cells)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "us", "gdp": 100, "year": 2000 },
///   { "country": "uk", "gdp": null, "year": 2000 }
/// ]
/// ```
///
/// Columns are the union of the record keys, in first-seen order. A column
/// holding only numbers (and nulls) is NUMERIC; anything else is STRING.
pub fn read_json<R: Read>(reader: R) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_reader(reader).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let cells = records.iter().filter_map(|r| r.get(name));
        let numeric = cells.clone().all(|v| v.is_number() || v.is_null());
        if !numeric && cells.clone().any(JsonValue::is_number) {
            log::warn!("JSON column {name:?} mixes numbers and text; reading it as STRING");
        }
        let datatype = if numeric { Datatype::Numeric } else { Datatype::String };
        columns.push(Column::new(i, name.as_str(), datatype));
    }
    let columns = ColumnSet::new(columns).context("building JSON schema")?;

    let rows = records
        .iter()
        .map(|rec| {
            columns
                .iter()
                .map(|col| json_to_value(rec.get(col.name()), col.datatype()))
                .collect::<Vector>()
        })
        .collect();
    Ok(Dataset::new(columns, rows)?)
}

fn json_to_value(val: Option<&JsonValue>, datatype: Datatype) -> Value {
    match val {
        None | Some(JsonValue::Null) => Value::Missing,
        Some(JsonValue::Number(n)) if datatype == Datatype::Numeric => {
            n.as_f64().map_or(Value::Missing, Value::Numeric)
        }
        Some(JsonValue::String(s)) => Value::Text(s.clone()),
        Some(other) => Value::Text(other.to_string()),
    }
}
