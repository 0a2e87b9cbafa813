use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use mdprobate_lib::export::{export_headers, export_json, export_record};
use mdprobate_lib::{LocationParts, OutputRow};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

const EXPORT_FILE_PREFIX: &str = "MD Probate Extracted Data";

/// Condensed view of a row for terminal tables; the full column set goes to
/// CSV and JSON.
#[derive(Tabled, Serialize)]
struct CaseSummaryRow {
    #[tabled(rename = "Estate")]
    #[serde(rename = "Estate")]
    estate_number: String,
    #[tabled(rename = "County")]
    #[serde(rename = "County")]
    county: String,
    #[tabled(rename = "Filed")]
    #[serde(rename = "Filed")]
    date_of_filing: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    case_type: String,
    #[tabled(rename = "Decedent")]
    #[serde(rename = "Decedent")]
    decedent: String,
    #[tabled(rename = "Personal Rep")]
    #[serde(rename = "Personal Rep")]
    representative: String,
    #[tabled(rename = "PR Location")]
    #[serde(rename = "PR Location")]
    representative_location: String,
    #[tabled(rename = "Attorney")]
    #[serde(rename = "Attorney")]
    attorney: String,
}

#[derive(Tabled, Serialize)]
struct LocationRow {
    #[tabled(rename = "Address")]
    #[serde(rename = "Address")]
    address: String,
    #[tabled(rename = "City")]
    #[serde(rename = "City")]
    city: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "Zip")]
    #[serde(rename = "Zip")]
    zip: String,
}

// -- Row builders --

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_summary_rows(rows: &[OutputRow]) -> Vec<CaseSummaryRow> {
    rows.iter()
        .map(|r| {
            let rep = &r.representative;
            let city_state =
                join_nonempty(&[rep.location.city.as_str(), rep.location.state.as_str()]);
            CaseSummaryRow {
                estate_number: r.case.estate_number.clone(),
                county: r.case.county.clone(),
                date_of_filing: r.case.date_of_filing.clone(),
                case_type: r.case.case_type.clone(),
                decedent: r.case.decedent.clone(),
                representative: join_nonempty(&[
                    rep.first_name.as_str(),
                    rep.middle_name.as_str(),
                    rep.last_name.as_str(),
                ]),
                representative_location: if city_state.is_empty() {
                    rep.location.address.clone()
                } else {
                    city_state
                },
                attorney: join_nonempty(&[
                    r.attorney.first_name.as_str(),
                    r.attorney.last_name.as_str(),
                ]),
            }
        })
        .collect()
}

fn build_location_row(parts: &LocationParts) -> LocationRow {
    LocationRow {
        address: parts.address.clone(),
        city: parts.city.clone(),
        state: parts.state.clone(),
        zip: parts.zip.clone(),
    }
}

// -- Rows --

pub fn print_rows(rows: &[OutputRow], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(build_summary_rows(rows))),
        OutputFormat::Markdown => {
            let mut table = Table::new(build_summary_rows(rows));
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&export_json(rows)),
        OutputFormat::Csv => write_export_csv(std::io::stdout(), rows)?,
    }
    Ok(())
}

pub fn print_location(parts: &LocationParts, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new([build_location_row(parts)])),
        OutputFormat::Markdown => {
            let mut table = Table::new([build_location_row(parts)]);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Json => print_json(parts),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.serialize(build_location_row(parts))?;
            wtr.flush()?;
        }
    }
    Ok(())
}

// -- Export file --

/// `MD Probate Extracted Data_<MMDDYYYY_HHMMSS>.csv`
pub fn export_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.csv",
        EXPORT_FILE_PREFIX,
        timestamp.format("%m%d%Y_%H%M%S")
    )
}

/// Writes the header line and one record per row in export column order.
pub fn write_export_csv<W: Write>(writer: W, rows: &[OutputRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(export_headers())?;
    for row in rows {
        wtr.write_record(export_record(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Creates the timestamped export file in `dir` and returns its path.
pub fn save_export(dir: &Path, rows: &[OutputRow], timestamp: NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(export_file_name(timestamp));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_export_csv(file, rows)?;
    Ok(path)
}

// -- JSON output --

pub fn print_json<T: serde::Serialize + ?Sized>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mdprobate_lib::extract_case_rows;
    use mdprobate_lib::location::parse_location;

    const URL: &str =
        "https://registers.maryland.gov/RowNetWeb/Estates/frmDocketImages.aspx?src=row&RecordId=1001";

    fn load_rows() -> Vec<OutputRow> {
        let html = include_str!("../../mdprobate_api/tests/fixtures/detail_two_reps.html");
        extract_case_rows(html, URL)
    }

    #[test]
    fn test_export_file_name_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        assert_eq!(
            export_file_name(ts),
            "MD Probate Extracted Data_03052024_140709.csv"
        );
    }

    #[test]
    fn test_build_summary_rows_mapping() {
        let rows = build_summary_rows(&load_rows());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].estate_number, "03-0001");
        assert_eq!(rows[0].county, "Baltimore");
        assert_eq!(rows[0].representative, "JANE Q DOE");
        assert_eq!(rows[0].representative_location, "Baltimore MD");
        assert_eq!(rows[0].attorney, "ROBERT KLEIN");
        assert_eq!(rows[1].representative, "MARK VAN DER BERG");
    }

    #[test]
    fn test_summary_falls_back_to_address() {
        let html = include_str!("../../mdprobate_api/tests/fixtures/detail_one_rep.html");
        let rows = build_summary_rows(&extract_case_rows(html, URL));
        assert_eq!(rows[0].representative_location, "PO BOX 12345");
        assert_eq!(rows[0].attorney, "");
    }

    #[test]
    fn test_build_summary_rows_empty() {
        assert!(build_summary_rows(&[]).is_empty());
    }

    #[test]
    fn test_csv_export_headers_and_records() {
        let mut buf = Vec::new();
        write_export_csv(&mut buf, &load_rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 44);
        assert_eq!(&headers[0], "Fiduciary Number");
        assert_eq!(&headers[21], "PR First Name");
        assert_eq!(&headers[43], "Aggregated");

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][2], "03-0001");
        assert_eq!(&records[0][22], "Q");
        assert_eq!(&records[1][23], "DER BERG");
        assert_eq!(&records[0][38], "10 LIGHT ST, STE 400");
        assert_eq!(&records[0][42], URL);
    }

    #[test]
    fn test_save_export_writes_file() {
        let dir = std::env::temp_dir();
        let ts = NaiveDate::from_ymd_opt(2001, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap();
        let path = save_export(&dir, &load_rows(), ts).unwrap();
        assert!(path.ends_with("MD Probate Extracted Data_02032001_040506.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_markdown_table_has_pipes() {
        let mut table = Table::new(build_summary_rows(&load_rows()));
        table.with(Style::markdown());
        let rendered = table.to_string();
        assert!(rendered.contains("| Estate"));
        assert!(rendered.contains("03-0001"));
    }

    #[test]
    fn test_location_row_mapping() {
        let row = build_location_row(&parse_location("123 Main St, Baltimore, MD 21201-4444"));
        assert_eq!(row.address, "123 Main St");
        assert_eq!(row.city, "Baltimore");
        assert_eq!(row.state, "MD");
        assert_eq!(row.zip, "21201");
    }
}
