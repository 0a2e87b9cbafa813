//! Fixed-column export layout shared by the CSV file and JSON output.
//!
//! Columns the site never publishes (executor, heir, fiduciary number, ...)
//! are kept so downstream spreadsheets keep their shape; they are always
//! blank.

use serde_json::{Map, Value};

use crate::detail::OutputRow;

/// Column keys in export order. `aggregated` is always last.
pub const EXPORT_COLUMNS: [&str; 44] = [
    "fiduciary_number",
    "court_file_number",
    "estate_number",
    "case_number",
    "county_jurisdiction",
    "date_of_filing",
    "date_of_will",
    "type",
    "status",
    "will",
    "decedent",
    "date_of_death",
    "decedent_address",
    "executor_first_name",
    "executor_last_name",
    "administrator_first_name",
    "administrator_last_name",
    "pow_first_name",
    "pow_last_name",
    "subscriber_first_name",
    "subscriber_last_name",
    "pr_first_name",
    "pr_middle_name",
    "pr_last_name",
    "pr_address",
    "pr_city",
    "pr_state",
    "pr_zip",
    "heir_1_first_name",
    "heir_1_last_name",
    "relationship_1",
    "age_1",
    "address_1",
    "city_1",
    "state_1",
    "zip_1",
    "attorney_first_name",
    "attorney_last_name",
    "attorney_address",
    "attorney_city",
    "attorney_state",
    "attorney_zip",
    "url",
    "aggregated",
];

pub const AGGREGATED_COLUMN: &str = "aggregated";

fn column_value<'a>(row: &'a OutputRow, column: &str) -> &'a str {
    let case = &row.case;
    let attorney = &row.attorney;
    let rep = &row.representative;
    match column {
        "estate_number" => &case.estate_number,
        "county_jurisdiction" => &case.county,
        "date_of_filing" => &case.date_of_filing,
        "date_of_will" => &case.date_of_will,
        "type" => &case.case_type,
        "status" => &case.status,
        "will" => &case.will,
        "decedent" => &case.decedent,
        "date_of_death" => &case.date_of_death,
        "decedent_address" => &case.decedent_address,
        "pr_first_name" => &rep.first_name,
        "pr_middle_name" => &rep.middle_name,
        "pr_last_name" => &rep.last_name,
        "pr_address" => &rep.location.address,
        "pr_city" => &rep.location.city,
        "pr_state" => &rep.location.state,
        "pr_zip" => &rep.location.zip,
        "attorney_first_name" => &attorney.first_name,
        "attorney_last_name" => &attorney.last_name,
        "attorney_address" => &attorney.location.address,
        "attorney_city" => &attorney.location.city,
        "attorney_state" => &attorney.location.state,
        "attorney_zip" => &attorney.location.zip,
        "url" => &case.url,
        _ => "",
    }
}

/// Human-readable header: `pr_first_name` becomes `PR First Name`.
pub fn export_header(column: &str) -> String {
    let titled = column
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");
    if titled.starts_with("Pr ") {
        titled.replacen("Pr ", "PR ", 1)
    } else {
        titled
    }
}

pub fn export_headers() -> Vec<String> {
    EXPORT_COLUMNS.iter().map(|c| export_header(c)).collect()
}

/// Values of one row in [`EXPORT_COLUMNS`] order, ending with the
/// `key:value;` digest of every other column.
pub fn export_record(row: &OutputRow) -> Vec<String> {
    let mut values: Vec<String> = EXPORT_COLUMNS
        .iter()
        .filter(|column| **column != AGGREGATED_COLUMN)
        .map(|column| column_value(row, column).to_string())
        .collect();
    let aggregated: String = EXPORT_COLUMNS
        .iter()
        .zip(&values)
        .map(|(column, value)| format!("{}:{};", column, value))
        .collect();
    values.push(aggregated);
    values
}

/// One JSON object per row, keyed by column.
pub fn export_json(rows: &[OutputRow]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let object: Map<String, Value> = EXPORT_COLUMNS
                .iter()
                .zip(export_record(row))
                .map(|(column, value)| (column.to_string(), Value::String(value)))
                .collect();
            Value::Object(object)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::extract_case_rows;

    const TWO_REPS: &str = include_str!("../../mdprobate_api/tests/fixtures/detail_two_reps.html");

    fn sample_rows() -> Vec<OutputRow> {
        extract_case_rows(TWO_REPS, "https://example.test/case?RecordId=1001")
    }

    #[test]
    fn columns_are_unique_and_aggregated_last() {
        let unique: std::collections::HashSet<_> = EXPORT_COLUMNS.iter().collect();
        assert_eq!(unique.len(), EXPORT_COLUMNS.len());
        assert_eq!(EXPORT_COLUMNS[EXPORT_COLUMNS.len() - 1], AGGREGATED_COLUMN);
    }

    #[test]
    fn headers_are_title_case_with_pr_prefix() {
        assert_eq!(export_header("pr_first_name"), "PR First Name");
        assert_eq!(export_header("pr_zip"), "PR Zip");
        assert_eq!(export_header("heir_1_first_name"), "Heir 1 First Name");
        assert_eq!(export_header("date_of_will"), "Date Of Will");
        assert_eq!(export_header("pow_last_name"), "Pow Last Name");
        assert_eq!(export_header("url"), "Url");
        assert_eq!(export_headers().len(), 44);
    }

    #[test]
    fn record_maps_row_fields() {
        let rows = sample_rows();
        let record = export_record(&rows[0]);
        assert_eq!(record.len(), EXPORT_COLUMNS.len());
        let value = |column: &str| {
            let idx = EXPORT_COLUMNS.iter().position(|c| *c == column).unwrap();
            record[idx].clone()
        };
        assert_eq!(value("estate_number"), "03-0001");
        assert_eq!(value("county_jurisdiction"), "Baltimore");
        assert_eq!(value("type"), "Regular Estate");
        assert_eq!(value("pr_middle_name"), "Q");
        assert_eq!(value("pr_zip"), "21201");
        assert_eq!(value("attorney_city"), "BALTIMORE");
        assert_eq!(value("executor_first_name"), "");
        assert_eq!(value("url"), "https://example.test/case?RecordId=1001");
    }

    #[test]
    fn aggregated_lists_every_other_column() {
        let rows = sample_rows();
        let record = export_record(&rows[1]);
        let aggregated = record.last().unwrap();
        assert!(aggregated
            .starts_with("fiduciary_number:;court_file_number:;estate_number:03-0001;"));
        assert!(aggregated
            .contains(";pr_first_name:MARK;pr_middle_name:VAN;pr_last_name:DER BERG;"));
        assert!(aggregated.ends_with("url:https://example.test/case?RecordId=1001;"));
        assert_eq!(aggregated.matches(';').count(), EXPORT_COLUMNS.len() - 1);
    }

    #[test]
    fn json_objects_carry_every_column() {
        let json = export_json(&sample_rows());
        assert_eq!(json.len(), 2);
        let object = json[0].as_object().unwrap();
        assert_eq!(object.len(), EXPORT_COLUMNS.len());
        assert_eq!(object["decedent"], "JOHN DOE");
    }
}
