//! CSV export of business records
//!
//! Columns follow a fixed preferred order and a column is only written when
//! at least one record has a value for it (`Name` is always written).

use super::{OutputError, OutputResult};
use crate::record::{BusinessRecord, SearchQuery};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output columns in preferred order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Phone,
    Email,
    Website,
    Location,
    County,
    Categories,
    Description,
    AdditionalPhones,
    AdditionalEmails,
    DetailUrl,
}

const COLUMN_ORDER: [Column; 11] = [
    Column::Name,
    Column::Phone,
    Column::Email,
    Column::Website,
    Column::Location,
    Column::County,
    Column::Categories,
    Column::Description,
    Column::AdditionalPhones,
    Column::AdditionalEmails,
    Column::DetailUrl,
];

impl Column {
    fn header(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Website => "Website",
            Self::Location => "Location",
            Self::County => "County",
            Self::Categories => "Categories",
            Self::Description => "Description",
            Self::AdditionalPhones => "Additional Phones",
            Self::AdditionalEmails => "Additional Emails",
            Self::DetailUrl => "Detail URL",
        }
    }

    fn value(&self, record: &BusinessRecord) -> String {
        match self {
            Self::Name => record.name.clone(),
            Self::Phone => record.phone.clone().unwrap_or_default(),
            Self::Email => record.email.clone().unwrap_or_default(),
            Self::Website => record.website.clone().unwrap_or_default(),
            Self::Location => record.location.clone(),
            Self::County => record.county.clone().unwrap_or_default(),
            Self::Categories => record.categories.clone().unwrap_or_default(),
            Self::Description => record.description.clone().unwrap_or_default(),
            Self::AdditionalPhones => record.additional_phones.join("; "),
            Self::AdditionalEmails => record.additional_emails.join("; "),
            Self::DetailUrl => record.detail_url.clone().unwrap_or_default(),
        }
    }
}

/// Picks the columns that have at least one value
fn present_columns(records: &[BusinessRecord]) -> Vec<Column> {
    COLUMN_ORDER
        .iter()
        .copied()
        .filter(|column| {
            *column == Column::Name || records.iter().any(|r| !column.value(r).is_empty())
        })
        .collect()
}

/// Writes records as CSV to any writer
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows written
/// * `Err(OutputError)` - Writing failed
pub fn write_records<W: Write>(records: &[BusinessRecord], writer: W) -> OutputResult<usize> {
    let columns = present_columns(records);
    let mut csv_writer = ::csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|c| c.header()))?;
    for record in records {
        csv_writer.write_record(columns.iter().map(|c| c.value(record)))?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}

/// Writes records to a CSV file, creating parent directories as needed
pub fn write_records_csv(records: &[BusinessRecord], path: &Path) -> OutputResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(path).map_err(|e| {
        OutputError::Write(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let written = write_records(records, file)?;

    tracing::info!("Wrote {} records to {}", written, path.display());
    Ok(written)
}

/// Builds `business_data_<subject>_<location>_<timestamp>.csv` under `directory`
pub fn default_output_path(query: &SearchQuery, directory: &Path) -> PathBuf {
    let subject = if query.subject().is_empty() {
        "all".to_string()
    } else {
        file_component(query.subject())
    };
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    directory.join(format!(
        "business_data_{}_{}_{}.csv",
        subject,
        file_component(query.location()),
        timestamp
    ))
}

fn file_component(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
