//! Record sinks. The CSV sink reopens its file in append mode for every row, so nothing
//! stays open between writes.

use crate::error::Result;
use crate::models::{CSV_FIELDNAMES, Record};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

// ── Sink trait ────────────────────────────────────────────────────────────────

pub trait RecordSink {
    fn append(&mut self, record: &Record) -> Result<()>;
}

/// Collects records in memory.
impl RecordSink for Vec<Record> {
    fn append(&mut self, record: &Record) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

// ── CSV file ──────────────────────────────────────────────────────────────────

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Truncate `path` and write the header row. Data from a previous run is lost.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record(CSV_FIELDNAMES)?;
        writer.flush()?;

        info!("Writing records to {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &Record) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;

    fn temp_csv(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("detmir-dolls-{}", std::process::id()))
            .join(name)
    }

    fn record(id: u64, price: Price, promo_price: Price) -> Record {
        Record {
            id,
            title: format!("Кукла {id}"),
            price,
            promo_price,
            link: format!("https://www.detmir.ru/product/index/id/{id}/"),
        }
    }

    #[test]
    fn test_header_then_rows_in_order() {
        let path = temp_csv("rows.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        sink.append(&record(2, Price::Amount(2599), Price::Amount(1999))).unwrap();
        sink.append(&record(1, Price::NotAvailable, Price::Empty)).unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            text,
            "id,title,price,promo_price,link\n\
             2,Кукла 2,2599,1999,https://www.detmir.ru/product/index/id/2/\n\
             1,Кукла 1,N/A,,https://www.detmir.ru/product/index/id/1/\n"
        );
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let path = temp_csv("truncate.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        sink.append(&record(5, Price::Amount(10), Price::Empty)).unwrap();

        let sink = CsvSink::create(&path).unwrap();
        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(text, "id,title,price,promo_price,link\n");
    }
}
