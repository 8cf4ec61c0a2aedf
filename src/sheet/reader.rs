use crate::sheet::format::SheetFormat;
use crate::utils::{Result, VerifierError};
use calamine::{open_workbook_auto, Reader};
use std::path::{Path, PathBuf};

pub struct SheetReader {
    path: PathBuf,
}

impl SheetReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Header row plus every record, in file order. Workbooks are read from
    /// their first worksheet.
    pub fn read_all(&self) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        if !self.path.exists() {
            return Err(VerifierError::FileNotFound(self.path.display().to_string()));
        }

        match SheetFormat::from_path(&self.path) {
            SheetFormat::Csv => self.read_csv(),
            SheetFormat::Xlsx | SheetFormat::Xls => self.read_workbook(),
        }
    }

    fn read_csv(&self) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok((headers, records))
    }

    fn read_workbook(&self) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut workbook = open_workbook_auto(&self.path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            VerifierError::ConfigError(format!("{} has no worksheets", self.path.display()))
        })??;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
        let headers = rows.next().unwrap_or_default();
        Ok((headers, rows.collect()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
