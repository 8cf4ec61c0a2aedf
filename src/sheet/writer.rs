use crate::sheet::format::SheetFormat;
use crate::utils::{Result, VerifierError};
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Full rewrite of a sheet file, as CSV or `.xlsx` depending on the target's
/// extension.
///
/// Records go to a hidden sibling file first which is then renamed over the
/// target, so an interrupted write leaves the previous version intact.
pub struct SheetWriter<'a> {
    path: &'a Path,
    headers: &'a [String],
}

impl<'a> SheetWriter<'a> {
    pub fn new(path: &'a Path, headers: &'a [String]) -> Self {
        Self { path, headers }
    }

    pub fn write_all(&self, records: &[Vec<String>]) -> Result<()> {
        let format = SheetFormat::ensure_writable(self.path)?;
        let tmp_path = self.staging_path();

        let written = match format {
            SheetFormat::Xlsx => self.write_workbook(&tmp_path, records),
            _ => self.write_csv(&tmp_path, records),
        };

        written
            .and_then(|_| std::fs::rename(&tmp_path, self.path))
            .map_err(|source| {
                let _ = std::fs::remove_file(&tmp_path);
                VerifierError::PersistFailed {
                    path: self.path.display().to_string(),
                    source,
                }
            })
    }

    fn write_csv(&self, tmp_path: &Path, records: &[Vec<String>]) -> std::io::Result<()> {
        let file = File::create(tmp_path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(self.headers)?;
        for record in records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }

    fn write_workbook(&self, tmp_path: &Path, records: &[Vec<String>]) -> std::io::Result<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        let rows = std::iter::once(self.headers).chain(records.iter().map(Vec::as_slice));
        for (row, cells) in rows.enumerate() {
            let row = u32::try_from(row).map_err(std::io::Error::other)?;
            for (col, cell) in cells.iter().enumerate() {
                let col = u16::try_from(col).map_err(std::io::Error::other)?;
                sheet
                    .write_string(row, col, cell)
                    .map_err(std::io::Error::other)?;
            }
        }

        workbook.save(tmp_path).map_err(std::io::Error::other)
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sheet".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}
