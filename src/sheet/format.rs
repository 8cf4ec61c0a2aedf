use crate::utils::{Result, VerifierError};
use std::path::Path;

/// On-disk sheet format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
    /// Legacy binary workbook: readable, never written.
    Xls,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" => SheetFormat::Xlsx,
            "xls" => SheetFormat::Xls,
            _ => SheetFormat::Csv,
        }
    }

    pub fn ensure_writable(path: &Path) -> Result<Self> {
        match Self::from_path(path) {
            SheetFormat::Xls => Err(VerifierError::ConfigError(format!(
                ".xls workbooks cannot be written, use an .xlsx output: {}",
                path.display()
            ))),
            format => Ok(format),
        }
    }
}
