use crate::sheet::layout::ColumnLayout;
use crate::utils::{ColumnConfig, Result, VerifierError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    #[default]
    Unset,
    Success,
    Fail,
}

impl RowStatus {
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.eq_ignore_ascii_case("success") {
            RowStatus::Success
        } else if cell.eq_ignore_ascii_case("fail") {
            RowStatus::Fail
        } else {
            RowStatus::Unset
        }
    }

    pub fn as_cell(&self) -> &'static str {
        match self {
            RowStatus::Unset => "",
            RowStatus::Success => "Success",
            RowStatus::Fail => "Fail",
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Unset => write!(f, "unset"),
            RowStatus::Success => write!(f, "success"),
            RowStatus::Fail => write!(f, "fail"),
        }
    }
}

/// Borrowed view of one record, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
    layout: &'a ColumnLayout,
}

impl<'a> Row<'a> {
    pub fn get(self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cells.get(idx).map(String::as_str)
    }

    pub fn before(self) -> &'a str {
        &self.cells[self.layout.before]
    }

    pub fn after(self) -> &'a str {
        &self.cells[self.layout.after]
    }

    pub fn status(self) -> RowStatus {
        RowStatus::parse(&self.cells[self.layout.status])
    }

    pub fn cells(self) -> &'a [String] {
        self.cells
    }
}

/// Ordered rows of a spreadsheet.
///
/// Row order is the processing order. Every record is padded to the header
/// width on construction, so the column indices in [`ColumnLayout`] are always
/// valid for every row.
#[derive(Debug, Clone)]
pub struct RowStore {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    layout: ColumnLayout,
}

impl RowStore {
    pub fn from_records(
        mut headers: Vec<String>,
        mut records: Vec<Vec<String>>,
        columns: &ColumnConfig,
    ) -> Result<Self> {
        // cells past the source header belong to no column and must not end
        // up under an appended `after` or `status`
        for record in &mut records {
            record.resize(headers.len(), String::new());
        }

        let layout = ColumnLayout::detect(&mut headers, columns)?;

        for record in &mut records {
            record.resize(headers.len(), String::new());
        }

        Ok(Self {
            headers,
            records,
            layout,
        })
    }

    pub fn load(path: impl AsRef<Path>, columns: &ColumnConfig) -> Result<Self> {
        let path = path.as_ref();
        let (headers, records) = crate::sheet::reader::SheetReader::new(path).read_all()?;
        let store = Self::from_records(headers, records, columns)?;

        tracing::debug!(
            path = %path.display(),
            rows = store.len(),
            has_class_and_number = store.layout.has_class_and_number(),
            had_status = store.layout.had_status,
            "Loaded sheet"
        );

        Ok(store)
    }

    /// Rewrites `path` with the full contents of the store.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        crate::sheet::writer::SheetWriter::new(path.as_ref(), &self.headers).write_all(&self.records)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.records.get(index).map(|cells| Row {
            headers: &self.headers,
            cells,
            layout: &self.layout,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    pub fn status(&self, index: usize) -> Option<RowStatus> {
        self.row(index).map(|r| r.status())
    }

    pub fn set_result(&mut self, index: usize, status: RowStatus, after: &str) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(VerifierError::RowOutOfRange { index, len })?;

        record[self.layout.after] = after.to_string();
        record[self.layout.status] = status.as_cell().to_string();
        Ok(())
    }

    pub fn count_status(&self, status: RowStatus) -> usize {
        self.rows().filter(|r| r.status() == status).count()
    }

    /// Text shown for a row in a list: `"{class}-{number} {name}"` when the
    /// sheet has class and number columns, otherwise the name.
    pub fn label(&self, index: usize) -> Option<String> {
        let cells = self.records.get(index)?;
        let name = self.layout.name.map(|i| cells[i].as_str());

        let label = match (self.layout.class_and_number, name) {
            (Some((class, number)), Some(name)) => {
                format!("{}-{} {}", cells[class], cells[number], name)
            }
            (Some((class, number)), None) => format!("{}-{}", cells[class], cells[number]),
            (None, Some(name)) => name.to_string(),
            (None, None) => format!("row {}", index + 1),
        };
        Some(label)
    }
}
