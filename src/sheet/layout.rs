use crate::utils::{ColumnConfig, Result, VerifierError};
use serde::Serialize;

/// Column positions resolved once when a sheet is loaded.
///
/// `before` must exist in the source. `after` and `status` are appended to the
/// header when absent so that every row can carry a result. The display
/// columns are optional and only influence [`crate::RowStore::label`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub before: usize,
    pub after: usize,
    pub status: usize,
    pub class_and_number: Option<(usize, usize)>,
    pub name: Option<usize>,
    pub had_status: bool,
}

impl ColumnLayout {
    pub fn detect(headers: &mut Vec<String>, columns: &ColumnConfig) -> Result<Self> {
        let position = |headers: &[String], name: &str| headers.iter().position(|h| h == name);

        let before = position(headers, &columns.before)
            .ok_or_else(|| VerifierError::MissingColumn(columns.before.clone()))?;

        let after = match position(headers, &columns.after) {
            Some(idx) => idx,
            None => {
                headers.push(columns.after.clone());
                headers.len() - 1
            }
        };

        let had_status = position(headers, &columns.status).is_some();
        let status = match position(headers, &columns.status) {
            Some(idx) => idx,
            None => {
                headers.push(columns.status.clone());
                headers.len() - 1
            }
        };

        let class_and_number = match (
            position(headers, &columns.class),
            position(headers, &columns.number),
        ) {
            (Some(class), Some(number)) => Some((class, number)),
            _ => None,
        };

        Ok(Self {
            before,
            after,
            status,
            class_and_number,
            name: position(headers, &columns.name),
            had_status,
        })
    }

    pub fn has_class_and_number(&self) -> bool {
        self.class_and_number.is_some()
    }
}
