pub mod format;
pub mod layout;
pub mod reader;
pub mod store;
pub mod writer;

pub use format::SheetFormat;
pub use layout::ColumnLayout;
pub use reader::SheetReader;
pub use store::{Row, RowStatus, RowStore};
pub use writer::SheetWriter;
