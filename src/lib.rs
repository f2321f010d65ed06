pub mod config;
pub mod contact;
pub mod engine;
pub mod error;
pub mod progress;
pub mod row;
pub mod service;
pub mod value;

use crate::config::TextEncoding;
use crate::error::ImportError;
use crate::row::{DecodeReader, HeaderPreview, RowStream};

use std::fs::File;
use std::path::Path;

/// Opens `path` and streams its rows in file order. Each row is only read
/// once the previous one has been pulled, so memory stays flat for any file
/// size.
pub fn stream_rows(
    path: impl AsRef<Path>,
    encoding: TextEncoding,
) -> Result<RowStream<DecodeReader<File>>, ImportError> {
    let file = File::open(path)?;
    Ok(RowStream::from_reader(DecodeReader::new(file, encoding))?)
}

/// Reads the header and the first data row, then closes the file.
pub fn read_header(
    path: impl AsRef<Path>,
    encoding: TextEncoding,
) -> Result<HeaderPreview, ImportError> {
    let mut rows = stream_rows(path, encoding)?;
    let columns = rows.columns();
    let first_row = rows.next().transpose()?.map(|(_, row)| row);

    Ok(HeaderPreview { columns, first_row })
}
