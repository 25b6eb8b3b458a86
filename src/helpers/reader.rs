use crate::error::QuoteError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UnifiedReaderError {
    #[error("Remote source '{0}' is not supported, copy the workbook to a local path")]
    RemoteSourceNotSupported(String),

    #[error("Invalid file URL '{0}'")]
    InvalidFileUrl(String),
}

/// A unified reader over either a local file or an in-memory workbook
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// In-memory buffer
    Memory(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Opens a local path or `file://` URL
    ///
    /// # Arguments
    /// * `file_name` - Path or URL to the file
    pub(crate) fn new(file_name: &str) -> Result<UnifiedReader, QuoteError> {
        let path = resolve_local_path(file_name)?;
        let file = File::open(path)?;
        Ok(UnifiedReader::Local(BufReader::new(file)))
    }

    /// Wraps workbook bytes already held in memory
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> UnifiedReader {
        UnifiedReader::Memory(Cursor::new(bytes))
    }
}

/// Checks if a file name represents a non-local URL
pub(crate) fn is_remote_url(file_name: &str) -> bool {
    match Url::parse(file_name) {
        // Single letters are Windows drive prefixes such as `C:\data.xlsx`
        Ok(url) => url.scheme() != "file" && url.scheme().len() > 1,
        Err(_) => false,
    }
}

/// Maps a local path or `file://` URL to a filesystem path
pub(crate) fn resolve_local_path(file_name: &str) -> Result<PathBuf, QuoteError> {
    if is_remote_url(file_name) {
        Err(UnifiedReaderError::RemoteSourceNotSupported(file_name.to_owned()))?
    }
    match Url::parse(file_name) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| UnifiedReaderError::InvalidFileUrl(file_name.to_owned()).into()),
        _ => Ok(Path::new(file_name).to_path_buf()),
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Memory(reader) => reader.seek(pos),
        }
    }
}
