use std::io::Read;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::errors::{SourceError, SourceResult};

/// Compression formats detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

/// Magic byte detection and decompression for dataset payloads
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        match infer::get(data) {
            Some(kind) if kind.mime_type() == "application/gzip" => CompressionFormat::Gzip,
            _ => CompressionFormat::Uncompressed,
        }
    }

    /// Decompress data based on detected format
    ///
    /// Uncompressed input is returned borrowed so plain JSON datasets are
    /// never copied.
    pub fn decompress(data: &[u8]) -> SourceResult<std::borrow::Cow<'_, [u8]>> {
        let format = Self::detect_compression_format(data);
        debug!("Detected compression format: {:?}", format);

        match format {
            CompressionFormat::Gzip => Self::decompress_gzip(data).map(std::borrow::Cow::Owned),
            CompressionFormat::Uncompressed => Ok(std::borrow::Cow::Borrowed(data)),
        }
    }

    fn decompress_gzip(data: &[u8]) -> SourceResult<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::with_capacity(data.len() * 4);
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| SourceError::decompress(format!("gzip: {e}")))?;
        debug!(
            "Decompressed {} bytes of gzip into {} bytes",
            data.len(),
            decompressed.len()
        );
        Ok(decompressed)
    }
}
