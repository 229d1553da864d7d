//! Shared defaults and on-disk format constants.

/// Target maximum segment length in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 600;

/// Fixed overlap between adjacent segments from the same page.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Segments whose trimmed text is shorter than this are dropped.
pub const DEFAULT_MIN_SEGMENT_CHARS: usize = 50;

/// Default number of segments retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// Default document label used in the grounded prompt and fallback sentence.
pub const DEFAULT_DOCUMENT_LABEL: &str = "report";

/// File name of the persisted index artifact inside an index location.
pub const INDEX_FILE_NAME: &str = "index.bin";

/// Magic bytes prefixing a persisted index artifact.
pub const INDEX_MAGIC: [u8; 4] = *b"RQA1";

/// Version of the persisted artifact layout.
pub const INDEX_FORMAT_VERSION: u16 = 1;
