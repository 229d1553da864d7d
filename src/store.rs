//! Atomic persistence for `VecIndex` artifacts.
//!
//! Artifact layout: 4 magic bytes, a 32-byte BLAKE3 checksum of the payload,
//! then the bincode-encoded payload (format version, embedding identity,
//! segments, vectors). Saves stage into a temp file in the target directory
//! and rename into place, so a failed save leaves prior state intact.

use std::io::Write;
use std::path::Path;

use bincode::config::{self, Config};
use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::constants::{INDEX_FILE_NAME, INDEX_FORMAT_VERSION, INDEX_MAGIC};
use crate::corpus::Segment;
use crate::embed::{EmbeddingIdentity, EmbeddingProvider};
use crate::error::{ReportQaError, Result};
use crate::extract::DocumentProcessor;
use crate::vec::VecIndex;

const CHECKSUM_LEN: usize = blake3::OUT_LEN;

#[derive(Serialize, Deserialize)]
struct VecIndexArtifact {
    version: u16,
    identity: EmbeddingIdentity,
    segments: Vec<Segment>,
    vectors: Vec<Vec<f32>>,
}

fn artifact_config() -> impl Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

impl VecIndex {
    /// Serialize the index into `location`, replacing any prior artifact.
    pub fn save(&self, location: &Path) -> Result<()> {
        fs::create_dir_all(location)?;

        let artifact = VecIndexArtifact {
            version: INDEX_FORMAT_VERSION,
            identity: self.identity.clone(),
            segments: self.segments.clone(),
            vectors: self.vectors.clone(),
        };
        let payload = bincode::serde::encode_to_vec(&artifact, artifact_config())
            .map_err(|err| ReportQaError::Persistence(std::io::Error::other(err)))?;
        let checksum = blake3::hash(&payload);

        let mut staged = tempfile::NamedTempFile::new_in(location)?;
        staged.write_all(&INDEX_MAGIC)?;
        staged.write_all(checksum.as_bytes())?;
        staged.write_all(&payload)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(location.join(INDEX_FILE_NAME))
            .map_err(|err| ReportQaError::Persistence(err.error))?;

        tracing::debug!(
            location = %location.display(),
            segments = self.segments.len(),
            bytes = payload.len(),
            "saved index artifact"
        );
        Ok(())
    }

    /// Reconstruct an index from a previously saved artifact.
    pub fn load(location: &Path) -> Result<Self> {
        let artifact_path = location.join(INDEX_FILE_NAME);
        if !artifact_path.is_file() {
            return Err(ReportQaError::IndexNotFound {
                location: location.to_path_buf(),
            });
        }

        let bytes = fs::read(&artifact_path)?;
        if bytes.len() < INDEX_MAGIC.len() + CHECKSUM_LEN {
            return Err(ReportQaError::IndexFormat {
                location: location.to_path_buf(),
                reason: "artifact shorter than its header",
            });
        }
        let (magic, rest) = bytes.split_at(INDEX_MAGIC.len());
        if magic != INDEX_MAGIC {
            return Err(ReportQaError::IndexFormat {
                location: location.to_path_buf(),
                reason: "unrecognized magic bytes",
            });
        }
        let (checksum, payload) = rest.split_at(CHECKSUM_LEN);
        if checksum != blake3::hash(payload).as_bytes().as_slice() {
            return Err(ReportQaError::IndexFormat {
                location: location.to_path_buf(),
                reason: "checksum mismatch",
            });
        }

        let (artifact, _): (VecIndexArtifact, usize) =
            bincode::serde::decode_from_slice(payload, artifact_config()).map_err(|_| {
                ReportQaError::IndexFormat {
                    location: location.to_path_buf(),
                    reason: "payload decoding failed",
                }
            })?;
        if artifact.version != INDEX_FORMAT_VERSION {
            return Err(ReportQaError::IndexFormat {
                location: location.to_path_buf(),
                reason: "unsupported format version",
            });
        }
        if artifact.segments.len() != artifact.vectors.len() {
            return Err(ReportQaError::IndexFormat {
                location: location.to_path_buf(),
                reason: "segment and vector counts disagree",
            });
        }

        tracing::debug!(
            location = %location.display(),
            segments = artifact.segments.len(),
            "loaded index artifact"
        );
        Ok(Self {
            identity: artifact.identity,
            segments: artifact.segments,
            vectors: artifact.vectors,
        })
    }

    /// Load the index at `location`, or ingest `document`, build, and save a
    /// fresh one when no artifact exists yet.
    pub fn open_or_build(
        location: &Path,
        document: &Path,
        processor: &DocumentProcessor,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        match Self::load(location) {
            Ok(index) => Ok(index),
            Err(ReportQaError::IndexNotFound { .. }) => {
                let processed = processor.process_path(document)?;
                let index = Self::build(processed.corpus(), provider)?;
                index.save(location)?;
                Ok(index)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::vec::tests::{HashEmbedder, corpus_from};

    fn sample_index(provider: &HashEmbedder) -> VecIndex {
        let corpus = corpus_from(&[
            ("revenue grew eighteen percent year on year", 1),
            ("the board proposed a dividend of two euros", 2),
            ("liquidity remained strong through the period", 3),
        ]);
        VecIndex::build(&corpus, provider).expect("build")
    }

    #[test]
    fn save_then_load_preserves_retrieval() {
        let dir = tempdir().expect("tmp");
        let provider = HashEmbedder::new(64);
        let index = sample_index(&provider);
        index.save(dir.path()).expect("save");

        let reloaded = VecIndex::load(dir.path()).expect("load");
        assert_eq!(reloaded.len(), index.len());
        assert_eq!(reloaded.identity(), index.identity());

        let question = "what dividend did the board propose";
        let before = index.retrieve(question, 3, &provider).expect("retrieve");
        let after = reloaded.retrieve(question, 3, &provider).expect("retrieve");
        let ids_before: Vec<u64> = before.iter().map(|hit| hit.segment.id).collect();
        let ids_after: Vec<u64> = after.iter().map(|hit| hit.segment.id).collect();
        assert_eq!(ids_before, ids_after);
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a.distance - b.distance).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn load_missing_location_is_index_not_found() {
        let dir = tempdir().expect("tmp");
        let err = VecIndex::load(&dir.path().join("nowhere")).expect_err("must fail");
        assert!(matches!(err, ReportQaError::IndexNotFound { .. }));
    }

    #[test]
    fn load_rejects_corrupted_payload() {
        let dir = tempdir().expect("tmp");
        let provider = HashEmbedder::new(32);
        sample_index(&provider).save(dir.path()).expect("save");

        let artifact_path = dir.path().join(INDEX_FILE_NAME);
        let mut bytes = std::fs::read(&artifact_path).expect("read artifact");
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&artifact_path, &bytes).expect("write corrupted artifact");

        let err = VecIndex::load(dir.path()).expect_err("must fail");
        assert!(matches!(
            err,
            ReportQaError::IndexFormat {
                reason: "checksum mismatch",
                ..
            }
        ));
    }

    #[test]
    fn load_rejects_bad_magic() {
        let dir = tempdir().expect("tmp");
        let provider = HashEmbedder::new(32);
        sample_index(&provider).save(dir.path()).expect("save");

        let artifact_path = dir.path().join(INDEX_FILE_NAME);
        let mut bytes = std::fs::read(&artifact_path).expect("read artifact");
        bytes[0] = b'X';
        std::fs::write(&artifact_path, &bytes).expect("write corrupted artifact");

        let err = VecIndex::load(dir.path()).expect_err("must fail");
        assert!(matches!(
            err,
            ReportQaError::IndexFormat {
                reason: "unrecognized magic bytes",
                ..
            }
        ));
    }

    #[test]
    fn save_overwrites_prior_artifact() {
        let dir = tempdir().expect("tmp");
        let provider = HashEmbedder::new(32);
        sample_index(&provider).save(dir.path()).expect("first save");

        let corpus = corpus_from(&[("a completely different corpus entry", 9)]);
        let replacement = VecIndex::build(&corpus, &provider).expect("build");
        replacement.save(dir.path()).expect("second save");

        let reloaded = VecIndex::load(dir.path()).expect("load");
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.segments()[0].page_number, 9);
    }
}
