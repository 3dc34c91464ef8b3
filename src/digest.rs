//! Content digests for input files
//!
//! A digest is a SHA-384 sum rendered as `sha384:<hex>`. File digests are
//! recomputed on every call; nothing is cached between reads.

use crate::error::{PrebuiltError, PrebuiltResult};
use sha2::{Digest as _, Sha384};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// Hash algorithm a digest was produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Sha384,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha384 => write!(f, "sha384"),
        }
    }
}

/// A fixed-length content digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: Algorithm,
    sum: Vec<u8>,
}

impl Digest {
    /// Algorithm used to compute the sum
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn sum(&self) -> &[u8] {
        &self.sum
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, hex::encode(&self.sum))
    }
}

/// Digest the full contents of a file
///
/// The file is streamed through the hasher. Failing to open it or to read
/// it to the end is an error; a partial read never yields a digest.
pub fn file(path: &Path) -> PrebuiltResult<Digest> {
    let digest_err = |source: io::Error| PrebuiltError::FileDigest {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(digest_err)?;
    let mut hasher = Sha384::new();
    io::copy(&mut file, &mut hasher).map_err(digest_err)?;

    Ok(Digest {
        algorithm: Algorithm::Sha384,
        sum: hasher.finalize().to_vec(),
    })
}

/// Combine digests into one, in the order given
///
/// Callers own the ordering; the same sequence always yields the same sum.
pub fn sum<'a>(digests: impl IntoIterator<Item = &'a Digest>) -> Digest {
    let mut hasher = Sha384::new();
    for digest in digests {
        hasher.update(digest.to_string().as_bytes());
    }

    Digest {
        algorithm: Algorithm::Sha384,
        sum: hasher.finalize().to_vec(),
    }
}
