use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A typed reference discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Image(String),
    Page(String),
}

impl Element {
    pub fn url(&self) -> &str {
        match self {
            Element::Image(url) | Element::Page(url) => url,
        }
    }
}

/// Downloaded image content, identified by the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    source: String,
    bytes: Vec<u8>,
}

impl Image {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }

    pub fn id(&self) -> &str {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Grayscale,
    Mirror,
    Sepia,
}

impl TransformKind {
    pub const ALL: [TransformKind; 3] = [
        TransformKind::Grayscale,
        TransformKind::Mirror,
        TransformKind::Sepia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Grayscale => "grayscale",
            TransformKind::Mirror => "mirror",
            TransformKind::Sepia => "sepia",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grayscale" | "greyscale" => Ok(TransformKind::Grayscale),
            "mirror" => Ok(TransformKind::Mirror),
            "sepia" => Ok(TransformKind::Sepia),
            other => Err(ScanError::ParseError(format!("unknown transform '{}'", other))),
        }
    }
}

/// One unit of transform work: an image identity paired with a transform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub image: String,
    pub kind: TransformKind,
}

impl CacheKey {
    pub fn new(image: &Image, kind: TransformKind) -> Self {
        Self {
            image: image.id().to_string(),
            kind,
        }
    }
}

/// Encoded output of applying one transform to one image.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub source: String,
    pub kind: TransformKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl TransformedImage {
    pub fn new(source: &str, kind: TransformKind, bytes: Vec<u8>) -> Self {
        Self {
            source: source.to_string(),
            kind,
            file_name: output_file_name(source),
            bytes,
        }
    }
}

const SOURCE_DIGEST_LEN: usize = 12;

/// Flattens a source URL into a PNG file name, e.g.
/// `https://example.com/img/cat.jpg` becomes `example.com_img_cat-<digest>.png`.
///
/// The suffix is a digest of the full source URL; distinct sources never
/// share a name.
pub fn output_file_name(source: &str) -> String {
    let digest = {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hex::encode(hasher.finalize())
    };
    let digest = &digest[..SOURCE_DIGEST_LEN];

    let raw = match Url::parse(source) {
        Ok(url) => format!("{}{}", url.host_str().unwrap_or(""), url.path()),
        Err(_) => source.to_string(),
    };

    let stem = match raw.rfind('.') {
        Some(dot) if !raw[dot..].contains('/') => &raw[..dot],
        _ => raw.as_str(),
    };

    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('_');

    if sanitized.is_empty() {
        format!("image-{}.png", digest)
    } else {
        format!("{}-{}.png", sanitized, digest)
    }
}
