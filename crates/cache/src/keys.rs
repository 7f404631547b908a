//! Logical key namespace
//!
//! Keys are storage-engine agnostic; `FileStore` escapes them into file names.

use storyspark_core::StoryId;

/// Last successfully fetched (or locally mutated) story list
pub const CATALOG: &str = "catalog:list";

const DOWNLOAD_PREFIX: &str = "download:";
const BLOB_PREFIX: &str = "blob:";

/// Download marker for one story
pub fn download(id: &StoryId) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, id)
}

/// Audio payload for one story
pub fn blob(id: &StoryId) -> String {
    format!("{}{}", BLOB_PREFIX, id)
}

/// Escapes a key into a portable file name component
///
/// ASCII alphanumerics plus `-` and `_` pass through; every other byte
/// becomes `%XX`, so distinct keys never collide.
pub(crate) fn escape(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
