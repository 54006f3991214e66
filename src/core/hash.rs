use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Composite key for the completed-issue store. Pipe-joined so the parts
/// cannot bleed into each other, hashed so the key is a fixed-width token.
pub fn completion_key(file: &str, line: u32, code: &str) -> String {
    let buf = format!("{}|{}|{}", file, line, code);
    sha256_hex(buf.as_bytes())
}

/// Content hash of a file, streamed so large sources never sit fully in
/// memory during a monitor pass.
pub fn hash_file(path: &Path) -> anyhow::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_key_is_deterministic() {
        let a = completion_key("src/index.php", 10, "WP.Security.Nonce");
        let b = completion_key("src/index.php", 10, "WP.Security.Nonce");
        assert_eq!(a, b);
    }

    #[test]
    fn completion_key_separates_parts() {
        // "a|1" + "2|c" must not collide with "a|12" + "|c" style slips
        let a = completion_key("a", 12, "c");
        let b = completion_key("a1", 2, "c");
        assert_ne!(a, b);
    }
}
