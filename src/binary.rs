//! Binary file detection used to guard content substitution.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected when classifying a file.
const SNIFF_LEN: u64 = 512;

/// Returns true when the first bytes of the file contain a zero byte.
///
/// Read and permission failures are treated as "not binary" so that
/// substitution is attempted rather than silently skipped.
pub fn is_binary<P: AsRef<Path>>(path: P) -> bool {
    let Ok(file) = File::open(path.as_ref()) else {
        return false;
    };
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    match file.take(SNIFF_LEN).read_to_end(&mut head) {
        Ok(_) => head.contains(&0),
        Err(_) => false,
    }
}
