// src/utils/secret.rs

/// Compares a submitted admin secret against the configured one.
///
/// Runs over the whole expected secret regardless of where the first
/// mismatch is. An empty expected secret never matches.
pub fn verify_secret(candidate: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let candidate = candidate.as_bytes();
    let expected = expected.as_bytes();

    let mut diff = candidate.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        let other = candidate.get(i).copied().unwrap_or(0);
        diff |= (other ^ byte) as usize;
    }
    diff == 0
}
