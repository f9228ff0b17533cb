use std::future::Future;

const SEPARATOR: char = '.';

/// Base username for a person: `first.last`, case preserved.
///
/// No uniqueness is implied; see [`resolve_unique_username`].
pub fn base_username(first_name: &str, last_name: &str) -> String {
    format!("{first_name}{SEPARATOR}{last_name}")
}

/// Resolve a username that `exists` reports as free.
///
/// Returns `base` when it is free, otherwise the first free candidate among
/// `base1`, `base2`, ... Each suffix is probed once, in order. The loop has no
/// iteration cap: a namespace holding every numeric suffix of `base` never
/// resolves.
pub async fn resolve_unique_username<F, Fut, E>(base: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    if !exists(base.to_string()).await? {
        return Ok(base.to_string());
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{base}{suffix}");
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
