//! Lexical path helpers
//!
//! Paths here never touch the filesystem. They follow slash-separated
//! cleaning rules so results are identical across hosts.

use super::ConvertError;

/// Shortest lexically equivalent path.
///
/// Collapses repeated separators, drops `.` elements and resolves `..`
/// against preceding elements where possible.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            part => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join two path fragments and clean the result.
pub fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() {
        return clean_path(path);
    }
    clean_path(&format!("{}/{}", base, path))
}

/// A path `r` such that `join_path(base, r) == clean_path(target)`.
pub fn relative_path(base: &str, target: &str) -> Result<String, ConvertError> {
    let base_clean = clean_path(base);
    let target_clean = clean_path(target);
    if base_clean == target_clean {
        return Ok(".".to_string());
    }

    let err = || ConvertError::RelativePath {
        base: base.to_string(),
        path: target.to_string(),
    };
    if base_clean.starts_with('/') != target_clean.starts_with('/') {
        return Err(err());
    }

    let components = |p: &str| -> Vec<String> {
        p.split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(str::to_string)
            .collect()
    };
    let base_parts = components(&base_clean);
    let target_parts = components(&target_clean);

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let base_rest = &base_parts[common..];
    if base_rest.iter().any(|c| c == "..") {
        return Err(err());
    }

    let mut out: Vec<&str> = base_rest.iter().map(|_| "..").collect();
    out.extend(target_parts[common..].iter().map(String::as_str));
    Ok(out.join("/"))
}

/// Rewrite root-relative `paths` relative to `module_dir`.
pub fn make_paths_relative_to_module(
    module_dir: &str,
    paths: &[String],
) -> Result<Vec<String>, ConvertError> {
    paths
        .iter()
        .map(|path| relative_path(module_dir, path))
        .collect()
}
