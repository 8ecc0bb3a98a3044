//! Product variable substitution
//!
//! Product-variable flags carry `%s` / `%d` format directives standing for
//! the variable's value. Bazel reads the value as a make variable instead.

const DIRECTIVES: [&str; 2] = ["%s", "%d"];

/// Replace every `%s` / `%d` in `s` with `$(<variable>)`. The flag is true
/// when anything was replaced.
pub fn try_variable_substitution(s: &str, variable: &str) -> (String, bool) {
    let replacement = format!("$({})", variable);
    let substituted = DIRECTIVES
        .iter()
        .fold(s.to_string(), |acc, directive| acc.replace(directive, &replacement));
    let changed = substituted != s;
    (substituted, changed)
}

/// [`try_variable_substitution`] over a list; the flag is true when any
/// element changed.
pub fn try_variable_substitutions(items: &[String], variable: &str) -> (Vec<String>, bool) {
    let mut changed = false;
    let out = items
        .iter()
        .map(|item| {
            let (substituted, item_changed) = try_variable_substitution(item, variable);
            changed |= item_changed;
            substituted
        })
        .collect();
    (out, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        assert_eq!(
            try_variable_substitution("-DSDK=%d", "platform_sdk_version"),
            ("-DSDK=$(platform_sdk_version)".to_string(), true)
        );
        assert_eq!(
            try_variable_substitution("-DA=%s -DB=%d", "v"),
            ("-DA=$(v) -DB=$(v)".to_string(), true)
        );
        assert_eq!(
            try_variable_substitution("-DNONE", "v"),
            ("-DNONE".to_string(), false)
        );
    }

    #[test]
    fn test_substitutions_list() {
        let items = vec!["-DX".to_string(), "-DY=%s".to_string()];
        let (out, changed) = try_variable_substitutions(&items, "board");
        assert_eq!(out, vec!["-DX".to_string(), "-DY=$(board)".to_string()]);
        assert!(changed);

        let (_, changed) = try_variable_substitutions(&items[..1], "board");
        assert!(!changed);
    }
}
