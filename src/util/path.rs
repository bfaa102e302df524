use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a path; unresolvable input is returned as is.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(
            expand_path(Path::new("tests/resources/tree.json")),
            PathBuf::from("tests/resources/tree.json")
        );
    }

    #[test]
    fn test_expand_path_unknown_var_is_kept() {
        let path = Path::new("$RACKTREE_SURELY_UNSET_VAR/tree.json");
        assert_eq!(expand_path(path), path.to_path_buf());
    }
}
