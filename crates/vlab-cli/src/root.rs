use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "vlab.yaml";

/// Resolve the provider config file.
///
/// Priority:
/// 1. `--config` flag / `VLAB_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `vlab.yaml`
/// 3. None: built-in defaults apply
pub fn resolve_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        assert_eq!(resolve_config(Some(&path)), Some(path));
    }

    #[test]
    fn finds_config_in_parent_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        let subdir = dir.path().join("labs/deep");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(find_upward(&subdir), Some(dir.path().join(CONFIG_FILE)));
    }
}
