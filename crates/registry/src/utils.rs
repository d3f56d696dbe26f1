use std::path::PathBuf;

use dirs_next::home_dir;

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde(" /etc/consoleport.json "), PathBuf::from("/etc/consoleport.json"));
    }

    #[test]
    fn tilde_prefix_is_expanded() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/cp.json"), home.join("cp.json"));
            assert_eq!(expand_tilde("~"), home);
        }
    }
}
