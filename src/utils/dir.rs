use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

const APPLICATION_DIR: &str = "watchme";

/// `$XDG_STATE_HOME/watchme` or `$HOME/.local/state/watchme` on unix, `%APPDATA%\watchme` on
/// Windows. The directory is created if it's missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = base_state_dir()?;
    path.push(APPLICATION_DIR);
    ensure_dir(path)
}

/// Creates `path` if needed and hands it back.
pub fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

fn base_state_dir() -> Result<PathBuf> {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            env::var("APPDATA")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("APPDATA should be present on Windows"))
        } else {
            env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/state")))
                .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::ensure_dir;

    #[test]
    fn ensure_dir_creates_nested_directories() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b");
        let created = ensure_dir(nested.clone())?;
        assert_eq!(created, nested);
        assert!(nested.is_dir());

        ensure_dir(nested.clone())?;
        Ok(())
    }
}
