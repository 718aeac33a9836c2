//! Runtime library discovery.
//!
//! Every compiled program links `libaria_rt.a`. The directory holding it is
//! found in this order:
//!
//! 1. **Explicit**: the `--runtime-path` flag
//! 2. **Dev layout**: next to the compiler binary (`target/{debug,release}/`)
//! 3. **Sibling profile**: `target/release/` when the compiler is in
//!    `target/debug/`, and vice versa
//! 4. **Installed layout**: `<exe>/../lib/`
//! 5. **Workspace dev**: `$ARIA_WORKSPACE_DIR/target/{release,debug}/`

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the runtime library lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub library_dir: PathBuf,
}

/// The runtime library was in none of the searched directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeNotFound {
    pub searched_paths: Vec<PathBuf>,
}

impl fmt::Display for RuntimeNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Aria runtime library ({LIB_NAME}) not found.")?;
        writeln!(f)?;
        writeln!(f, "Searched paths:")?;
        for path in &self.searched_paths {
            writeln!(f, "  - {}", path.display())?;
        }
        writeln!(f)?;
        writeln!(f, "To fix this, either:")?;
        writeln!(f, "  1. Build the runtime: cargo build -p aria_rt --release")?;
        write!(f, "  2. Specify path: ariac <file> --runtime-path=/path/to/lib")
    }
}

impl std::error::Error for RuntimeNotFound {}

pub const LIB_NAME: &str = "libaria_rt.a";

impl RuntimeConfig {
    pub fn new(library_dir: PathBuf) -> Self {
        RuntimeConfig { library_dir }
    }

    /// Full path of the static library.
    pub fn library(&self) -> PathBuf {
        self.library_dir.join(LIB_NAME)
    }

    /// Search the standard locations, starting with `explicit` if given.
    pub fn detect(explicit: Option<&Path>) -> Result<Self, RuntimeNotFound> {
        let exe = std::env::current_exe()
            .ok()
            .map(|exe| exe.canonicalize().unwrap_or(exe));
        let workspace = std::env::var_os("ARIA_WORKSPACE_DIR").map(PathBuf::from);
        Self::detect_from(explicit, exe.as_deref(), workspace.as_deref())
    }

    /// [`detect`](Self::detect) with the executable path and workspace
    /// directory supplied by the caller.
    pub fn detect_from(
        explicit: Option<&Path>,
        exe: Option<&Path>,
        workspace: Option<&Path>,
    ) -> Result<Self, RuntimeNotFound> {
        let mut searched = Vec::new();
        let mut candidates: Vec<PathBuf> = Vec::new();

        if let Some(dir) = explicit {
            candidates.push(dir.to_path_buf());
        }
        if let Some(exe_dir) = exe.and_then(Path::parent) {
            candidates.push(exe_dir.to_path_buf());
            if let Some(target_dir) = exe_dir.parent() {
                for profile in ["release", "debug"] {
                    let sibling = target_dir.join(profile);
                    if sibling != exe_dir {
                        candidates.push(sibling);
                    }
                }
            }
            candidates.push(exe_dir.join("../lib"));
        }
        if let Some(workspace) = workspace {
            for profile in ["release", "debug"] {
                candidates.push(workspace.join("target").join(profile));
            }
        }

        for dir in candidates {
            if dir.join(LIB_NAME).is_file() {
                let dir = dir.canonicalize().unwrap_or(dir);
                tracing::debug!(dir = %dir.display(), "runtime library found");
                return Ok(Self::new(dir));
            }
            searched.push(dir);
        }
        Err(RuntimeNotFound {
            searched_paths: searched,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch_lib(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(LIB_NAME), b"!<arch>\n").unwrap();
    }

    #[test]
    fn test_explicit_path_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let explicit = tmp.path().join("custom");
        touch_lib(&explicit);
        touch_lib(&tmp.path().join("target/debug"));

        let exe = tmp.path().join("target/debug/ariac");
        let found = RuntimeConfig::detect_from(Some(&explicit), Some(&exe), None).unwrap();
        assert_eq!(found.library_dir, explicit.canonicalize().unwrap());
        assert!(found.library().ends_with(LIB_NAME));
    }

    #[test]
    fn test_exe_dir_then_sibling_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("target/debug/ariac");
        touch_lib(&tmp.path().join("target/release"));
        fs::create_dir_all(tmp.path().join("target/debug")).unwrap();

        let found = RuntimeConfig::detect_from(None, Some(&exe), None).unwrap();
        assert_eq!(
            found.library_dir,
            tmp.path().join("target/release").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_installed_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("prefix/bin/ariac");
        fs::create_dir_all(tmp.path().join("prefix/bin")).unwrap();
        touch_lib(&tmp.path().join("prefix/lib"));

        let found = RuntimeConfig::detect_from(None, Some(&exe), None).unwrap();
        assert_eq!(
            found.library_dir,
            tmp.path().join("prefix/lib").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let workspace = tmp.path().join("ws");
        touch_lib(&workspace.join("target/debug"));

        let found = RuntimeConfig::detect_from(None, None, Some(&workspace)).unwrap();
        assert_eq!(
            found.library_dir,
            workspace.join("target/debug").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_miss_lists_every_searched_path() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("target/debug/ariac");
        let err = RuntimeConfig::detect_from(
            Some(&tmp.path().join("nowhere")),
            Some(&exe),
            Some(&tmp.path().join("ws")),
        )
        .unwrap_err();
        // explicit, exe dir, release sibling, ../lib, two workspace profiles
        assert_eq!(err.searched_paths.len(), 6);
        let message = err.to_string();
        assert!(message.contains("libaria_rt.a"));
        assert!(message.contains("nowhere"));
    }
}
