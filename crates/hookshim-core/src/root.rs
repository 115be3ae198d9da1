use crate::vcs;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which step of the fallback chain produced the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSource {
    Explicit,
    Marker,
    Vcs,
    Cwd,
}

impl RootSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootSource::Explicit => "explicit",
            RootSource::Marker => "marker",
            RootSource::Vcs => "vcs",
            RootSource::Cwd => "cwd",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub root: PathBuf,
    pub source: RootSource,
}

/// Resolves the project root for a given starting directory.
///
/// Priority:
/// 1. An explicit root (`--root` / `HOOKSHIM_ROOT`), taken relative to `start`
/// 2. The marker directory: `start` and its ancestors nearest-first, then the
///    descendants of `start` ordered by depth and path
/// 3. The VCS top-level directory
/// 4. `start` itself
///
/// Resolution never fails.
pub struct Locator<'a> {
    marker: &'a str,
    vcs: fn(&Path) -> Option<PathBuf>,
}

impl<'a> Locator<'a> {
    pub fn new(marker: &'a str) -> Self {
        Self {
            marker,
            vcs: vcs::git_toplevel,
        }
    }

    /// Replace the VCS lookup.
    pub fn with_vcs(mut self, vcs: fn(&Path) -> Option<PathBuf>) -> Self {
        self.vcs = vcs;
        self
    }

    pub fn resolve(&self, start: &Path, explicit: Option<&Path>) -> Resolution {
        if let Some(p) = explicit {
            return Resolution {
                root: start.join(p),
                source: RootSource::Explicit,
            };
        }

        if let Some(root) = self.find_marker(start) {
            return Resolution {
                root,
                source: RootSource::Marker,
            };
        }

        if let Some(root) = (self.vcs)(start) {
            return Resolution {
                root,
                source: RootSource::Vcs,
            };
        }

        Resolution {
            root: start.to_path_buf(),
            source: RootSource::Cwd,
        }
    }

    /// Parent directory of the first marker directory found, if any.
    pub fn find_marker(&self, start: &Path) -> Option<PathBuf> {
        self.find_in_ancestors(start)
            .or_else(|| self.find_in_descendants(start))
    }

    fn has_marker(&self, dir: &Path) -> bool {
        dir.join(self.marker).is_dir()
    }

    fn find_in_ancestors(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| self.has_marker(dir))
            .map(Path::to_path_buf)
    }

    /// Breadth-first walk below `start`. Every directory of one depth is
    /// checked before the next depth; ties are broken by path order.
    fn find_in_descendants(&self, start: &Path) -> Option<PathBuf> {
        let mut level = self.child_dirs(start);

        while !level.is_empty() {
            if let Some(hit) = level.iter().find(|dir| self.has_marker(dir)) {
                return Some(hit.clone());
            }
            let mut next: Vec<PathBuf> = level.iter().flat_map(|d| self.child_dirs(d)).collect();
            next.sort();
            level = next;
        }
        None
    }

    /// Sorted subdirectories of `dir`, without following symlinks and
    /// without entering the marker itself.
    fn child_dirs(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                name != self.marker
            })
            .map(|e| e.path())
            .collect();
        dirs.sort();
        dirs
    }
}

/// Resolve the project root from the process working directory.
pub fn resolve_root(explicit: Option<&Path>, marker: &str) -> Resolution {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let resolution = Locator::new(marker).resolve(&cwd, explicit);
    tracing::debug!(
        root = %resolution.root.display(),
        source = resolution.source.as_str(),
        "resolved project root"
    );
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::DEFAULT_MARKER;
    use tempfile::TempDir;

    fn no_vcs(_: &Path) -> Option<PathBuf> {
        None
    }

    fn fixed_vcs(_: &Path) -> Option<PathBuf> {
        Some(PathBuf::from("/vcs/top"))
    }

    fn locator() -> Locator<'static> {
        Locator::new(DEFAULT_MARKER).with_vcs(no_vcs)
    }

    fn mkdirs(root: &Path, rel: &str) -> PathBuf {
        let p = root.join(rel);
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), "sub/.claude");
        let other = Path::new("/somewhere/else");
        let r = locator().with_vcs(fixed_vcs).resolve(dir.path(), Some(other));
        assert_eq!(r.root, other);
        assert_eq!(r.source, RootSource::Explicit);
    }

    #[test]
    fn relative_explicit_root_is_anchored_at_start() {
        let dir = TempDir::new().unwrap();
        let r = locator().resolve(dir.path(), Some(Path::new("proj")));
        assert_eq!(r.root, dir.path().join("proj"));
        assert!(r.root.is_absolute());
    }

    #[test]
    fn finds_marker_in_ancestor() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), ".claude");
        let deep = mkdirs(dir.path(), "b/c");

        let r = locator().resolve(&deep, None);
        assert_eq!(r.root, dir.path());
        assert_eq!(r.source, RootSource::Marker);
    }

    #[test]
    fn finds_marker_in_start_directory() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), ".claude");
        assert_eq!(locator().resolve(dir.path(), None).root, dir.path());
    }

    #[test]
    fn start_inside_marker_resolves_to_its_parent() {
        let dir = TempDir::new().unwrap();
        let hooks = mkdirs(dir.path(), ".claude/hooks");
        assert_eq!(locator().resolve(&hooks, None).root, dir.path());
    }

    #[test]
    fn finds_marker_in_descendant() {
        let dir = TempDir::new().unwrap();
        let project = mkdirs(dir.path(), "work/project");
        mkdirs(&project, ".claude");

        let r = locator().resolve(dir.path(), None);
        assert_eq!(r.root, project);
        assert_eq!(r.source, RootSource::Marker);
    }

    #[test]
    fn nearest_ancestor_beats_descendant() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), ".claude");
        let start = mkdirs(dir.path(), "app");
        mkdirs(&start, "nested/.claude");

        assert_eq!(locator().resolve(&start, None).root, dir.path());
    }

    #[test]
    fn shallower_descendant_wins() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), "a/deep/.claude");
        let shallow = mkdirs(dir.path(), "z");
        mkdirs(&shallow, ".claude");

        assert_eq!(locator().resolve(dir.path(), None).root, shallow);
    }

    #[test]
    fn equal_depth_matches_break_ties_by_path() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), "beta/.claude");
        let alpha = mkdirs(dir.path(), "alpha");
        mkdirs(&alpha, ".claude");

        for _ in 0..3 {
            assert_eq!(locator().resolve(dir.path(), None).root, alpha);
        }
    }

    #[test]
    fn deep_marker_is_found() {
        let dir = TempDir::new().unwrap();
        let deep = mkdirs(dir.path(), "a/b/c/d/e/f/g/h/i/j/k/l");
        mkdirs(&deep, ".claude");

        let r = locator().resolve(dir.path(), None);
        assert_eq!(r.root, deep);
        assert_eq!(r.source, RootSource::Marker);
    }

    #[test]
    fn build_and_dependency_directories_are_searched() {
        let dir = TempDir::new().unwrap();
        let pkg = mkdirs(dir.path(), "node_modules/pkg");
        mkdirs(&pkg, ".claude");
        assert_eq!(locator().resolve(dir.path(), None).root, pkg);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        mkdirs(outside.path(), ".claude");
        let start = mkdirs(dir.path(), "start");
        std::os::unix::fs::symlink(outside.path(), start.join("link")).unwrap();

        assert_eq!(locator().resolve(&start, None).source, RootSource::Cwd);
    }

    #[test]
    fn marker_file_is_not_a_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".claude"), "not a dir").unwrap();
        assert_eq!(locator().resolve(dir.path(), None).source, RootSource::Cwd);
    }

    #[test]
    fn custom_marker_name() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), ".agent");
        let sub = mkdirs(dir.path(), "src");

        let r = Locator::new(".agent").with_vcs(no_vcs).resolve(&sub, None);
        assert_eq!(r.root, dir.path());
    }

    #[test]
    fn marker_takes_precedence_over_vcs() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), ".claude");

        let r = locator().with_vcs(fixed_vcs).resolve(dir.path(), None);
        assert_eq!(r.root, dir.path());
        assert_eq!(r.source, RootSource::Marker);
    }

    #[test]
    fn vcs_fallback_without_marker() {
        let dir = TempDir::new().unwrap();
        let r = locator().with_vcs(fixed_vcs).resolve(dir.path(), None);
        assert_eq!(r.root, PathBuf::from("/vcs/top"));
        assert_eq!(r.source, RootSource::Vcs);
    }

    #[test]
    fn falls_back_to_start_directory() {
        let dir = TempDir::new().unwrap();
        let r = locator().resolve(dir.path(), None);
        assert_eq!(r.root, dir.path());
        assert_eq!(r.source, RootSource::Cwd);
        assert!(!r.root.as_os_str().is_empty());
    }

    #[test]
    fn missing_start_directory_still_resolves() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone");
        let r = locator().resolve(&gone, None);
        assert_eq!(r.root, gone);
    }
}
