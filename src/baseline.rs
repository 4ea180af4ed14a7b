use std::path::{Path, PathBuf};

use git2::{ErrorCode, ObjectType, Repository};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("no git repository found at {path}: {source}")]
    NoRepository { path: String, source: git2::Error },
    #[error("{spec} does not exist")]
    NotFound { spec: String },
    #[error("{spec} is a {kind}, expected a file")]
    BadObjectKind { spec: String, kind: String },
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("IO error reading {path}: {source}")]
    IO { path: String, source: std::io::Error },
}

/// Where the baseline manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineSource {
    /// `<remote>/<branch>:<manifest>` in the repository enclosing the root.
    Branch { remote: String, branch: String },
    File(PathBuf),
}

impl BaselineSource {
    pub fn describe(&self, manifest: &Path) -> String {
        match self {
            BaselineSource::Branch { remote, branch } => {
                format!("{}/{}:{}", remote, branch, manifest.display())
            }
            BaselineSource::File(path) => path.display().to_string(),
        }
    }

    pub fn read(&self, root: &Path, manifest: &Path) -> Result<Vec<u8>, ReadError> {
        match self {
            BaselineSource::Branch { remote, branch } => {
                read_from_branch(root, remote, branch, manifest)
            }
            BaselineSource::File(path) => read_file(&root.join(path)),
        }
    }
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, ReadError> {
    std::fs::read(path).map_err(|source| ReadError::IO {
        path: path.display().to_string(),
        source,
    })
}

/// Reads `manifest` as committed on `remote/branch` in the git repository
/// enclosing `root`. The manifest path is relative to the repository root.
pub fn read_from_branch(
    root: &Path,
    remote: &str,
    branch: &str,
    manifest: &Path,
) -> Result<Vec<u8>, ReadError> {
    let repository = Repository::discover(root).map_err(|source| ReadError::NoRepository {
        path: root.display().to_string(),
        source,
    })?;
    let manifest = manifest.to_string_lossy().replace('\\', "/");
    let spec = format!("{remote}/{branch}:{manifest}");
    debug!("Reading baseline manifest {}", spec);

    let object = match repository.revparse_single(&spec) {
        Ok(object) => object,
        Err(e) if e.code() == ErrorCode::NotFound => return Err(ReadError::NotFound { spec }),
        Err(e) => return Err(e.into()),
    };

    match object.kind() {
        Some(ObjectType::Blob) => Ok(object.peel_to_blob()?.content().to_vec()),
        Some(kind) => Err(ReadError::BadObjectKind {
            spec,
            kind: kind.to_string(),
        }),
        None => Err(ReadError::NotFound { spec }),
    }
}

#[cfg(test)]
mod tests {
    use git2::Signature;
    use tempfile::TempDir;

    use super::*;

    use pretty_assertions::assert_eq;

    fn repository_with_branch(reference: &str, files: &[(&str, &[u8])]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::init(dir.path()).unwrap();
        let mut tree = repository.treebuilder(None).unwrap();
        for (name, content) in files {
            let blob = repository.blob(content).unwrap();
            tree.insert(name, blob, 0o100644).unwrap();
        }
        let tree = repository.find_tree(tree.write().unwrap()).unwrap();
        let signature = Signature::now("Test", "test@example.com").unwrap();
        repository
            .commit(Some(reference), &signature, &signature, "base", &tree, &[])
            .unwrap();
        dir
    }

    #[test]
    fn reads_manifest_from_remote_branch() {
        let content: &[u8] = b"module example.com/m\n\nrequire example.com/lib v1.0.0\n";
        let dir = repository_with_branch("refs/remotes/upstream/master", &[("go.mod", content)]);

        let baseline = BaselineSource::Branch {
            remote: "upstream".to_owned(),
            branch: "master".to_owned(),
        };
        assert_eq!(baseline.read(dir.path(), Path::new("go.mod")).unwrap(), content);
        assert_eq!(baseline.describe(Path::new("go.mod")), "upstream/master:go.mod");
    }

    #[test]
    fn missing_branch_or_file_is_not_found() {
        let dir = repository_with_branch("refs/remotes/upstream/master", &[("other", &b"x"[..])]);

        let error = read_from_branch(dir.path(), "upstream", "master", Path::new("go.mod"))
            .unwrap_err();
        assert!(matches!(error, ReadError::NotFound { .. }), "{error}");

        let error = read_from_branch(dir.path(), "upstream", "main", Path::new("go.mod"))
            .unwrap_err();
        assert!(matches!(error, ReadError::NotFound { .. }), "{error}");
    }

    #[test]
    fn outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let error =
            read_from_branch(dir.path(), "upstream", "master", Path::new("go.mod")).unwrap_err();
        assert!(matches!(error, ReadError::NoRepository { .. }), "{error}");
    }

    #[test]
    fn reads_baseline_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.mod"), "module m\n").unwrap();
        let baseline = BaselineSource::File(PathBuf::from("old.mod"));
        assert_eq!(
            baseline.read(dir.path(), Path::new("go.mod")).unwrap(),
            b"module m\n"
        );
        assert!(matches!(
            BaselineSource::File(PathBuf::from("missing.mod")).read(dir.path(), Path::new("go.mod")),
            Err(ReadError::IO { .. })
        ));
    }
}
