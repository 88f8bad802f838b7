//! The workspace directory and its filename confinement rules.

use std::path::{Component, Path, PathBuf};

use super::error::SandboxError;

/// A flat directory of scripts.
///
/// Every filename must be a single plain path component: no separators, no
/// `..`, no absolute paths and no hidden names.
#[derive(Debug, Clone)]
pub struct ScriptWorkspace {
    root: PathBuf,
    extension: String,
}

impl ScriptWorkspace {
    /// Open the workspace, creating the root directory if needed.
    pub async fn open(
        root: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Result<Self, SandboxError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            extension: extension.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn confine(&self, filename: &str) -> Result<PathBuf, SandboxError> {
        let invalid = || SandboxError::InvalidFilename(filename.to_string());

        if filename.is_empty() || filename.starts_with('.') || filename.contains('\\') {
            return Err(invalid());
        }
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == filename => {
                Ok(self.root.join(filename))
            }
            _ => Err(invalid()),
        }
    }

    /// Path of an existing script
    pub async fn existing(&self, filename: &str) -> Result<PathBuf, SandboxError> {
        let path = self.confine(filename)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(SandboxError::NotFound(filename.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SandboxError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names of the scripts in the workspace, sorted.
    pub async fn list(&self) -> Result<Vec<String>, SandboxError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && !name.starts_with('.')
                && name.ends_with(&self.extension)
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create or overwrite a script.
    ///
    /// The content lands in a hidden temp file first and is renamed into
    /// place, so readers never observe a partial script.
    pub async fn write(&self, filename: &str, code: &str) -> Result<(), SandboxError> {
        if !filename.ends_with(&self.extension) {
            return Err(SandboxError::WrongExtension(self.extension.clone()));
        }
        let target = self.confine(filename)?;
        let temp = self
            .root
            .join(format!(".{}.{}.tmp", filename, uuid::Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&temp, code).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn read(&self, filename: &str) -> Result<String, SandboxError> {
        let path = self.existing(filename).await?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn workspace(dir: &TempDir) -> ScriptWorkspace {
        ScriptWorkspace::open(dir.path().join("ws"), ".py")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_write_read_list() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir).await;

        ws.write("b.py", "print(2)").await.unwrap();
        ws.write("a.py", "print(1)").await.unwrap();
        ws.write("a.py", "print(3)").await.unwrap();

        assert_eq!(ws.read("a.py").await.unwrap(), "print(3)");
        assert_eq!(ws.list().await.unwrap(), vec!["a.py", "b.py"]);
    }

    #[tokio::test]
    async fn test_list_skips_other_files() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir).await;

        ws.write("export.py", "print(1)").await.unwrap();
        std::fs::write(ws.root().join("out.json"), "{}").unwrap();
        std::fs::create_dir(ws.root().join("data.py")).unwrap();

        assert_eq!(ws.list().await.unwrap(), vec!["export.py"]);
    }

    #[tokio::test]
    async fn test_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir).await;

        let err = ws.write("notes.txt", "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "Filename must end with .py");
        assert!(ws.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confinement() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir).await;

        for name in ["../escape.py", "/tmp/abs.py", "sub/dir.py", ".hidden.py", "..\\x.py"] {
            assert!(
                matches!(
                    ws.write(name, "x").await,
                    Err(SandboxError::InvalidFilename(_))
                ),
                "{name} should be rejected"
            );
        }
        assert!(!dir.path().join("escape.py").exists());
    }

    #[tokio::test]
    async fn test_read_missing() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir).await;

        let err = ws.read("nope.py").await.unwrap_err();
        assert_eq!(err.to_string(), "nope.py does not exist");
    }
}
