use std::path::{Path, PathBuf};

/// A root directory that has been indexed, or is about to be (spec §2, §4.1).
#[derive(Debug, Clone)]
pub struct Workspace {
    id: String,
    root: PathBuf,
    name: String,
}

impl Workspace {
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        Self {
            id: id.into(),
            root,
            name,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_from_root_directory() {
        let ws = Workspace::new("w1", "/home/dev/my-service");
        assert_eq!(ws.name(), "my-service");
    }
}
