use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join("octoform.kdl"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    #[allow(dead_code)]
    pub fn state(&self) -> Option<String> {
        fs::read_to_string(self.root.path().join(".octoform/state.json")).ok()
    }
}
