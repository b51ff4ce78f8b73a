use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Endpoint;
use crate::error::{Result, ToolError};
use crate::model::RemoteFile;
use crate::transfer::TransferClient;

/// [`TransferClient`] serving a directory on the local filesystem.
///
/// Remote paths are resolved below `root`; a leading `/` is ignored.
/// Credentials are not checked.
#[derive(Debug)]
pub struct LocalClient {
    root: PathBuf,
    connected: bool,
}

impl LocalClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            connected: false,
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if !self.connected {
            return Err(ToolError::NotConnected);
        }
        Ok(self.root.join(path.trim_start_matches('/')))
    }
}

impl TransferClient for LocalClient {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        if !self.root.is_dir() {
            return Err(ToolError::Connection {
                host: endpoint.host.clone(),
                reason: format!("{} is not a directory", self.root.display()),
            });
        }
        self.connected = true;
        info!(root = %self.root.display(), "local store opened");
        Ok(())
    }

    fn list(&mut self, dir: &str) -> Result<Vec<RemoteFile>> {
        let resolved = self.resolve(dir)?;
        let mut files = Vec::new();
        for entry in fs::read_dir(&resolved)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = format!("{}/{}", dir.trim_end_matches('/'), name);
            files.push(RemoteFile {
                name,
                path,
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        files.sort_by(|lhs, rhs| lhs.name.cmp(&rhs.name));
        debug!(dir, entries = files.len(), "directory listed");
        Ok(files)
    }

    fn download(&mut self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path)?)?)
    }

    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path)?;
        ensure_parent(&target)?;
        fs::write(&target, bytes)?;
        debug!(path, size = bytes.len(), "file written");
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if !overwrite && target.exists() {
            return Err(ToolError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            )));
        }
        fs::rename(&source, &target)?;
        debug!(from, to, "object renamed");
        Ok(())
    }

    fn move_file(&mut self, from: &str, to: &str) -> Result<()> {
        let target = self.resolve(to)?;
        ensure_parent(&target)?;
        self.rename(from, to, false)
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Err(ToolError::NotConnected);
        }
        self.connected = false;
        info!("local store closed");
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn endpoint() -> Endpoint {
        Endpoint {
            host: "localhost".into(),
            port: 22,
            user: "bookings".into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn lists_entries_sorted_with_directory_flag() {
        let dir = tempdir().expect("temporary directory");
        fs::create_dir_all(dir.path().join("in/archived")).unwrap();
        fs::write(dir.path().join("in/b.xlsx"), b"b").unwrap();
        fs::write(dir.path().join("in/a.xlsx"), b"a").unwrap();

        let mut client = LocalClient::new(dir.path());
        client.connect(&endpoint()).expect("connected");
        let files = client.list("/in").expect("listed");

        assert_eq!(
            files,
            vec![
                RemoteFile::file("a.xlsx", "/in/a.xlsx"),
                RemoteFile::dir("archived", "/in/archived"),
                RemoteFile::file("b.xlsx", "/in/b.xlsx"),
            ]
        );
    }

    #[test]
    fn move_creates_archive_folder() {
        let dir = tempdir().expect("temporary directory");
        fs::create_dir_all(dir.path().join("in")).unwrap();
        fs::write(dir.path().join("in/a.xlsx"), b"a").unwrap();

        let mut client = LocalClient::new(dir.path());
        client.connect(&endpoint()).expect("connected");
        client
            .move_file("/in/a.xlsx", "/in/archived/a.xlsx")
            .expect("moved");

        assert!(!dir.path().join("in/a.xlsx").exists());
        assert_eq!(fs::read(dir.path().join("in/archived/a.xlsx")).unwrap(), b"a");
    }

    #[test]
    fn rename_respects_overwrite_flag() {
        let dir = tempdir().expect("temporary directory");
        fs::write(dir.path().join("old.csv"), b"old").unwrap();
        fs::write(dir.path().join("archived.csv"), b"older").unwrap();

        let mut client = LocalClient::new(dir.path());
        client.connect(&endpoint()).expect("connected");
        assert!(client.rename("/old.csv", "/archived.csv", false).is_err());
        client
            .rename("/old.csv", "/archived.csv", true)
            .expect("renamed with overwrite");
        assert_eq!(fs::read(dir.path().join("archived.csv")).unwrap(), b"old");
    }

    #[test]
    fn upload_then_download() {
        let dir = tempdir().expect("temporary directory");
        let mut client = LocalClient::new(dir.path());
        client.connect(&endpoint()).expect("connected");
        client.upload("/out/bookings.csv", b"header\n").expect("uploaded");
        assert_eq!(
            client.download("/out/bookings.csv").expect("downloaded"),
            b"header\n"
        );
    }

    #[test]
    fn missing_root_fails_to_connect() {
        let dir = tempdir().expect("temporary directory");
        let mut client = LocalClient::new(dir.path().join("absent"));
        assert!(matches!(
            client.connect(&endpoint()),
            Err(ToolError::Connection { .. })
        ));
        assert!(matches!(client.list("/"), Err(ToolError::NotConnected)));
    }
}
