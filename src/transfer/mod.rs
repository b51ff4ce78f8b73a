//! Remote file store access.
//!
//! The pipeline talks to the store exclusively through [`TransferClient`];
//! [`SftpClient`] is the production backend and [`LocalClient`] serves a
//! directory on the local filesystem for dry runs.

mod local;
mod sftp;

pub use local::LocalClient;
pub use sftp::SftpClient;

use crate::config::Endpoint;
use crate::error::Result;
use crate::model::RemoteFile;

/// Blocking session-oriented access to a file store.
///
/// Every operation other than [`connect`](TransferClient::connect) requires
/// an open session.
pub trait TransferClient {
    /// Opens the session.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()>;

    /// Lists the entries directly below `dir` in store order.
    fn list(&mut self, dir: &str) -> Result<Vec<RemoteFile>>;

    /// Fetches the whole content of a file.
    fn download(&mut self, path: &str) -> Result<Vec<u8>>;

    /// Creates or overwrites a file.
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Renames an object, replacing the destination when `overwrite` is set.
    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()>;

    /// Relocates a consumed file into an archive location.
    fn move_file(&mut self, from: &str, to: &str) -> Result<()>;

    /// Closes the session.
    fn disconnect(&mut self) -> Result<()>;
}

impl<T: TransferClient + ?Sized> TransferClient for &mut T {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        (**self).connect(endpoint)
    }

    fn list(&mut self, dir: &str) -> Result<Vec<RemoteFile>> {
        (**self).list(dir)
    }

    fn download(&mut self, path: &str) -> Result<Vec<u8>> {
        (**self).download(path)
    }

    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        (**self).upload(path, bytes)
    }

    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()> {
        (**self).rename(from, to, overwrite)
    }

    fn move_file(&mut self, from: &str, to: &str) -> Result<()> {
        (**self).move_file(from, to)
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }
}

/// Final path component of a `/`-separated remote path.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
