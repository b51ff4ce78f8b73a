use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;

use ssh2::{ErrorCode, RenameFlags, Session, Sftp};
use tracing::{debug, info, instrument};

use crate::config::Endpoint;
use crate::error::{Result, ToolError};
use crate::model::RemoteFile;
use crate::transfer::{TransferClient, file_name};

const SFTP_NO_SUCH_FILE: i32 = 2;

/// [`TransferClient`] backed by an SSH session with the SFTP subsystem.
#[derive(Default)]
pub struct SftpClient {
    connection: Option<Connection>,
}

struct Connection {
    session: Session,
    sftp: Sftp,
}

impl SftpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn sftp(&self) -> Result<&Sftp> {
        self.connection
            .as_ref()
            .map(|connection| &connection.sftp)
            .ok_or(ToolError::NotConnected)
    }

    fn open_session(endpoint: &Endpoint) -> Result<Connection> {
        let tcp = TcpStream::connect((endpoint.host.as_str(), endpoint.port))?;
        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_password(&endpoint.user, &endpoint.password)?;
        let sftp = session.sftp()?;
        Ok(Connection { session, sftp })
    }
}

impl TransferClient for SftpClient {
    #[instrument(level = "info", skip_all, fields(host = %endpoint.host, port = endpoint.port))]
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        let connection =
            Self::open_session(endpoint).map_err(|error| ToolError::Connection {
                host: endpoint.host.clone(),
                reason: error.to_string(),
            })?;
        self.connection = Some(connection);
        info!("SFTP session established");
        Ok(())
    }

    fn list(&mut self, dir: &str) -> Result<Vec<RemoteFile>> {
        let entries = self.sftp()?.readdir(Path::new(dir))?;
        let files = entries
            .into_iter()
            .map(|(path, stat)| {
                let path = path.to_string_lossy().into_owned();
                let name = file_name(&path).to_string();
                RemoteFile {
                    name,
                    path,
                    is_dir: stat.is_dir(),
                }
            })
            .collect::<Vec<_>>();
        debug!(dir, entries = files.len(), "directory listed");
        Ok(files)
    }

    fn download(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.sftp()?.open(Path::new(path))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        debug!(path, size = bytes.len(), "file downloaded");
        Ok(bytes)
    }

    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut file = self.sftp()?.create(Path::new(path))?;
        file.write_all(bytes)?;
        debug!(path, size = bytes.len(), "file uploaded");
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str, overwrite: bool) -> Result<()> {
        let sftp = self.sftp()?;
        // libssh2 speaks SFTP v3, which carries no rename flags, so an
        // existing target has to be removed first.
        if overwrite {
            ignore_missing(sftp.unlink(Path::new(to)))?;
        }
        sftp.rename(
            Path::new(from),
            Path::new(to),
            Some(RenameFlags::ATOMIC | RenameFlags::NATIVE),
        )?;
        debug!(from, to, overwrite, "object renamed");
        Ok(())
    }

    fn move_file(&mut self, from: &str, to: &str) -> Result<()> {
        self.rename(from, to, false)
    }

    fn disconnect(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Err(ToolError::NotConnected);
        };
        drop(connection.sftp);
        connection
            .session
            .disconnect(None, "bookings-sync finished", None)?;
        info!("SFTP session closed");
        Ok(())
    }
}

/// Treats "no such file" as success.
fn ignore_missing(result: std::result::Result<(), ssh2::Error>) -> Result<()> {
    match result {
        Err(error) if error.code() == ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => Ok(()),
        other => Ok(other?),
    }
}
