use ferry::wire;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::{fs::File, net::TcpStream};
use uuid::Uuid;

/// One inbound transfer. Owned entirely by the task that runs it; sessions
/// share nothing but the listener they were accepted from.
pub struct Session {
    id: Uuid,
    stream: TcpStream,
    peer: SocketAddr,
    directory: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    IO(#[from] std::io::Error),
    #[error("name: {0}")]
    Name(#[from] wire::DecodeError),
    #[error("`{0}` is not a usable file name")]
    BadName(String),
}

impl Session {
    pub fn new(id: Uuid, stream: TcpStream, peer: SocketAddr, directory: PathBuf) -> Self {
        Self {
            id,
            stream,
            peer,
            directory,
        }
    }

    /// Reads the name record, then streams the payload into the derived
    /// output file until the peer half-closes. A peer that disconnects
    /// mid-payload leaves a truncated file behind; with no length on the
    /// wire there is nothing to check it against.
    #[tracing::instrument(skip(self), fields(id = %self.id, peer = %self.peer))]
    pub async fn run(mut self) -> Result<(), Error> {
        let record = wire::read_record(&mut self.stream).await?;
        tracing::debug!("Receiving {}", record.name);
        let path = self.directory.join(derive_file_name(&record.name)?);
        let mut file = File::create(&path).await?;
        let received = wire::copy_chunks(&mut self.stream, &mut file).await?;
        tracing::info!(path = %path.display(), bytes = received, "Stored file");
        Ok(())
    }
}

/// `photo.png` is stored as `photo-2.png`; a name with no extension gets
/// the suffix appended. Directory components in the received name are
/// dropped so a peer cannot write outside the destination directory.
fn derive_file_name(name: &str) -> Result<String, Error> {
    let base = Path::new(name)
        .file_name()
        .and_then(|base| base.to_str())
        .ok_or_else(|| Error::BadName(name.to_string()))?;
    Ok(match base.rfind('.') {
        Some(dot) => format!("{}-2{}", &base[..dot], &base[dot..]),
        None => format!("{}-2", base),
    })
}
