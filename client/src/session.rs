use ferry::wire::{self, NameRecord};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt, net::TcpStream};

/// One outbound transfer, from connect to half-close.
pub struct Session {
    stream: TcpStream,
    peer: SocketAddr,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    IO(#[from] std::io::Error),
    #[error("name: {0}")]
    Name(#[from] wire::EncodeError),
    #[error("`{0}` has no file name")]
    NoFileName(PathBuf),
    #[error("`{0}` has a non-UTF-8 file name")]
    NonUtf8FileName(PathBuf),
}

impl Session {
    #[tracing::instrument]
    pub async fn connect(address: SocketAddr) -> Result<Self, Error> {
        let stream = TcpStream::connect(address).await?;
        tracing::debug!("Connected to {}", address);
        Ok(Self {
            stream,
            peer: address,
        })
    }

    /// Sends the base name first, then the file's bytes, then half-closes
    /// the write direction so the receiver sees end-of-payload.
    #[tracing::instrument(skip(self), fields(peer = %self.peer))]
    pub async fn send_file(mut self, path: &Path) -> Result<u64, Error> {
        let record = NameRecord::new(base_name(path)?);
        let mut file = File::open(path).await?;
        wire::write_record(&mut self.stream, &record).await?;
        let sent = wire::copy_chunks(&mut file, &mut self.stream).await?;
        self.stream.shutdown().await?;
        tracing::debug!("Sent {} bytes as {}", sent, record.name);
        Ok(sent)
    }
}

fn base_name(path: &Path) -> Result<&str, Error> {
    path.file_name()
        .ok_or_else(|| Error::NoFileName(path.to_path_buf()))?
        .to_str()
        .ok_or_else(|| Error::NonUtf8FileName(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry::wire;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name(Path::new("/tmp/photos/photo.png")).unwrap(), "photo.png");
        assert_eq!(base_name(Path::new("report")).unwrap(), "report");
    }

    #[test]
    fn base_name_rejects_bare_directory() {
        assert!(matches!(
            base_name(Path::new("/tmp/..")),
            Err(Error::NoFileName(_))
        ));
    }

    #[tokio::test]
    async fn sends_name_then_payload_then_half_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let dir = std::env::temp_dir().join(format!("ferry-client-test-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let source = dir.join("photo.png");
        let payload: Vec<u8> = (0..3000).map(|i| (i % 251) as u8).collect();
        tokio::fs::write(&source, &payload).await.unwrap();

        let sender = tokio::spawn(async move {
            let session = Session::connect(address).await.unwrap();
            session.send_file(&source).await.unwrap()
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        let record = wire::read_record(&mut stream).await.unwrap();
        assert_eq!(record.name, "photo.png");
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();

        assert_eq!(sender.await.unwrap(), payload.len() as u64);
        assert_eq!(received, payload);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn missing_source_file_fails_before_any_write() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let session = Session::connect(address).await.unwrap();
        let result = session.send_file(Path::new("/definitely/not/here.bin")).await;
        assert!(matches!(result, Err(Error::IO(_))));
    }
}
