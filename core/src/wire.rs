use bytes::{Buf, BufMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The first thing on the wire: the base name of the file being sent,
/// encoded as a u16 big-endian byte length followed by that many UTF-8
/// bytes. Everything after it is raw payload until the peer half-closes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NameRecord {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("record ends after {remaining} of {expected} expected bytes")]
    Truncated { expected: usize, remaining: usize },

    #[error("name is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("name of {0} bytes does not fit a u16 length prefix")]
    NameTooLong(usize),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

impl NameRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn encode(&self, mut buf: impl BufMut) -> Result<(), EncodeError> {
        let length = self.name.len();
        if length > u16::MAX as usize {
            return Err(EncodeError::NameTooLong(length));
        }
        buf.put_u16(length as u16);
        buf.put_slice(self.name.as_bytes());
        Ok(())
    }

    pub fn decode(mut buf: impl Buf) -> Result<Self, DecodeError> {
        if buf.remaining() < 2 {
            return Err(DecodeError::Truncated {
                expected: 2,
                remaining: buf.remaining(),
            });
        }
        let length = buf.get_u16() as usize;
        if buf.remaining() < length {
            return Err(DecodeError::Truncated {
                expected: length,
                remaining: buf.remaining(),
            });
        }
        let name = String::from_utf8(buf.copy_to_bytes(length).to_vec())?;
        Ok(Self { name })
    }
}

pub async fn write_record(
    stream: &mut (impl AsyncWrite + Unpin),
    record: &NameRecord,
) -> Result<(), EncodeError> {
    let mut buf = Vec::with_capacity(2 + record.name.len());
    record.encode(&mut buf)?;
    stream.write_all(&buf).await?;
    stream.flush().await?;
    Ok(())
}

pub async fn read_record(
    stream: &mut (impl AsyncRead + Unpin),
) -> Result<NameRecord, DecodeError> {
    let mut prefix = [0; 2];
    stream.read_exact(&mut prefix).await?;
    let mut body = vec![0; u16::from_be_bytes(prefix) as usize];
    stream.read_exact(&mut body).await?;
    let name = String::from_utf8(body)?;
    Ok(NameRecord { name })
}

/// Copies `reader` into `writer` in [`crate::CHUNK_SIZE`] chunks, flushing
/// after each one, until the reader reports end-of-stream. Returns the
/// number of bytes moved.
pub async fn copy_chunks(
    reader: &mut (impl AsyncRead + Unpin),
    writer: &mut (impl AsyncWrite + Unpin),
) -> Result<u64, std::io::Error> {
    let mut buf = [0; crate::CHUNK_SIZE];
    let mut total = 0;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(total);
        }
        writer.write_all(&buf[..n]).await?;
        writer.flush().await?;
        total += n as u64;
    }
}
