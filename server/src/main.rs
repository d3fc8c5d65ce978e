mod session;

use ferry::PORT;
use session::Session;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::PathBuf;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("io: {0}")]
    IO(#[from] std::io::Error),
}

struct Server {
    listener: TcpListener,
    directory: PathBuf,
}

impl Server {
    pub async fn new(directory: PathBuf) -> Result<Self, Error> {
        let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, PORT)).await?;
        Ok(Self {
            listener,
            directory,
        })
    }

    /// Accepts connections forever, one transfer session per task. A failed
    /// session ends that transfer only; the loop keeps accepting.
    pub async fn run(self) -> Result<(), Error> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let id = Uuid::new_v4();
            tracing::info!(%id, %peer, "Accepted connection");
            let session = Session::new(id, stream, peer, self.directory.clone());
            tokio::spawn(async move {
                if let Err(err) = session.run().await {
                    tracing::error!(%err, "Transfer failed");
                }
            });
        }
    }
}

fn init_logging() {
    const LOG_ENV: &str = "RUST_LOG";
    use std::str::FromStr;
    use tracing::Level;
    use tracing_subscriber::EnvFilter;

    let filter = std::env::var(LOG_ENV)
        .map(|env| {
            EnvFilter::from_str(env.to_uppercase().as_str())
                .unwrap_or_else(|err| panic!("invalid `{}` environment variable {}", LOG_ENV, err))
        })
        .unwrap_or(EnvFilter::default().add_directive(Level::INFO.into()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let directory = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let server = Server::new(directory).await?;
    tracing::info!("Listening on port {}", PORT);
    server.run().await?;
    Ok(())
}
