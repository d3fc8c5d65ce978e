mod session;

use session::Session;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

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
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .ok_or("usage: ferry-client <file> [host:port]")?;
    let address = match args.next() {
        Some(address) => address.parse()?,
        None => SocketAddr::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, ferry::PORT)),
    };

    let session = Session::connect(address).await?;
    let sent = session.send_file(&path).await?;
    tracing::info!("Sent {} ({} bytes)", path.display(), sent);
    Ok(())
}
