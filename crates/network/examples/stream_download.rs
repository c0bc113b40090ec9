// crates/network/examples/stream_download.rs
//! Streams a response body to a temporary file at a capped rate

use bodystream_core::{SeekableWriter, ThrottledStream};
use bodystream_network::{AdapterConfig, ClientConfig, StreamingClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.rust-lang.org/robots.txt".to_string());

    let mut client = StreamingClient::new(ClientConfig::default(), AdapterConfig { debug: true })?;

    let temp_dir = tempfile::tempdir()?;
    let destination = temp_dir.path().join("download.bin");
    let mut sink = ThrottledStream::new(SeekableWriter::create(&destination)?, 64 * 1024, 0);

    println!("Downloading {}...", url);
    let response = client.download(&url, &mut sink)?;
    bodystream_core::Stream::close(&mut sink)?;

    println!("Status: {}", response.status);
    println!("Saved {} bytes to {}", sink.transferred(), destination.display());

    Ok(())
}
