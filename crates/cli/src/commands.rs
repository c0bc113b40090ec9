// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, Context, Result};
use bodystream_config::{Config, ConfigManager, NetworkConfig};
use bodystream_core::{
    ProgressStream, SeekableReader, SeekableWriter, SharedStream, StdoutStream, Stream,
    ThrottledStream,
};
use bodystream_network::{AdapterConfig, ClientConfig, Method, StreamingClient};
use clap::ArgMatches;
use console::style;
use std::io;
use std::path::PathBuf;

/// A decorated endpoint, boxed so every decoration fits one type
pub type BoxedStream = Box<dyn Stream + Send>;

/// Transfer settings after command line flags are applied over the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub bandwidth_limit: u64,
    pub size_hint: u64,
    pub show_progress: bool,
    pub debug: bool,
}

impl Options {
    pub fn resolve(config: &Config, matches: &ArgMatches) -> Self {
        Self {
            bandwidth_limit: matches
                .get_one::<u64>("limit")
                .copied()
                .unwrap_or(config.transfer.bandwidth_limit),
            size_hint: matches
                .get_one::<u64>("size")
                .copied()
                .unwrap_or(config.transfer.size_hint),
            show_progress: config.transfer.show_progress && !matches.get_flag("no-progress"),
            debug: config.network.debug_streaming || matches.get_flag("debug"),
        }
    }
}

/// Parses a rate such as `65536`, `64K`, `1.5M` or `1g` into bytes per second
pub fn parse_bandwidth(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    let (number, multiplier) = match trimmed.char_indices().last() {
        Some((i, unit)) if unit.is_ascii_alphabetic() => {
            let multiplier: u64 = match unit.to_ascii_uppercase() {
                'K' => 1 << 10,
                'M' => 1 << 20,
                'G' => 1 << 30,
                _ => return Err(format!("unknown unit '{}' in {:?}", unit, value)),
            };
            (&trimmed[..i], multiplier)
        }
        _ => (trimmed, 1),
    };

    let number: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid bandwidth {:?}", value))?;
    if !number.is_finite() || number < 0.0 {
        return Err(format!("bandwidth must be a non-negative number, got {:?}", value));
    }

    Ok((number * multiplier as f64).round() as u64)
}

pub fn client_config(network: &NetworkConfig) -> ClientConfig {
    ClientConfig {
        connect_timeout: network.connect_timeout(),
        timeout: network.timeout(),
        user_agent: network.user_agent.clone(),
        max_redirects: network.max_redirects,
        chunk_size: network.chunk_size,
        ..ClientConfig::default()
    }
}

/// Wraps `inner` in a throttle when a limit is set, otherwise in a progress
/// meter when progress is shown
pub fn decorate<S>(inner: S, options: &Options, total: u64, progress_on_stderr: bool) -> BoxedStream
where
    S: Stream + Send + 'static,
{
    let console: Box<dyn io::Write + Send> = match (options.show_progress, progress_on_stderr) {
        (false, _) => Box::new(io::sink()),
        (true, true) => Box::new(io::stderr()),
        (true, false) => Box::new(io::stdout()),
    };

    if options.bandwidth_limit > 0 {
        Box::new(
            ThrottledStream::new(inner, options.bandwidth_limit, total).with_console(console),
        )
    } else if options.show_progress {
        Box::new(ProgressStream::new(inner, total).with_console(console))
    } else {
        Box::new(inner)
    }
}

fn streaming_client(config: &Config, options: &Options) -> Result<StreamingClient> {
    StreamingClient::new(
        client_config(&config.network),
        AdapterConfig {
            debug: options.debug,
        },
    )
    .context("Failed to create HTTP client")
}

/// Download a URL into a file or stdout
pub fn get(config: &Config, options: &Options, matches: &ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("URL is required"))?;
    let output = matches.get_one::<PathBuf>("output");

    let mut client = streaming_client(config, options)?;

    let mut sink = match output {
        Some(path) => {
            let file = SeekableWriter::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            decorate(file, options, options.size_hint, false)
        }
        // progress must not mix with the body
        None => decorate(StdoutStream::new(), options, options.size_hint, true),
    };

    let result = client.download(url, sink.as_mut());
    sink.close().context("Failed to finish writing response body")?;

    let response = result
        .with_context(|| format!("Failed to download {}", url))?
        .error_for_status()
        .with_context(|| format!("Server refused {}", url))?;
    log::debug!("GET {} -> {}", url, response.status);

    if let Some(path) = output {
        let written = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        eprintln!(
            "{} Saved {} to {}",
            style("✓").green().bold(),
            format_size(written),
            path.display()
        );
    }

    Ok(())
}

/// Upload a file as a streamed request body
pub fn put(config: &Config, options: &Options, matches: &ArgMatches) -> Result<()> {
    let file = matches
        .get_one::<PathBuf>("file")
        .ok_or_else(|| anyhow!("File path is required"))?;
    let url = matches
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("URL is required"))?;
    let method = match matches.get_one::<String>("method").map(String::as_str) {
        Some("POST") => Method::POST,
        _ => Method::PUT,
    };

    let source = SeekableReader::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let total = match options.size_hint {
        0 => source.size_hint().unwrap_or(0),
        hint => hint,
    };

    let mut body = SharedStream::new(decorate(source, options, total, false));
    let mut client = streaming_client(config, options)?;

    let result = client.upload(method.clone(), url, body.clone());
    body.close().context("Failed to finish reading request body")?;

    let response = result
        .with_context(|| format!("Failed to upload {}", file.display()))?
        .error_for_status()
        .with_context(|| format!("Server refused {} {}", method, url))?;

    eprintln!(
        "{} Uploaded {} ({} {})",
        style("✓").green().bold(),
        format_size(total),
        method,
        response.status
    );
    if !response.body.is_empty() {
        io::Write::write_all(&mut io::stdout(), &response.body)
            .context("Failed to print response body")?;
    }

    Ok(())
}

/// Print the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", style("Transfer").bold().cyan());
    println!("  Bandwidth limit: {}", format_rate(config.transfer.bandwidth_limit));
    println!(
        "  Size hint:       {}",
        match config.transfer.size_hint {
            0 => "unknown".to_string(),
            n => format_size(n),
        }
    );
    println!("  Show progress:   {}", config.transfer.show_progress);

    println!("{}", style("Network").bold().cyan());
    println!("  Connect timeout: {}s", config.network.connect_timeout_secs);
    println!(
        "  Timeout:         {}",
        match config.network.timeout_secs {
            0 => "none".to_string(),
            secs => format!("{}s", secs),
        }
    );
    println!("  User agent:      {}", config.network.user_agent);
    println!("  Max redirects:   {}", config.network.max_redirects);
    println!("  Chunk size:      {}", format_size(config.network.chunk_size as u64));
    println!("  Debug streaming: {}", config.network.debug_streaming);

    Ok(())
}

/// Write a default configuration file
pub fn init_config(manager: &ConfigManager) -> Result<()> {
    let created = manager
        .initialize()
        .context("Failed to write configuration file")?;

    if created {
        println!(
            "{} Created {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!(
            "Configuration already exists at {}",
            manager.config_path().display()
        );
    }

    Ok(())
}

fn format_rate(bytes_per_second: u64) -> String {
    if bytes_per_second == 0 {
        "unlimited".to_string()
    } else {
        format!("{}/s", format_size(bytes_per_second))
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests;
