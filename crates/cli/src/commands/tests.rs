use super::*;
use std::io::Cursor;
use tempfile::TempDir;

fn matches_for(args: &[&str]) -> ArgMatches {
    let matches = crate::build_cli()
        .try_get_matches_from(args)
        .expect("arguments should parse");
    crate::innermost(&matches).clone()
}

fn drain(stream: &mut BoxedStream) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

#[test]
fn test_parse_bandwidth_plain_and_suffixed() {
    assert_eq!(parse_bandwidth("0"), Ok(0));
    assert_eq!(parse_bandwidth("65536"), Ok(65536));
    assert_eq!(parse_bandwidth("64K"), Ok(65536));
    assert_eq!(parse_bandwidth("64k"), Ok(65536));
    assert_eq!(parse_bandwidth("1.5M"), Ok(1_572_864));
    assert_eq!(parse_bandwidth(" 2G "), Ok(2 * 1024 * 1024 * 1024));
}

#[test]
fn test_parse_bandwidth_rejects_garbage() {
    assert!(parse_bandwidth("").is_err());
    assert!(parse_bandwidth("fast").is_err());
    assert!(parse_bandwidth("10T").is_err());
    assert!(parse_bandwidth("-5").is_err());
    assert!(parse_bandwidth("K").is_err());
}

#[test]
fn test_options_default_to_config() {
    let mut config = Config::default();
    config.transfer.bandwidth_limit = 1000;
    config.transfer.size_hint = 5000;

    let options = Options::resolve(&config, &matches_for(&["bodystream", "get", "http://x/"]));
    assert_eq!(
        options,
        Options {
            bandwidth_limit: 1000,
            size_hint: 5000,
            show_progress: true,
            debug: false,
        }
    );
}

#[test]
fn test_flags_override_config() {
    let config = Config::default();
    let matches = matches_for(&[
        "bodystream",
        "--limit",
        "2K",
        "get",
        "http://x/",
        "--size",
        "42",
        "--no-progress",
        "--debug",
    ]);

    let options = Options::resolve(&config, &matches);
    assert_eq!(options.bandwidth_limit, 2048);
    assert_eq!(options.size_hint, 42);
    assert!(!options.show_progress);
    assert!(options.debug);
}

#[test]
fn test_put_method_choice() {
    let matches = matches_for(&["bodystream", "put", "f.bin", "http://x/", "-X", "POST"]);
    assert_eq!(matches.get_one::<String>("method").map(String::as_str), Some("POST"));

    let matches = matches_for(&["bodystream", "put", "f.bin", "http://x/"]);
    assert_eq!(matches.get_one::<String>("method").map(String::as_str), Some("PUT"));

    assert!(crate::build_cli()
        .try_get_matches_from(["bodystream", "put", "f.bin", "http://x/", "-X", "PATCH"])
        .is_err());
}

#[test]
fn test_client_config_from_network_section() {
    let mut network = NetworkConfig::default();
    network.connect_timeout_secs = 5;
    network.chunk_size = 4096;

    let client = client_config(&network);
    assert_eq!(client.connect_timeout, std::time::Duration::from_secs(5));
    assert_eq!(client.timeout, None);
    assert_eq!(client.chunk_size, 4096);
    assert_eq!(client.user_agent, network.user_agent);
}

#[test]
fn test_decorate_keeps_content_and_capabilities() {
    let data = b"decorated body".to_vec();
    let quiet = Options {
        bandwidth_limit: 0,
        size_hint: 0,
        show_progress: false,
        debug: false,
    };
    let throttled = Options {
        bandwidth_limit: 1 << 20,
        ..quiet.clone()
    };

    for options in [quiet, throttled] {
        let source = SeekableReader::new(Cursor::new(data.clone())).unwrap();
        let caps = source.capabilities();
        let mut stream = decorate(source, &options, data.len() as u64, false);

        assert_eq!(stream.capabilities(), caps);
        assert_eq!(drain(&mut stream), data);
        stream.rewind().unwrap();
        assert_eq!(drain(&mut stream), data);
    }
}

#[test]
fn test_init_config_writes_file_once() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf()).unwrap();

    init_config(&manager).unwrap();
    assert!(manager.config_path().exists());
    init_config(&manager).unwrap();
    assert_eq!(manager.load().unwrap(), Config::default());
}

#[test]
fn test_format_size() {
    assert_eq!(format_size(512), "512 bytes");
    assert_eq!(format_size(1024), "1.00 KB");
    assert_eq!(format_size(1_048_576), "1.00 MB");
    assert_eq!(format_size(1_073_741_824), "1.00 GB");
}

#[test]
fn test_format_rate() {
    assert_eq!(format_rate(0), "unlimited");
    assert_eq!(format_rate(2048), "2.00 KB/s");
}
