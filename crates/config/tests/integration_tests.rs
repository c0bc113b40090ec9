//! Integration tests for the configuration system

use bodystream_config::{
    Config, ConfigManager, ConfigSection, NetworkConfig, TransferConfig, CONFIG_VERSION,
};
use std::fs;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let created = manager.initialize()?;
    assert!(created);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);

    let mut modified = config.clone();
    modified.transfer.bandwidth_limit = 128 * 1024;
    modified.network.debug_streaming = true;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded.transfer.bandwidth_limit, 128 * 1024);
    assert!(reloaded.network.debug_streaming);

    assert!(!manager.initialize()?);
    assert_eq!(manager.load()?, reloaded);

    let backup = fs::read_to_string(manager.config_path().with_extension("toml.backup"))?;
    assert!(backup.contains("# Target rate in bytes per second"));

    Ok(())
}

#[test]
fn test_initialized_file_documents_every_setting() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.initialize()?;

    let text = fs::read_to_string(manager.config_path())?;
    assert!(text.contains("[transfer]"));
    assert!(text.contains("[network]"));
    for key in [
        "bandwidth_limit = 0",
        "size_hint = 0",
        "show_progress = true",
        "connect_timeout_secs = 30",
        "timeout_secs = 0",
        "debug_streaming = false",
    ] {
        assert!(text.contains(key), "missing {}", key);
    }
    assert!(text.lines().filter(|l| l.starts_with('#')).count() > 10);
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_invalid_config_rejected_on_save() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.save(&Config::default())?;

    let mut invalid = Config::default();
    invalid.network.user_agent = String::new();
    assert!(manager.save(&invalid).is_err());

    // the file on disk is untouched
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_unknown_keys_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        "version = 1\n[transfer]\nsize_hint = 5000\nfuture_knob = true\n",
    )?;

    let config = manager.load()?;
    assert_eq!(config.transfer.size_hint, 5000);
    assert_eq!(config.network, NetworkConfig::default());

    Ok(())
}

#[test]
fn test_section_names() {
    assert_eq!(TransferConfig::default().section_name(), "transfer");
    assert_eq!(NetworkConfig::default().section_name(), "network");
}
