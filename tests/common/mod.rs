use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// The `myiq` binary pointed at `data_dir`, with defaults for everything else
///
/// The config path does not exist so no local config file leaks into the
/// test.
#[allow(dead_code)]
pub fn myiq_cmd(data_dir: &Path) -> Command {
    myiq_cmd_with_config(data_dir, &data_dir.join("no-such-config.yaml"))
}

/// The `myiq` binary with an explicit config file
///
/// `MYIQ_*` variables from the caller's environment are cleared and color
/// output is disabled.
#[allow(dead_code)]
pub fn myiq_cmd_with_config(data_dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("myiq").expect("binary should build");
    cmd.arg("--config")
        .arg(config)
        .arg("--data-dir")
        .arg(data_dir)
        .env("NO_COLOR", "1");
    for var in [
        "MYIQ_OLLAMA_HOST",
        "MYIQ_OLLAMA_MODEL",
        "MYIQ_DATA_DIR",
        "MYIQ_HISTORY_WINDOW",
        "MYIQ_MAX_CONCURRENT",
        "MYIQ_REQUEST_TIMEOUT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
