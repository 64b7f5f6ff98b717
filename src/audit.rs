use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Write an entry to the audit log in the config directory
pub fn log(entry: &str) -> Result<()> {
    let log_dir = crate::config::config_dir();
    std::fs::create_dir_all(&log_dir)?;
    log_to(&log_dir.join("audit.log"), entry)
}

/// Append a timestamped entry to the given log file
pub fn log_to(log_path: &Path, entry: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        entry
    )?;
    Ok(())
}
