use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::utils::{run_checked, xml_escape};
use super::{SERVICE_LABEL, SYSTEMD_UNIT};

pub(super) fn install_macos(config: &Config) -> Result<()> {
    let file = macos_service_file()?;
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }

    let exe = std::env::current_exe().context("Failed to resolve current executable")?;
    let logs_dir = config.group_container.join("logs");
    fs::create_dir_all(&logs_dir)?;

    fs::write(&file, launchd_plist(&exe, &logs_dir))?;
    println!("Installed launchd agent: {}", file.display());
    println!("   Start with: szcontext-helper service start");
    Ok(())
}

pub(super) fn install_linux(config: &Config) -> Result<()> {
    let file = linux_service_file()?;
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }

    let exe = std::env::current_exe().context("Failed to resolve current executable")?;
    fs::write(&file, systemd_unit(&exe, &config.group_container))?;
    let _ = run_checked(Command::new("systemctl").args(["--user", "daemon-reload"]));
    let _ = run_checked(Command::new("systemctl").args(["--user", "enable", SYSTEMD_UNIT]));
    println!("Installed systemd user service: {}", file.display());
    println!("   Start with: szcontext-helper service start");
    Ok(())
}

/// Agent definition running `<exe> run`, restarted by launchd on exit.
pub(super) fn launchd_plist(exe: &Path, logs_dir: &Path) -> String {
    let stdout = logs_dir.join("helper.stdout.log");
    let stderr = logs_dir.join("helper.stderr.log");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>Label</key>
  <string>{label}</string>
  <key>ProgramArguments</key>
  <array>
    <string>{exe}</string>
    <string>run</string>
  </array>
  <key>RunAtLoad</key>
  <true/>
  <key>KeepAlive</key>
  <true/>
  <key>StandardOutPath</key>
  <string>{stdout}</string>
  <key>StandardErrorPath</key>
  <string>{stderr}</string>
</dict>
</plist>
"#,
        label = xml_escape(SERVICE_LABEL),
        exe = xml_escape(&exe.display().to_string()),
        stdout = xml_escape(&stdout.display().to_string()),
        stderr = xml_escape(&stderr.display().to_string())
    )
}

/// The group container is passed through the environment so the service
/// finds the same config and socket as the interactive binaries.
pub(super) fn systemd_unit(exe: &Path, group_container: &Path) -> String {
    format!(
        "[Unit]\nDescription=SzContext helper\n\n[Service]\nType=simple\nEnvironment=\"SZCONTEXT_GROUP_CONTAINER={container}\"\nExecStart={exe} run\nRestart=always\nRestartSec=3\n\n[Install]\nWantedBy=default.target\n",
        container = group_container.display(),
        exe = exe.display()
    )
}

pub(super) fn macos_service_file() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home
        .join("Library")
        .join("LaunchAgents")
        .join(format!("{SERVICE_LABEL}.plist")))
}

pub(super) fn linux_service_file() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home
        .join(".config")
        .join("systemd")
        .join("user")
        .join(SYSTEMD_UNIT))
}
