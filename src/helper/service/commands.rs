use crate::cli::ServiceCommand;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::process::Command;

use super::platform::{install_linux, install_macos, linux_service_file, macos_service_file};
use super::utils::{run_capture, run_checked};
use super::{SERVICE_LABEL, SYSTEMD_UNIT};

const UNSUPPORTED: &str = "Service management is supported on macOS and Linux only";

pub fn handle_command(command: &ServiceCommand, config: &Config) -> Result<()> {
    match command {
        ServiceCommand::Install => install(config),
        ServiceCommand::Start => start(),
        ServiceCommand::Stop => stop(),
        ServiceCommand::Status => status(),
        ServiceCommand::Uninstall => uninstall(),
    }
}

fn install(config: &Config) -> Result<()> {
    if cfg!(target_os = "macos") {
        install_macos(config)
    } else if cfg!(target_os = "linux") {
        install_linux(config)
    } else {
        anyhow::bail!(UNSUPPORTED)
    }
}

fn start() -> Result<()> {
    if cfg!(target_os = "macos") {
        let plist = macos_service_file()?;
        run_checked(Command::new("launchctl").arg("load").arg("-w").arg(&plist))?;
        run_checked(Command::new("launchctl").arg("start").arg(SERVICE_LABEL))?;
    } else if cfg!(target_os = "linux") {
        run_checked(Command::new("systemctl").args(["--user", "daemon-reload"]))?;
        run_checked(Command::new("systemctl").args(["--user", "start", SYSTEMD_UNIT]))?;
    } else {
        anyhow::bail!(UNSUPPORTED)
    }
    println!("Helper service started");
    Ok(())
}

fn stop() -> Result<()> {
    if cfg!(target_os = "macos") {
        let plist = macos_service_file()?;
        let _ = run_checked(Command::new("launchctl").arg("stop").arg(SERVICE_LABEL));
        let _ = run_checked(
            Command::new("launchctl")
                .arg("unload")
                .arg("-w")
                .arg(&plist),
        );
    } else if cfg!(target_os = "linux") {
        let _ = run_checked(Command::new("systemctl").args(["--user", "stop", SYSTEMD_UNIT]));
    } else {
        anyhow::bail!(UNSUPPORTED)
    }
    println!("Helper service stopped");
    Ok(())
}

fn status() -> Result<()> {
    if cfg!(target_os = "macos") {
        let out = run_capture(Command::new("launchctl").arg("list"))?;
        let loaded = out.lines().any(|line| line.contains(SERVICE_LABEL));
        println!(
            "Service: {}",
            if loaded { "loaded" } else { "not loaded" }
        );
        println!("Agent: {}", macos_service_file()?.display());
        return Ok(());
    }

    if cfg!(target_os = "linux") {
        let out = run_capture(Command::new("systemctl").args(["--user", "is-active", SYSTEMD_UNIT]))
            .unwrap_or_else(|_| "unknown".into());
        println!("Service state: {}", out.trim());
        println!("Unit: {}", linux_service_file()?.display());
        return Ok(());
    }

    anyhow::bail!(UNSUPPORTED)
}

fn uninstall() -> Result<()> {
    stop()?;

    let file = if cfg!(target_os = "macos") {
        macos_service_file()?
    } else if cfg!(target_os = "linux") {
        linux_service_file()?
    } else {
        anyhow::bail!(UNSUPPORTED)
    };

    if file.exists() {
        fs::remove_file(&file).with_context(|| format!("Failed to remove {}", file.display()))?;
    }
    if cfg!(target_os = "linux") {
        let _ = run_checked(Command::new("systemctl").args(["--user", "daemon-reload"]));
    }
    println!("Helper service uninstalled ({})", file.display());
    Ok(())
}
