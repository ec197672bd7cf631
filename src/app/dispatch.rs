use crate::capabilities::{CapabilityKind, CapabilityRegistry};
use crate::cli::{Cli, Commands, HelperCli, HelperCommands, RootsCommand};
use crate::config::Config;
use crate::requester::{Requester, Selection};
use crate::version::PROTOCOL_VERSION;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use strum::IntoEnumIterator;

use super::roots::{add_root, remove_root};

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Open { app, paths } => {
            let requester = requester(&config)?;
            let results = requester.open_all(&app, &paths).await;
            let failed = results.iter().filter(|(_, result)| result.is_err()).count();
            for (path, result) in &results {
                match result {
                    Ok(()) => println!("opened {path} with {app}"),
                    Err(err) => match err.kind() {
                        Some(kind) => println!("failed {path}: {err} [{kind}]"),
                        None => println!("failed {path}: {err}"),
                    },
                }
            }
            if failed > 0 {
                bail!("{failed} of {} requests failed", results.len());
            }
            Ok(())
        }

        Commands::OpenUrl { url } => {
            requester(&config)?.open_url(&url).await?;
            println!("opened {url}");
            Ok(())
        }

        Commands::Check { path } => {
            let requester = requester(&config)?;
            if requester.is_eligible(&path) {
                println!("{path}: eligible");
            } else {
                println!("{path}: not under an authorized root");
            }
            Ok(())
        }

        Commands::Menu { target, items } => {
            let requester = requester(&config)?;
            let selection = Selection::new(target, items);
            let menu = requester.menu(&selection);
            if menu.is_empty() {
                println!("(no eligible paths in selection)");
                return Ok(());
            }
            for path in requester.eligible_paths(&selection) {
                println!("  {path}");
            }
            for section in menu {
                println!("{}", section_title(section.kind));
                for entry in section.entries {
                    println!("  {:<28} {}", entry.display_name, entry.identifier);
                }
            }
            Ok(())
        }

        Commands::Apps { kind } => {
            let registry = CapabilityRegistry::builtin()?;
            let kinds: Vec<CapabilityKind> = match kind {
                Some(kind) => vec![kind.into()],
                None => CapabilityKind::iter().collect(),
            };
            for kind in kinds {
                println!("{}", section_title(kind));
                for entry in registry.list_all(kind) {
                    let marker = if config.capabilities.is_enabled(entry.identifier) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{marker} {:<28} {}", entry.display_name, entry.identifier);
                }
            }
            Ok(())
        }

        Commands::Roots { roots_command } => handle_roots(&roots_command, &config),

        Commands::Status => {
            let requester = requester(&config)?;
            let helper_version = requester.status().await?;
            println!("Helper: reachable ({})", config.ipc.service_name);
            println!("Protocol: requester {PROTOCOL_VERSION}, helper {helper_version}");
            if !PROTOCOL_VERSION.is_compatible_with(helper_version) {
                println!("Warning: major versions differ; requests will be rejected");
            }
            println!("Socket: {}", config.socket_path().display());
            println!("Authorized roots: {}", requester.roots().len());
            Ok(())
        }
    }
}

pub async fn dispatch_helper(cli: HelperCli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(HelperCommands::Run) {
        HelperCommands::Run => crate::helper::run(Arc::new(config)).await,
        HelperCommands::Service { service_command } => {
            crate::helper::handle_service_command(&service_command, &config)
        }
    }
}

fn requester(config: &Config) -> Result<Requester> {
    let registry = CapabilityRegistry::builtin().context("capability catalog is inconsistent")?;
    Ok(Requester::from_config(config, registry))
}

fn section_title(kind: CapabilityKind) -> &'static str {
    match kind {
        CapabilityKind::Terminal => "Open in Terminal",
        CapabilityKind::Editor => "Open in Editor",
    }
}

fn handle_roots(command: &RootsCommand, config: &Config) -> Result<()> {
    match command {
        RootsCommand::List => {
            let roots = config.authorized_roots();
            if roots.is_empty() {
                println!("No authorized roots. Add one with: szcontext roots add <dir>");
            }
            for root in roots.iter() {
                println!("{root}");
            }
            Ok(())
        }
        RootsCommand::Add { path } => {
            // Reload so environment overrides are not written back.
            let mut on_disk = Config::load_from(&config.config_path)?;
            if add_root(&mut on_disk, path)? {
                on_disk.save()?;
                println!("Authorized {path}");
            } else {
                println!("{path} is already authorized");
            }
            Ok(())
        }
        RootsCommand::Remove { path } => {
            let mut on_disk = Config::load_from(&config.config_path)?;
            if remove_root(&mut on_disk, path) {
                on_disk.save()?;
                println!("Revoked {path}");
            } else {
                println!("{path} was not authorized");
            }
            Ok(())
        }
    }
}
