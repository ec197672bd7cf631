use clap::{Parser, Subcommand};

mod subcommands;

pub use subcommands::{KindArg, RootsCommand, ServiceCommand};

/// `SzContext` - open folders from the file browser in your terminal or editor.
#[derive(Parser, Debug)]
#[command(name = "szcontext")]
#[command(author = "roadtodream")]
#[command(version)]
#[command(about = "Open folders in a terminal or editor through the SzContext helper.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open paths with an application (one request per path, sent concurrently)
    Open {
        /// Capability identifier, e.g. com.microsoft.VSCode
        #[arg(short, long)]
        app: String,

        /// Paths under an authorized root
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Handle a szcontext://open?app=...&path=... URL
    OpenUrl {
        url: String,
    },

    /// Report whether a path is eligible for the contextual action
    Check {
        path: String,
    },

    /// Show the contextual menu for a selection
    Menu {
        /// Folder shown by the file browser, used when nothing is selected
        #[arg(long)]
        target: Option<String>,

        /// Selected items
        items: Vec<String>,
    },

    /// List supported applications
    Apps {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Manage authorized roots
    Roots {
        #[command(subcommand)]
        roots_command: RootsCommand,
    },

    /// Check that the helper is reachable
    Status,
}

/// `szcontext-helper` - privileged launcher for `SzContext` requests.
#[derive(Parser, Debug)]
#[command(name = "szcontext-helper")]
#[command(author = "roadtodream")]
#[command(version)]
#[command(about = "Privileged helper that launches applications for SzContext.", long_about = None)]
pub struct HelperCli {
    #[command(subcommand)]
    pub command: Option<HelperCommands>,
}

#[derive(Subcommand, Debug)]
pub enum HelperCommands {
    /// Serve requests on the helper socket until interrupted (default)
    Run,

    /// Manage the helper background service
    Service {
        #[command(subcommand)]
        service_command: ServiceCommand,
    },
}
