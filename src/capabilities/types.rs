use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Which action family an application serves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CapabilityKind {
    Terminal,
    Editor,
}

/// Supported terminal emulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum TerminalApp {
    Terminal,
    ITerm,
    Hyper,
    Alacritty,
    Kitty,
}

impl TerminalApp {
    pub const fn bundle_id(self) -> &'static str {
        match self {
            Self::Terminal => "com.apple.Terminal",
            Self::ITerm => "com.googlecode.iterm2",
            Self::Hyper => "co.zeit.hyper",
            Self::Alacritty => "io.alacritty",
            Self::Kitty => "net.kovidgoyal.kitty",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Terminal => "Terminal",
            Self::ITerm => "iTerm2",
            Self::Hyper => "Hyper",
            Self::Alacritty => "Alacritty",
            Self::Kitty => "kitty",
        }
    }
}

/// Supported text and code editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum EditorApp {
    TextEdit,
    VsCode,
    VsCodeInsiders,
    VsCodium,
    Atom,
    Sublime,
    Xcode,
    BbEdit,
    CotEditor,
    IntelliJIdea,
    IntelliJIdeaCe,
    PyCharm,
    PyCharmCe,
    WebStorm,
    PhpStorm,
    GoLand,
    CLion,
    RubyMine,
}

impl EditorApp {
    pub const fn bundle_id(self) -> &'static str {
        match self {
            Self::TextEdit => "com.apple.TextEdit",
            Self::VsCode => "com.microsoft.VSCode",
            Self::VsCodeInsiders => "com.microsoft.VSCodeInsiders",
            Self::VsCodium => "com.vscodium",
            Self::Atom => "com.github.atom",
            Self::Sublime => "com.sublimetext.3",
            Self::Xcode => "com.apple.dt.Xcode",
            Self::BbEdit => "com.barebones.bbedit",
            Self::CotEditor => "com.coteditor.CotEditor",
            Self::IntelliJIdea => "com.jetbrains.intellij",
            Self::IntelliJIdeaCe => "com.jetbrains.intellij.ce",
            Self::PyCharm => "com.jetbrains.pycharm",
            Self::PyCharmCe => "com.jetbrains.pycharm.ce",
            Self::WebStorm => "com.jetbrains.webstorm",
            Self::PhpStorm => "com.jetbrains.PhpStorm",
            Self::GoLand => "com.jetbrains.goland",
            Self::CLion => "com.jetbrains.CLion",
            Self::RubyMine => "com.jetbrains.rubymine",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TextEdit => "TextEdit",
            Self::VsCode => "Visual Studio Code",
            Self::VsCodeInsiders => "Visual Studio Code - Insiders",
            Self::VsCodium => "VSCodium",
            Self::Atom => "Atom",
            Self::Sublime => "Sublime Text",
            Self::Xcode => "Xcode",
            Self::BbEdit => "BBEdit",
            Self::CotEditor => "CotEditor",
            Self::IntelliJIdea => "IntelliJ IDEA",
            Self::IntelliJIdeaCe => "IntelliJ IDEA CE",
            Self::PyCharm => "PyCharm",
            Self::PyCharmCe => "PyCharm CE",
            Self::WebStorm => "WebStorm",
            Self::PhpStorm => "PhpStorm",
            Self::GoLand => "GoLand",
            Self::CLion => "CLion",
            Self::RubyMine => "RubyMine",
        }
    }
}

/// Closed set of launch targets. Terminals and editors never substitute for
/// each other, so the kind is part of the variant rather than a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Application {
    Terminal(TerminalApp),
    Editor(EditorApp),
}

impl Application {
    pub const fn kind(self) -> CapabilityKind {
        match self {
            Self::Terminal(_) => CapabilityKind::Terminal,
            Self::Editor(_) => CapabilityKind::Editor,
        }
    }

    pub const fn bundle_id(self) -> &'static str {
        match self {
            Self::Terminal(app) => app.bundle_id(),
            Self::Editor(app) => app.bundle_id(),
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Terminal(app) => app.display_name(),
            Self::Editor(app) => app.display_name(),
        }
    }

    /// Every application, terminals first, each in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        TerminalApp::iter()
            .map(Self::Terminal)
            .chain(EditorApp::iter().map(Self::Editor))
    }
}

/// A registry entry: the application plus the identifier it is routed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationCapability {
    pub identifier: &'static str,
    pub display_name: &'static str,
    pub app: Application,
}

impl ApplicationCapability {
    pub const fn new(app: Application) -> Self {
        Self {
            identifier: app.bundle_id(),
            display_name: app.display_name(),
            app,
        }
    }

    pub const fn kind(&self) -> CapabilityKind {
        self.app.kind()
    }
}

impl From<Application> for ApplicationCapability {
    fn from(app: Application) -> Self {
        Self::new(app)
    }
}
