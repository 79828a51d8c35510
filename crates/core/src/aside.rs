//! Slide-in aside panels.
//!
//! At most one aside is open at a time. Opening a panel replaces whatever
//! was open; toggling the open panel closes it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`AsideKind`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsideKindError {
    /// The name does not match any known panel.
    #[error("unknown aside panel: {0}")]
    Unknown(String),
}

/// A named slide-in panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsideKind {
    /// The cart tray.
    Cart,
    /// The mobile navigation menu.
    MobileMenu,
    /// The search drawer.
    Search,
}

impl AsideKind {
    /// Returns the panel's identifier as used in URLs and templates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::MobileMenu => "mobile-menu",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for AsideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AsideKind {
    type Err = AsideKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "mobile-menu" => Ok(Self::MobileMenu),
            "search" => Ok(Self::Search),
            other => Err(AsideKindError::Unknown(other.to_string())),
        }
    }
}

/// Which aside, if any, is currently open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AsideState(Option<AsideKind>);

impl AsideState {
    /// A state with `kind` open.
    #[must_use]
    pub const fn opened(kind: AsideKind) -> Self {
        Self(Some(kind))
    }

    /// The currently open panel.
    #[must_use]
    pub const fn current(&self) -> Option<AsideKind> {
        self.0
    }

    /// Whether `kind` is the open panel.
    #[must_use]
    pub fn is_open(&self, kind: AsideKind) -> bool {
        self.0 == Some(kind)
    }

    /// Open `kind`, replacing any other open panel.
    pub const fn open(&mut self, kind: AsideKind) {
        self.0 = Some(kind);
    }

    /// Close whatever is open.
    pub const fn close(&mut self) {
        self.0 = None;
    }

    /// Close `kind` if it is open, otherwise open it.
    pub fn toggle(&mut self, kind: AsideKind) {
        self.0 = if self.is_open(kind) { None } else { Some(kind) };
    }
}
