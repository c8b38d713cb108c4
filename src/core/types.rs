use serde::{Deserialize, Serialize};

/// Binding-prediction engine identity.
///
/// `NetMHCpan` is currently the only supported engine; the enum exists so
/// that adding another engine is a data change, not a new code path scattered
/// through callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    NetMhcPan,
}

impl Engine {
    /// Resolve a user-supplied tool name.
    ///
    /// Returns `None` for unrecognized names; the caller decides whether that
    /// is fatal (the CLI exits non-zero).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "netmhcpan" | "netmhcpan4.1" | "netmhcpan41" => Some(Self::NetMhcPan),
            _ => None,
        }
    }

    /// Default binary/program name for this engine.
    #[must_use]
    pub fn default_program(self) -> &'static str {
        match self {
            Self::NetMhcPan => "netMHCpan",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetMhcPan => write!(f, "NetMHCpan"),
        }
    }
}

/// Invocation strategy for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// In-process library call through a [`crate::invoke::BindingScorer`].
    Library,
    /// External subprocess writing a delimited output file.
    #[default]
    Process,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Library => write!(f, "library"),
            Self::Process => write!(f, "process"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_name() {
        assert_eq!(Engine::from_name("NetMHCpan"), Some(Engine::NetMhcPan));
        assert_eq!(Engine::from_name("netmhcpan"), Some(Engine::NetMhcPan));
        assert_eq!(Engine::from_name(" netMHCpan "), Some(Engine::NetMhcPan));
        assert_eq!(Engine::from_name("MixMHCpred"), None);
        assert_eq!(Engine::from_name(""), None);
    }

    #[test]
    fn test_engine_display() {
        assert_eq!(Engine::NetMhcPan.to_string(), "NetMHCpan");
        assert_eq!(Engine::NetMhcPan.default_program(), "netMHCpan");
    }
}
