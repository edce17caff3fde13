use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub verbosity: VerbosityLevel,
    /// Report branch tags that no operation claimed.
    pub include_unconsumed: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            verbosity: VerbosityLevel::Normal,
            include_unconsumed: true,
        }
    }
}

impl EmitterConfig {
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
}

impl VerbosityLevel {
    pub fn should_print_tables(&self) -> bool {
        !matches!(self, VerbosityLevel::Quiet)
    }

    pub fn should_print_summary(&self) -> bool {
        !matches!(self, VerbosityLevel::Normal)
    }

    pub fn should_describe_values(&self) -> bool {
        matches!(self, VerbosityLevel::Verbose)
    }
}
