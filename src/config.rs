//! Command-line surface and startup settings.

use crate::env::Environment;
use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// A small line-oriented command interpreter.
pub struct Args {
    #[argh(positional)]
    /// file to read commands from; commands are read interactively when omitted.
    pub batch_file: Option<PathBuf>,

    #[argh(option)]
    /// manual file shown by `help` instead of the built-in one.
    pub manual: Option<PathBuf>,

    #[argh(switch)]
    /// do not print the welcome banner.
    pub no_banner: bool,
}

/// Settings the session starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Batch file to execute; `None` selects interactive mode.
    pub batch_file: Option<PathBuf>,
    pub manual: Option<PathBuf>,
    pub banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_file: None,
            manual: None,
            banner: true,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            batch_file: args.batch_file,
            manual: args.manual,
            banner: !args.no_banner,
        }
    }
}

impl Config {
    pub fn interactive(&self) -> bool {
        self.batch_file.is_none()
    }

    /// Capture the process environment and apply these settings to it.
    pub fn environment(&self) -> Environment {
        let mut env = Environment::new();
        env.manual = self.manual.clone();
        env
    }
}
