//! CLI argument definitions for the `curvepack` binary.
//!
//! A bare invocation packages the current directory with the standard
//! layout. Every flag is optional.

use crate::pipeline::{ARCHIVE_PATH, EXPORT_DIR, PackageConfig};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::LevelFilter;

/// Package equalization results for the selector front-end.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "curvepack")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package equalization results for the selector front-end.\n\n",
    "Reads results/INDEX.md, copies each listed GraphicEQ and CSV file into ",
    "export/<name>/<source>/, writes export/index.json with a rank per source ",
    "and export/version.json with the current git revision, then compresses ",
    "the export tree into archive.tar.gz.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package the repository in the current directory:\n",
    "    $ curvepack\n\n",
    "  Package another checkout with progress logging:\n",
    "    $ curvepack -C ../AutoEq -v\n\n",
    "  Write the export tree and archive elsewhere:\n",
    "    $ curvepack --export-dir /tmp/export --archive /tmp/eq.tar.gz",
))]
pub struct Cli {
    /// Repository root containing `results/INDEX.md`.
    #[arg(short = 'C', long = "root", value_name = "DIR", default_value = ".")]
    pub root: Utf8PathBuf,

    /// Export tree location [default: <root>/export].
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<Utf8PathBuf>,

    /// Archive location [default: <root>/archive.tar.gz].
    #[arg(long, value_name = "FILE")]
    pub archive: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            export_dir: None,
            archive: None,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Log level selected by `-v` and `-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use curvepack::cli::Cli;
    /// use log::LevelFilter;
    ///
    /// assert_eq!(Cli::default().log_level(), LevelFilter::Warn);
    /// let cli = Cli { verbosity: 2, ..Cli::default() };
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Resolves the run's locations.
    ///
    /// Relative overrides are taken relative to the root directory.
    #[must_use]
    pub fn package_config(&self) -> PackageConfig {
        let export_dir = self
            .export_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(EXPORT_DIR));
        let archive = self
            .archive
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(ARCHIVE_PATH));
        let mut config = PackageConfig::with_export_root(&self.root, self.root.join(export_dir));
        config.archive_path = self.root.join(archive);
        config
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
