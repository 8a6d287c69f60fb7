//! `curvepack` CLI entrypoint.
//!
//! Packages a results repository into an export tree, metadata documents,
//! and a compressed archive. Missing-artefact diagnostics go to stdout; fatal
//! errors go to stderr with exit code 1.

use clap::Parser;
use curvepack::archive::TarGzArchiver;
use curvepack::cli::Cli;
use curvepack::error::Result;
use curvepack::fs::StdFilesystem;
use curvepack::git::{GitRevisionSource, SystemCommandExecutor};
use curvepack::pipeline::{PackageReport, Packager};
use log::{info, warn};
use std::io::Write;

/// Printed after errors reading the current revision.
const PROVENANCE_HINT: &str =
    "hint: version.json records the checked-out commit; run inside a git checkout or pass -C <DIR>";

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_level()).parse_default_env();
    if builder.try_init().is_err() {
        // A logger is already installed; keep it.
    }
}

fn run(cli: &Cli, diagnostics: &mut dyn Write) -> Result<()> {
    let config = cli.package_config();
    let revisions = GitRevisionSource::new(SystemCommandExecutor::new(&cli.root));
    let archiver = TarGzArchiver::default();
    let packager = Packager::new(&StdFilesystem, &archiver, &revisions);

    let report = packager.run(&config, diagnostics)?;
    log_summary(&report);
    Ok(())
}

fn log_summary(report: &PackageReport) {
    info!(
        "packaged {} entries for {} devices: {} copied, {} missing",
        report.entries,
        report.devices,
        report.copied,
        report.missing.len()
    );
    if !report.failures.is_empty() {
        warn!("{} operations failed; see errors above", report.failures.len());
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, &err);
            if err.is_provenance() {
                write_stderr_line(stderr, PROVENANCE_HINT);
            }
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}
