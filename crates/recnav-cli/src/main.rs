// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod catalog;
mod config;
mod demo;
mod logging;
mod resources;

use anyhow::{Context, Result};
use catalog::{Catalog, DEFAULT_SEED};
use clap::Parser;
use config::Config;
use is_terminal::IsTerminal;
use logging::LogTarget;
use recnav_tui::OutputFormat;
use resources::{Resource, Session};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Browse the demo resource catalog as navigable tables.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "recnav", version)]
struct Cli {
    /// Use a specific config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format when not interactive: text, json or yaml
    #[arg(long, short = 'o', value_name = "FORMAT", value_parser = parse_output_format)]
    output: Option<OutputFormat>,

    /// Print instead of opening the navigator
    #[arg(long)]
    no_interactive: bool,

    /// Profile name handed to loaders
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Print the resolved config path
    #[arg(long)]
    print_config_path: bool,

    /// Print a config template
    #[arg(long)]
    print_example_config: bool,

    /// Resource to open directly (apis, control-planes, portals)
    #[arg(value_name = "RESOURCE", value_parser = parse_resource)]
    resource: Option<Resource>,
}

fn parse_output_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse().map_err(|error: anyhow::Error| error.to_string())
}

fn parse_resource(raw: &str) -> Result<Resource, String> {
    raw.parse().map_err(|error: anyhow::Error| error.to_string())
}

fn main() {
    if let Err(error) = run(Cli::parse()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if cli.print_config_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if cli.print_example_config {
        print!("{}", Config::example_config(&config_path));
        return Ok(());
    }

    let config = Config::load(&config_path).with_context(|| {
        format!(
            "load config {}; run `recnav --print-example-config` to generate a v1 template",
            config_path.display()
        )
    })?;

    let format = match cli.output {
        Some(format) => format,
        None => config.output_format()?,
    };
    let interactive = !cli.no_interactive && config.interactive();
    let log_file;
    let target = if interactive && io::stdout().is_terminal() {
        log_file = config.log_file()?;
        LogTarget::File(&log_file)
    } else {
        LogTarget::Stderr
    };
    logging::init(&config.log_level(), target)?;

    let profile = cli.profile.as_deref().unwrap_or(config.profile());
    let catalog = Arc::new(Catalog::seeded(DEFAULT_SEED, config.latency()));
    tracing::info!(
        profile,
        %format,
        interactive,
        resource = cli.resource.map(|resource| resource.name()),
        latency_ms = catalog.latency().as_millis() as u64,
        "starting recnav"
    );

    let session = Session::new(catalog, profile, config.root_label(), config.max_width());
    let mut stdout = io::stdout().lock();
    session.show(&mut stdout, cli.resource, format, interactive)
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use crate::resources::Resource;
    use clap::Parser;
    use recnav_tui::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn defaults_leave_everything_to_config() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["recnav"])?;
        assert_eq!(
            cli,
            Cli {
                config: None,
                output: None,
                no_interactive: false,
                profile: None,
                print_config_path: false,
                print_example_config: false,
                resource: None,
            }
        );
        Ok(())
    }

    #[test]
    fn flags_and_resource_parse() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "recnav",
            "--config",
            "/custom/config.toml",
            "-o",
            "YAML",
            "--no-interactive",
            "--profile",
            "staging",
            "control-planes",
        ])?;
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.output, Some(OutputFormat::Yaml));
        assert!(cli.no_interactive);
        assert_eq!(cli.profile.as_deref(), Some("staging"));
        assert_eq!(cli.resource, Some(Resource::ControlPlanes));
        Ok(())
    }

    #[test]
    fn print_flags_parse() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["recnav", "--print-config-path", "--print-example-config"])?;
        assert!(cli.print_config_path);
        assert!(cli.print_example_config);
        Ok(())
    }

    #[test]
    fn unknown_format_is_rejected() {
        let error = Cli::try_parse_from(["recnav", "--output", "xml"])
            .expect_err("unknown format should fail");
        assert!(error.to_string().contains("unsupported output format"));
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let error = Cli::try_parse_from(["recnav", "routes"])
            .expect_err("unknown resource should fail");
        assert!(error.to_string().contains("unknown resource"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["recnav", "--wat"]).is_err());
    }
}
