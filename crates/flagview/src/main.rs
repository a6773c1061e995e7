//! `flagview` - CLI for browsing feature flags
//!
//! This binary serves the flag pages over HTTP and prints flags for
//! terminals and scripts.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use flagview::cli::{
    Cli, Command, ConfigCommand, ListCommand, OutputFormat, ServeCommand, ShowCommand,
};
use flagview::web::render::count_label;
use flagview::{
    filter_flags, group_by_project, init_logging, Config, Error, FlagRecord, FlagStore,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(cmd) => handle_serve(load_config(cli.config)?, &cmd),
        Command::List(cmd) => handle_list(load_config(cli.config)?, &cmd),
        Command::Show(cmd) => handle_show(load_config(cli.config)?, &cmd),
        Command::Config(cmd) => handle_config(cli.config, cmd),
    }
}

fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(config_path).context("Configuration is malformed")
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(address) = cmd.address {
        config.server.address = address;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if let Some(dir) = &cmd.data_dir {
        config.data.dir.clone_from(dir);
    }
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(flagview::web::serve(&config))?;
    Ok(())
}

fn handle_list(mut config: Config, cmd: &ListCommand) -> anyhow::Result<()> {
    if let Some(dir) = &cmd.data_dir {
        config.data.dir.clone_from(dir);
    }

    let flags = FlagStore::from_config(&config.data).flags()?;
    let visible = filter_flags(&flags, cmd.query.as_deref().unwrap_or_default());

    let mut out = io::stdout().lock();
    write_list(&mut out, &visible, cmd.format)?;
    Ok(())
}

fn handle_show(mut config: Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    if let Some(dir) = &cmd.data_dir {
        config.data.dir.clone_from(dir);
    }

    let flag = FlagStore::from_config(&config.data)
        .find(&cmd.name)?
        .ok_or_else(|| Error::flag_not_found(&cmd.name))?;

    let mut out = io::stdout().lock();
    write_flag(&mut out, &flag, cmd.format)?;
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Data]");
                println!("  Directory:          {}", config.data.dir.display());
                println!("  Extensions:         {}", config.data.extensions.join(", "));
                println!();
                println!("[Server]");
                println!("  Address:            {}", config.socket_addr());
                println!();
                println!("[Render]");
                println!("  Preview language:   {}", config.render.preview_language);
                println!(
                    "  List previews:      {}",
                    config.render.list_preview_definitions
                );
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            validate_config_file(&path)?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn validate_config_file(path: &Path) -> anyhow::Result<()> {
    Config::load_from(Some(path.to_path_buf()))
        .with_context(|| format!("Configuration {} is invalid", path.display()))?;
    Ok(())
}

fn write_list(
    out: &mut impl Write,
    flags: &[&FlagRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, flags)?;
            writeln!(out)?;
        }
        OutputFormat::Plain => {
            let width = flags
                .iter()
                .map(|f| f.name.chars().count())
                .max()
                .unwrap_or(0);
            for flag in flags {
                writeln!(
                    out,
                    "{:<width$}  {:<15}  {}",
                    flag.name,
                    count_label(flag.definitions.len(), "definition", "definitions"),
                    flag.project_names().join(", ")
                )?;
            }
            writeln!(out)?;
            writeln!(out, "{}", count_label(flags.len(), "flag", "flags"))?;
        }
    }
    Ok(())
}

fn write_flag(
    out: &mut impl Write,
    flag: &FlagRecord,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let groups = group_by_project(flag);

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "Name": flag.name,
                "Projects": groups,
            });
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
        }
        OutputFormat::Plain => {
            writeln!(out, "{}", flag.name)?;
            writeln!(
                out,
                "  {}, {}, {}",
                count_label(flag.definitions.len(), "definition", "definitions"),
                count_label(groups.len(), "project", "projects"),
                count_label(groups.reference_count(), "reference", "references")
            )?;

            for group in &groups {
                writeln!(out)?;
                writeln!(
                    out,
                    "[{}] {}, {}",
                    group.project_name,
                    count_label(group.definitions.len(), "definition", "definitions"),
                    count_label(group.references.len(), "reference", "references")
                )?;
                for (index, def) in group.definitions.iter().enumerate() {
                    writeln!(
                        out,
                        "  Definition {}: {} ({})",
                        index + 1,
                        def.method.method_name,
                        def.location.path
                    )?;
                    for reference in &def.references {
                        writeln!(
                            out,
                            "    -> {}  {}",
                            reference.file_name,
                            reference.location.path
                        )?;
                    }
                }
            }
        }
    }
    Ok(())
}
