use std::{env, path::PathBuf};

use clap::Parser;
use cli::{Args, Commands};
use compile::compile_document;
use error::{CliError, CliResult, ErrorContext};
use logging::setup_logging;
use strata_config::config::{self, get_config, Config, CONFIG_PATH};
use tracing::debug;
use utils::COLOR;

mod cli;
mod compile;
mod error;
mod logging;
mod utils;

fn print_config(json: bool) -> CliResult<()> {
    let config = get_config();
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", config.to_annotated_string()?);
    }
    Ok(())
}

fn generate_default_config(force: bool) -> CliResult<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
    if config_path.exists() && !force {
        return Err(CliError::ConfigExists(config_path.display().to_string()));
    }

    Config::default_config().save()?;
    Ok(())
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    if let Some(ref c) = args.config {
        let path = PathBuf::from(c);
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        debug!("using configuration at {}", path.display());
        config::set_config_path(path);
    }

    match args.command {
        Commands::DefConfig {
            force,
        } => generate_default_config(force)?,
        command => {
            config::init()?;

            match command {
                Commands::Compile {
                    file,
                    raw,
                    batch_size,
                } => compile_document(&file, raw, batch_size, args.json)?,
                Commands::Config => print_config(args.json)?,
                Commands::DefConfig {
                    ..
                } => unreachable!(),
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
