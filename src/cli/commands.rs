//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::naming::InputKind;
use crate::application::services::{ConversionService, Projection};
use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Entity;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `clubcodes --help`".into(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "clubcodes", &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => config_command(cli, command),
        _ => {
            let container = ServiceContainer::new(load_settings(cli)?);
            match command {
                Commands::Convert { files, out_dir } => convert(&container, files, out_dir.as_deref()),
                Commands::Fetch {
                    lang,
                    flat,
                    out_dir,
                    stdout,
                } => fetch(&container, projection(*lang, *flat), out_dir.as_deref(), *stdout),
                Commands::Link => {
                    output::info(&container.remote_service()?.link());
                    Ok(())
                }
                Commands::Lang { file } => {
                    let text = read_input(&container, file)?;
                    output::info(&container.conversion_service().csv_to_lang_json(&text)?);
                    Ok(())
                }
                Commands::Flatten { file } => {
                    let text = read_input(&container, file)?;
                    output::raw(&container.conversion_service().csv_to_flat_csv(&text)?);
                    Ok(())
                }
                Commands::Show { file } => show(&container, file),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

/// Settings from config layers, then command-line overrides.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(layout) = cli.layout {
        settings.layout = layout;
    }
    if let Some(rule) = cli.rule {
        settings.classifier = rule;
    }
    debug!(
        "settings: layout={} classifier={}",
        settings.layout, settings.classifier
    );
    Ok(settings)
}

fn projection(lang: bool, flat: bool) -> Projection {
    match (lang, flat) {
        (true, _) => Projection::Lang,
        (_, true) => Projection::Flat,
        _ => Projection::Tree,
    }
}

fn read_input(container: &ServiceContainer, file: &Path) -> CliResult<String> {
    Ok(container
        .fs
        .read_to_string(file)
        .with_path_context("read input", file)?)
}

/// Print kind, message and offending value of a failed conversion.
fn report_failure(input: &Path, e: &ApplicationError) {
    output::error(&format!("{}: {}", input.display(), e));
    if let Some(value) = e.domain().and_then(|d| d.offending_value()) {
        output::detail(&value);
    }
}

#[instrument(skip(container))]
fn convert(container: &ServiceContainer, files: &[PathBuf], out_dir: Option<&Path>) -> CliResult<()> {
    let service = container.conversion_service();
    let outcomes = service.convert_all(files, out_dir);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(written) => output::success(&format!(
                "{} -> {}",
                outcome.input.display(),
                written.display()
            )),
            Err(e) => {
                failed += 1;
                report_failure(&outcome.input, e);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Batch {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

#[instrument(skip(container))]
fn fetch(
    container: &ServiceContainer,
    projection: Projection,
    out_dir: Option<&Path>,
    stdout: bool,
) -> CliResult<()> {
    let csv_text = container.remote_service()?.fetch_csv()?;
    let service = container.conversion_service();

    if stdout {
        let converted = match projection {
            Projection::Tree => service.csv_to_json(&csv_text)?,
            Projection::Lang => service.csv_to_lang_json(&csv_text)?,
            Projection::Flat => service.csv_to_flat_csv(&csv_text)?,
        };
        output::raw(&converted);
        return Ok(());
    }

    let written = service.convert_fetched(&csv_text, projection, out_dir)?;
    output::success(&format!("fetched -> {}", written.display()));
    Ok(())
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let service = container.conversion_service();
    let text = read_input(container, file)?;
    let entities = decode_any(&service, file, &text)?;
    output::info(&render_tree(&file.display().to_string(), &entities));
    Ok(())
}

fn decode_any(service: &ConversionService, file: &Path, text: &str) -> CliResult<Vec<Entity>> {
    let entities = match InputKind::detect(file)? {
        InputKind::Csv => service.decode_csv(text)?,
        InputKind::Json => service.decode_json(text)?,
    };
    Ok(entities)
}

fn render_tree(root: &str, entities: &[Entity]) -> Tree<String> {
    let mut tree = Tree::new(root.to_string());
    for entity in entities {
        let mut node = Tree::new(entity_line(entity));
        for branch in &entity.branches {
            node.push(Tree::new(entity_line(branch)));
        }
        tree.push(node);
    }
    tree
}

fn entity_line(entity: &Entity) -> String {
    format!("{}  {} ({})", entity.code, entity.label, entity.location)
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::raw(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine global config directory".into()))?
            } else {
                cli.config
                    .clone()
                    .unwrap_or_else(|| local_config_path(Path::new(".")))
            };
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            output::info("Set [remote] key to fetch a published sheet.");
            Ok(())
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match global_config_path() {
                Some(p) => path_line("global", &p),
                None => output::failure("global: unavailable"),
            }
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| local_config_path(Path::new(".")));
            path_line("local", &local);
            Ok(())
        }
    }
}

fn path_line(label: &str, path: &Path) {
    if path.exists() {
        output::success(&format!("{}: {}", label, path.display()));
    } else {
        output::failure(&format!("{}: {} (not found)", label, path.display()));
    }
}
