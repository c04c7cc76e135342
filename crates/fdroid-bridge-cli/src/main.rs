use std::fs;

use clap::Parser;
use cli::{Args, Commands};
use fdroid_bridge::{
    create_minimal_index, generate_index, list_packages, load_metadata, validate_metadata,
    BridgeError, ErrorContext, Result,
};
use logging::setup_logging;
use serde_json::Value;
use tracing::{info, warn};

mod cli;
mod logging;

fn handle_cli() -> Result<i32> {
    let args = Args::parse();

    setup_logging(&args);

    match args.command {
        Commands::Validate {
            metadata_dir,
            packages,
        } => {
            let mut failures = 0usize;
            for package_id in &packages {
                match load_metadata(&metadata_dir, package_id) {
                    Ok(metadata) => {
                        let errors = validate_metadata(&metadata);
                        if errors.is_empty() {
                            info!("{package_id}: ok");
                        } else {
                            failures += 1;
                            for error in errors {
                                println!("{package_id}: {error}");
                            }
                        }
                    }
                    Err(
                        err @ (BridgeError::MetadataNotFound { .. }
                        | BridgeError::MetadataParse { .. }),
                    ) => {
                        failures += 1;
                        println!("{err}");
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(if failures == 0 { 0 } else { 1 })
        }
        Commands::Generate { repo_dir, output } => {
            let index = generate_index(&repo_dir, output.as_deref())?;
            match output {
                Some(path) => info!("Index written to {}", path.display()),
                None => println!("{}", serde_json::to_string_pretty(&index)?),
            }
            Ok(0)
        }
        Commands::Minimal {
            name,
            description,
            metadata_dir,
            output,
        } => {
            let mut apps = Vec::new();
            for package_id in list_packages(&metadata_dir)? {
                let mut metadata = load_metadata(&metadata_dir, &package_id)?;
                // The minimal builder defaults instead of rejecting, so
                // findings are only surfaced.
                for error in validate_metadata(&metadata) {
                    warn!("{package_id}: {error}");
                }
                metadata
                    .entry("package_id".to_string())
                    .or_insert_with(|| Value::String(package_id.clone()));
                apps.push(metadata);
            }

            let index = create_minimal_index(&name, &description, &apps)?;
            let content = serde_json::to_string_pretty(&index)?;
            match output {
                Some(path) => {
                    fs::write(&path, content)
                        .with_context(|| format!("writing index to {}", path.display()))?;
                    info!("Index written to {} ({} apps)", path.display(), index.apps.len());
                }
                None => println!("{content}"),
            }
            Ok(0)
        }
    }
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

    match handle_cli() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(1);
        }
    }
}
