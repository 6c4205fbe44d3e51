//! Decode a transform response document and show what it contains.

use anyhow::{Context, Result};
use clap::Parser;
use maltego_transform::{Config, ToXml, Transformation};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inspect")]
#[command(about = "Decode a Maltego transform response and print its entities")]
struct Args {
    /// Response document to read; stdin when omitted
    file: Option<PathBuf>,

    /// Dump the decoded entities as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Print the re-encoded response document
    #[arg(long)]
    reencode: bool,

    /// Fail unless re-encoding reproduces the input byte for byte
    #[arg(long)]
    check: bool,
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn print_summary(transform: &Transformation) {
    println!("\n=== Transform Response ===\n");
    println!("Entities: {}", transform.entities().len());

    for (i, entity) in transform.entities().iter().enumerate() {
        println!("{:-<60}", "");
        println!("[{}] {} = {:?} (weight {})", i, entity.entity_type(), entity.value(), entity.weight());
        for field in entity.fields() {
            println!(
                "    {:<32} {:<8} {:?}{}",
                field.name(),
                field.matching_rule(),
                field.value().unwrap_or_default(),
                field
                    .display_name()
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default()
            );
        }
    }
    println!();
}

fn main() -> Result<()> {
    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.transform.log_level),
    )
    .init();

    let args = Args::parse();

    let input = read_input(args.file.as_ref())?;
    let transform = Transformation::from_xml(&input).context("Failed to decode response")?;
    log::info!("Decoded {} entities", transform.entities().len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(transform.entities())?);
    } else if !args.reencode {
        print_summary(&transform);
    }

    let encoded = transform.to_xml()?;
    if args.reencode {
        println!("{}", encoded);
    }

    if args.check {
        if encoded != input.trim_end() {
            anyhow::bail!("Re-encoded response differs from input");
        }
        log::info!("Round trip reproduces the input");
    }

    Ok(())
}
