use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use imgcrawl::handlers::{
    CrawlOverrides, apply_overrides, exit_code_for, load_config, log_level, resolve_root,
};
use imgcrawl_core::crawl::{CrawlOptions, execute_crawl};
use imgcrawl_core::print_banner;
use imgcrawl_core::report::{ReportFormat, generate_crawl_report, save_report};
use imgcrawl_scanner::{CancelFlag, ScanError, TransformKind};
use std::path::PathBuf;
use tracing::warn;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_count("verbose");

    tracing_subscriber::fmt()
        .with_max_level(log_level(quiet, verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let outcome = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("transforms", _)) => {
            handle_transforms();
            Ok(())
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        let code = e
            .downcast_ref::<ScanError>()
            .map(exit_code_for)
            .unwrap_or(1);
        if code == imgcrawl::handlers::EXIT_CANCELLED {
            eprintln!("{}", "[!] Crawl cancelled".yellow().bold());
        } else {
            eprintln!("{} {:#}", "[!]".red().bold(), e);
        }
        std::process::exit(code);
    }
}

async fn handle_crawl(args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let root_arg = args
        .get_one::<String>("ROOT")
        .context("missing ROOT argument")?;
    let root = resolve_root(root_arg).map_err(anyhow::Error::msg)?;

    let config = load_config(args.get_one::<PathBuf>("config")).map_err(anyhow::Error::msg)?;
    let overrides = CrawlOverrides {
        depth: args.get_one::<usize>("depth").copied(),
        transforms: args
            .get_many::<String>("transform")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        output: args.get_one::<PathBuf>("output").cloned(),
        timeout_secs: args.get_one::<u64>("timeout").copied(),
        no_image_cache: args.get_flag("no-image-cache"),
    };
    let config = apply_overrides(config, overrides).map_err(anyhow::Error::msg)?;

    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    if !quiet {
        let transforms: Vec<String> = config.transforms.iter().map(|k| k.to_string()).collect();
        println!("{} {}", "Crawling".bright_cyan().bold(), root);
        println!("Max depth: {}", config.max_depth);
        println!("Transforms: {}", transforms.join(", "));
        println!("Output: {}\n", config.output_dir.display());
    }

    // Ctrl-C sets the cancel flag; in-flight work finishes, nothing new starts
    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping crawl");
            signal_flag.cancel();
        }
    });

    let options = CrawlOptions {
        root,
        config,
        show_progress_bars: !quiet,
    };
    let summary = execute_crawl(options, cancel, None).await?;

    let report = generate_crawl_report(&summary, format)?;
    match args.get_one::<PathBuf>("report") {
        Some(path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                println!("Report saved to {}", path.display());
            }
        }
        None => println!("{}", report),
    }

    Ok(())
}

fn handle_transforms() {
    println!("{}", "Available transforms:".bright_cyan().bold());
    for kind in TransformKind::ALL {
        println!("  {}", kind);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
