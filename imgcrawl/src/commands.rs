use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("imgcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("imgcrawl")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress and non-essential output")
                .required(false),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .action(clap::ArgAction::Count),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl pages reachable from ROOT and apply each transform to every image \
                found, at most once per image.",
                )
                .arg(
                    arg!(<ROOT>)
                        .required(true)
                        .help("Root page: an http(s) URL, a file URL or a local path"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth below the root page (default: 3)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-t --"transform" <KIND>)
                        .required(false)
                        .help("Transform to apply; repeat for several (default: all)")
                        .value_parser(["grayscale", "mirror", "sepia"])
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory for transformed images (default: ./downloaded-images)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-c --"config" <FILE>)
                        .required(false)
                        .help("JSON config file; command-line flags override its values")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"no-image-cache")
                        .required(false)
                        .help("Download an image again every time it is referenced")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("HTTP request timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-r --"report" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(command!("transforms").about("List the available image transforms"))
}
