use colored::Colorize;

pub mod config;
pub mod crawl;
pub mod report;

pub fn print_banner() {
    println!(
        "{} {}",
        "imgcrawl".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "depth-bounded image crawler".bright_black());
    println!();
}
