mod sim_expression;

use sim_expression::*;

use anyhow::Result;
use clap::Parser;

/// Simulate gene expression levels using
/// `expression ~ cc1 + cc2 + snp:cc1 + snp:cc2 + error`
#[derive(Parser)]
#[command(name = "decon-sim", version, term_width = 80)]
struct Cli {
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(flatten)]
    args: SimExpressionArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    sim_expression(&cli.args)?;

    Ok(())
}
