use clap::Parser;

#[derive(Parser)]
#[clap(author, version)]
#[clap(about = "Filesystem scripting language runtime")]
pub struct CliArgs {
    /// Script to run
    pub file: Option<String>,

    /// Run this code instead of a script file
    #[clap(short, long, conflicts_with = "file")]
    pub code: Option<String>,

    /// Directory the script runs in (defaults to the current one)
    #[clap(short, long)]
    pub directory: Option<String>,

    /// Parse the script and report syntax errors without running it
    #[clap(short = 'n', long)]
    pub dry_run: bool,

    /// Log more; repeat for more detail
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: usize,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}

impl CliArgs {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
