use clap::Parser;

/// s3nav - browse S3 profiles, buckets and objects from the terminal
#[derive(Parser, Debug)]
#[command(name = "s3nav")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connect with this AWS profile right away instead of picking one
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Region for the session (defaults to the saved preference)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Enable debug logging to the log file
    #[arg(short, long, default_value = "false")]
    pub debug: bool,
}
