use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Explains what is actually inside a food package", long_about = None)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["image", "text", "text_file"]),
))]
pub struct Cli {
    /// Photo of a food package or ingredient label
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Ingredient list pasted as text
    #[arg(short, long)]
    pub text: Option<String>,

    /// File containing the ingredient list
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// Only show ingredients whose name contains this term
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Model to use instead of the configured default
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
