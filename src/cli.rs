use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "postura",
    about = "Postura - posture-assessment pipeline for cloud infrastructure-as-code",
    version
)]
pub struct Args {
    /// Repo root containing demos/ and policies/
    #[arg(short, long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Output directory for artifacts (default: <repo-root>/out)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Enable verbose logging of all operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}
