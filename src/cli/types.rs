//! CLI type definitions
//!
//! Top-level clap structures; each subcommand's arguments live with its
//! implementation under `commands`.

use clap::{Parser, Subcommand};

use super::commands::application::ApplicationArgs;
use super::commands::asset::AssetArgs;
use super::commands::init::InitArgs;

#[derive(Parser, Debug)]
#[command(name = "hireflow")]
#[command(about = "Hireflow - job application lifecycle and CV asset management", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Hireflow configuration and database
    Init(InitArgs),

    /// Application management commands
    Application(ApplicationArgs),

    /// Remote asset reconciliation commands
    Asset(AssetArgs),
}
