use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

use kube_pki::batch;
use kube_pki::config::Config;

#[derive(Parser)]
#[command(name = "kube-pki", version, about = "Bootstrap a cluster X.509 PKI")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the root certificate authority
    InitCa {
        /// Certificate authority name
        #[arg(long, default_value = "root")]
        ca: String,
    },
    /// Generate private key and certificate signing requests from config
    GenCsr {
        /// Path to output dir
        #[arg(short, long, default_value = "cert")]
        output: PathBuf,
    },
    /// Sign certificate signing requests
    Sign {
        /// Certificate authority name
        #[arg(long, default_value = "root")]
        ca: String,
        /// Path to output dir
        #[arg(short, long, default_value = "cert")]
        output: PathBuf,
        /// PEM-encoded CSR files to sign
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::from_file(&cli.config)?;

    match cli.command {
        Command::InitCa { ca } => batch::init_ca(&cfg, &ca),
        Command::GenCsr { output } => batch::generate_csrs(&cfg, &output),
        Command::Sign { ca, output, files } => batch::sign_files(&cfg, &ca, &files, &output),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR: {:#}", err);
        process::exit(1);
    }
}
