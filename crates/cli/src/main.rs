//! Sign and verify files using your SSH key.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shig_core::{
    ConsoleOutput, Settings, SettingsOverrides, TrustOptions, default_config_path, sign_files,
    verify_files,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shig")]
#[command(about = "Sign and verify files using your SSH key")]
#[command(version)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/shig/config.toml)
    #[arg(long, global = true, env = "SHIG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct SignatureArgs {
    /// Namespace the signature is bound to (default: file)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Signature file name; %f is replaced with the input file (default: %f.sig)
    #[arg(long)]
    signature_file: Option<String>,

    /// Hash algorithm, sha256 or sha512 (default: sha512)
    #[arg(long)]
    hash: Option<String>,
}

#[derive(Args, Clone, Default)]
struct TrustArgs {
    /// Trust the public keys of this GitHub user
    #[arg(short = 'G', long)]
    github: Option<String>,

    /// Trust the key with this SHA256 fingerprint
    #[arg(short = 'T', long)]
    thumbprint: Option<String>,

    /// Trust this public key, or the keys listed in this authorized_keys file
    #[arg(short = 'K', long = "publickey")]
    public_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign one or more files with your SSH private key
    #[command(alias = "s")]
    #[command(after_help = "Example: shig sign --key ~/.ssh/id_ed25519 file1.txt file2.txt")]
    Sign {
        /// SSH private key (default: $HOME/.ssh/id_rsa)
        #[arg(short, long)]
        key: Option<String>,

        #[command(flatten)]
        signature: SignatureArgs,

        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Verify that files match their signatures and were signed by a trusted key
    #[command(visible_aliases = ["v", "check"])]
    #[command(after_help = "Example: shig verify --github octocat file1.txt file2.txt")]
    Verify {
        #[command(flatten)]
        signature: SignatureArgs,

        #[command(flatten)]
        trust: TrustArgs,

        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
}

impl SignatureArgs {
    fn overrides(self, key: Option<String>) -> SettingsOverrides {
        SettingsOverrides {
            key,
            namespace: self.namespace,
            hash: self.hash,
            signature_file: self.signature_file,
        }
    }
}

impl From<TrustArgs> for TrustOptions {
    fn from(args: TrustArgs) -> Self {
        Self {
            github: args.github,
            thumbprint: args.thumbprint,
            public_key: args.public_key,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            println!("FAIL: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command. `Ok(false)` means at least one file failed.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config.or_else(default_config_path);
    let mut output = ConsoleOutput;

    let result = match cli.command {
        Commands::Sign {
            key,
            signature,
            files,
        } => {
            let settings = Settings::load(config_path.as_deref(), &signature.overrides(key))
                .context("failed to load configuration")?;
            sign_files(&settings.sign(), &files, &mut output).context("signing aborted")?
        }
        Commands::Verify {
            signature,
            trust,
            files,
        } => {
            let settings = Settings::load(config_path.as_deref(), &signature.overrides(None))
                .context("failed to load configuration")?;
            verify_files(
                &settings.verify(),
                &trust.into(),
                &settings.github,
                &files,
                &mut output,
            )
            .await
            .context("verification aborted")?
        }
    };

    tracing::debug!(
        config = ?config_path,
        passed = result.passed(),
        total = result.reports.len(),
        "command finished"
    );
    Ok(result.all_passed())
}
