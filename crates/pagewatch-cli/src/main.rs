// Pagewatch CLI - operator tooling for download tokens

mod listing;
mod secret;

use clap::{Parser, Subcommand};
use colored::Colorize;
use pagewatch_token::{DownloadCapability, DownloadSecret, TokenService, DEFAULT_MAX_TTL_SECS, DEFAULT_TTL_SECS};

/// Pagewatch - download token and listing tool
#[derive(Parser)]
#[command(name = "pagewatch")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage signing secrets
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
    /// Mint and inspect download tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Query a running server for downloads
    Downloads {
        #[command(subcommand)]
        action: DownloadsAction,
    },
}

#[derive(Subcommand)]
enum SecretAction {
    /// Generate a random base secret for JWT_SECRET
    Generate {
        /// Number of random bytes
        #[arg(short, long, default_value_t = 32)]
        bytes: usize,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Mint a download token for a stored file
    Mint {
        /// Storage key of the file under the download root
        key: String,

        /// Filename offered to the downloader (defaults to the key)
        #[arg(short, long)]
        name: Option<String>,

        /// Token lifetime in seconds
        #[arg(short, long, default_value_t = DEFAULT_TTL_SECS)]
        ttl: u64,

        /// Longest lifetime the server accepts
        #[arg(long, default_value_t = DEFAULT_MAX_TTL_SECS)]
        max_ttl: u64,

        /// Base signing secret
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
    /// Verify a token and show what it grants
    Inspect {
        /// Token, or a download URL ending in one
        token: String,

        /// Longest lifetime the server accepts
        #[arg(long, default_value_t = DEFAULT_MAX_TTL_SECS)]
        max_ttl: u64,

        /// Base signing secret
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

#[derive(Subcommand)]
enum DownloadsAction {
    /// List downloadable attachments
    List {
        /// Server base URL
        #[arg(short, long, env = "PAGEWATCH_SERVER", default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Free-text filter on file name or storage path
        #[arg(short, long)]
        q: Option<String>,

        /// Only this extension (e.g. pdf)
        #[arg(short, long)]
        ext: Option<String>,

        /// Only this monitor
        #[arg(short, long)]
        monitor: Option<i64>,

        /// Number of history records to scan (1-200)
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Secret { action } => handle_secret(action),
        Commands::Token { action } => handle_token(action),
        Commands::Downloads { action } => handle_downloads(action),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn handle_secret(action: SecretAction) -> anyhow::Result<()> {
    match action {
        SecretAction::Generate { bytes } => {
            let secret = secret::generate_secret(bytes)?;
            println!("{}", secret);
            Ok(())
        }
    }
}

fn handle_token(action: TokenAction) -> anyhow::Result<()> {
    match action {
        TokenAction::Mint {
            key,
            name,
            ttl,
            max_ttl,
            secret,
        } => {
            let service = token_service(secret.as_deref(), max_ttl);
            let display_name = name.unwrap_or_else(|| key.clone());

            let token = service
                .mint(&key, &display_name, ttl)
                .ok_or_else(|| anyhow::anyhow!("Storage key must not be empty"))?;

            println!("{}", token);
            eprintln!("{} /d/{}", "Download path:".bold(), token);
            Ok(())
        }
        TokenAction::Inspect {
            token,
            max_ttl,
            secret,
        } => {
            let service = token_service(secret.as_deref(), max_ttl);
            let capability = inspect_token(&service, &token)?;

            println!("{}", "✓ Token is valid".green().bold());
            println!();
            println!("  Storage key:  {}", capability.storage_key);
            println!("  Display name: {}", capability.display_name);
            println!("  Issued at:    {}", capability.issued_at.to_rfc3339());
            println!("  Expires at:   {}", capability.expires_at.to_rfc3339());
            Ok(())
        }
    }
}

fn handle_downloads(action: DownloadsAction) -> anyhow::Result<()> {
    match action {
        DownloadsAction::List {
            server,
            q,
            ext,
            monitor,
            limit,
        } => {
            let params = listing::ListingParams {
                q,
                ext,
                monitor,
                limit,
            };
            let entries = listing::fetch_listing(&server, &params)?;

            if entries.is_empty() {
                println!("{}", "No downloads found.".yellow());
                return Ok(());
            }

            for entry in &entries {
                println!("{}", listing::format_entry(entry, &server));
            }
            eprintln!();
            eprintln!("{} download(s); links expire after a few minutes.", entries.len());
            Ok(())
        }
    }
}

/// Verifies a bare token or the last path segment of a download URL.
fn inspect_token(service: &TokenService, input: &str) -> anyhow::Result<DownloadCapability> {
    let token = input.rsplit('/').next().unwrap_or_default();
    service
        .try_verify(token)
        .map_err(|reason| anyhow::anyhow!("Token rejected: {}", reason))
}

/// Builds a token service from the configured base secret.
fn token_service(secret: Option<&str>, max_ttl: u64) -> TokenService {
    let secret = DownloadSecret::from_base(secret.unwrap_or_default());
    if secret.is_insecure_default() {
        eprintln!(
            "{} JWT_SECRET is not set; using the insecure development secret",
            "Warning:".yellow().bold()
        );
    }
    TokenService::new(&secret).with_max_ttl(max_ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(base: &str) -> TokenService {
        TokenService::new(&DownloadSecret::from_base(base))
    }

    #[test]
    fn test_inspect_accepts_token_or_download_url() {
        let service = service("cli-secret");
        let token = service.mint("report-42.pdf", "Q3 Report.pdf", 300).unwrap();

        let bare = inspect_token(&service, token.as_str()).unwrap();
        assert_eq!(bare.storage_key, "report-42.pdf");

        let url = format!("http://127.0.0.1:3000/d/{}", token);
        let from_url = inspect_token(&service, &url).unwrap();
        assert_eq!(from_url.display_name, "Q3 Report.pdf");
    }

    #[test]
    fn test_inspect_rejection_is_an_error() {
        let token = service("other-secret").mint("a.pdf", "a.pdf", 300).unwrap();

        let err = inspect_token(&service("cli-secret"), token.as_str()).unwrap_err();
        assert!(err.to_string().starts_with("Token rejected:"));
        assert!(err.to_string().contains("signature"));
    }
}
