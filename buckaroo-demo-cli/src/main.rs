//! Buckaroo Demo CLI
//!
//! Command-line interface for signing, verifying and inspecting NVP
//! gateway messages.

use anyhow::Result;
use buckaroo_lib::HashMethod;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "buckaroo-demo")]
#[command(about = "Buckaroo Demo CLI - Sign, verify and inspect NVP gateway messages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign parameters and print the request body
    Sign {
        /// Parameters as key=value
        #[arg(required = true)]
        params: Vec<String>,

        /// Shared secret
        #[arg(long, env = "BUCKAROO_SECRET", hide_env_values = true)]
        secret: String,

        /// Digest algorithm (sha1, sha256, sha512)
        #[arg(long, default_value = "sha1")]
        hash_method: HashMethod,
    },

    /// Verify the signature of a response or push body
    Verify {
        /// Form-encoded body, or - to read stdin
        body: String,

        /// Shared secret
        #[arg(long, env = "BUCKAROO_SECRET", hide_env_values = true)]
        secret: String,

        /// Digest algorithm (sha1, sha256, sha512)
        #[arg(long, default_value = "sha1")]
        hash_method: HashMethod,
    },

    /// Decode a form-encoded body
    Decode {
        /// Form-encoded body, or - to read stdin
        body: String,
    },

    /// Group indexed fields of a body
    MapFields {
        /// Form-encoded body, or - to read stdin
        body: String,

        /// Field prefix
        #[arg(short, long, default_value = "brq_services")]
        prefix: String,
    },

    /// Classify a status code
    ClassifyStatus {
        /// Value of brq_statuscode
        code: String,
    },

    /// Classify a transaction type code
    ClassifyType {
        /// Value of brq_transaction_type
        code: Option<String>,

        /// Value of brq_recurring
        #[arg(long)]
        recurring: Option<String>,
    },

    /// List iDEAL issuers
    Issuers,

    /// Build an IBAN from domestic account details
    Iban {
        /// Account number
        account: String,

        /// Bank code (e.g. INGB)
        bank: String,

        /// Country code
        #[arg(short, long, default_value = "NL")]
        country: String,
    },

    /// Query the live gateway for a transaction status (uses BUCKAROO_* env)
    Status {
        /// Transaction key
        #[arg(long, conflicts_with = "payment")]
        transaction: Option<String>,

        /// Payment key
        #[arg(long)]
        payment: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("buckaroo_demo_cli=debug,buckaroo_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("buckaroo_demo_cli=info,buckaroo_lib=warn")
            .init();
    }

    let output = commands::Output {
        json: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch commands
    let result = match cli.command {
        Commands::Sign {
            params,
            secret,
            hash_method,
        } => commands::signing::sign(&params, &secret, hash_method, output),
        Commands::Verify {
            body,
            secret,
            hash_method,
        } => commands::signing::verify(&body, &secret, hash_method, output),
        Commands::Decode { body } => commands::inspect::decode(&body, output),
        Commands::MapFields { body, prefix } => {
            commands::inspect::map_fields(&body, &prefix, output)
        }
        Commands::ClassifyStatus { code } => commands::inspect::classify_status(&code, output),
        Commands::ClassifyType { code, recurring } => {
            commands::inspect::classify_type(code.as_deref(), recurring.as_deref(), output)
        }
        Commands::Issuers => commands::reference::issuers(output),
        Commands::Iban {
            account,
            bank,
            country,
        } => commands::reference::iban(&account, &bank, &country, output),
        Commands::Status {
            transaction,
            payment,
        } => commands::status::run(transaction, payment, output).await,
    };

    if let Err(e) = result {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
