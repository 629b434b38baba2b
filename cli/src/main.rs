//! abilens CLI: decode EVM calldata and Solidity struct blobs from the terminal.
//!
//! # Commands
//! ```
//! abilens decode-call   --calldata <hex> [--signature <sig>] [--no-selector] [--json] [--offline]
//! abilens decode-struct --definitions <file> [--name <Struct>] --data <hex> [--json]
//! abilens structs       --definitions <file>
//! abilens roots         --definitions <file>
//! abilens lookup        --selector <hex> [--offline]
//! abilens selector      --signature <sig>
//! abilens encode        --signature <sig> [--args <json>]
//! abilens info
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use abilens_core::{hexutil::parse_selector, DecoderConfig, SignatureResolver};
use abilens_evm::{render_report, selector::selector_hex, CalldataDecoder, FunctionSpec};
use abilens_observability::init_tracing;
use abilens_registry::{
    CachingResolver, FourByteResolver, MemorySignatureRegistry, ResolverChain, SignatureCache,
};
use tracing::{debug, info};

mod cmd_encode;
mod cmd_structs;
mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "abilens",
    about = "Recursive EVM calldata decoder",
    long_about = "
abilens: decode EVM calldata into a readable tree. Nested calls hidden in
bytes arguments, Gnosis Safe multi-send batches, Uniswap Universal Router
commands, and zkSync sendToL1 proposals are expanded in place.

ENVIRONMENT VARIABLES:
  ABILENS_CONFIG    Path to a YAML config file (same as --config)
  RUST_LOG          Log filter, overrides the configured levels
",
    version
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode function calldata, expanding nested payloads
    #[command(name = "decode-call")]
    DecodeCall {
        /// Calldata (hex, 0x-prefixed or bare)
        #[arg(long)]
        calldata: String,
        /// Decode with this signature instead of looking the selector up
        #[arg(long)]
        signature: Option<String>,
        /// The data has no leading selector (only with --signature)
        #[arg(long, requires = "signature")]
        no_selector: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only use the bundled signature set
        #[arg(long)]
        offline: bool,
    },

    /// Decode an ABI-encoded struct using Solidity struct definitions
    #[command(name = "decode-struct")]
    DecodeStruct {
        /// File containing the struct and enum declarations
        #[arg(long)]
        definitions: String,
        /// Struct to decode (default: the single root struct)
        #[arg(long)]
        name: Option<String>,
        /// abi.encode(struct) output (hex)
        #[arg(long)]
        data: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved type tree of every declared struct
    Structs {
        #[arg(long)]
        definitions: String,
    },

    /// List structs that no other struct refers to
    Roots {
        #[arg(long)]
        definitions: String,
    },

    /// Look up candidate signatures for a 4-byte selector
    Lookup {
        /// Selector (hex, e.g. 0xa9059cbb)
        #[arg(long)]
        selector: String,
        /// Only use the bundled signature set
        #[arg(long)]
        offline: bool,
    },

    /// Compute the selector of a function signature
    Selector {
        /// e.g. "transfer(address to, uint256 amount)"
        #[arg(long)]
        signature: String,
    },

    /// Build calldata from a signature and JSON arguments
    Encode {
        /// e.g. "transfer(address to, uint256 amount)"
        #[arg(long)]
        signature: String,
        /// JSON array with one entry per parameter
        #[arg(long, default_value = "[]")]
        args: String,
    },

    /// Show version and capabilities
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app = AppConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        app.log.level = "debug".into();
    }
    init_tracing(&app.log);
    debug!(?app, "configuration loaded");

    match cli.command {
        Commands::DecodeCall { calldata, signature, no_selector, json, offline } => {
            app.decoder.offline |= offline;
            cmd_decode_call(&app.decoder, &calldata, signature.as_deref(), !no_selector, json).await
        }

        Commands::DecodeStruct { definitions, name, data, json } => {
            cmd_structs::decode(&definitions, name.as_deref(), &data, json)
        }

        Commands::Structs { definitions } => cmd_structs::list(&definitions),

        Commands::Roots { definitions } => cmd_structs::roots(&definitions),

        Commands::Lookup { selector, offline } => {
            app.decoder.offline |= offline;
            cmd_lookup(&app.decoder, &selector).await
        }

        Commands::Selector { signature } => cmd_selector(&signature),

        Commands::Encode { signature, args } => cmd_encode::run(&signature, &args),

        Commands::Info => cmd_info(&app),
    }
}

/// Bundled signatures first, then 4byte.directory unless offline, behind a TTL cache.
fn build_resolver(config: &DecoderConfig) -> Result<Arc<dyn SignatureResolver>> {
    let mut chain = ResolverChain::new().with(Arc::new(MemorySignatureRegistry::with_defaults()));
    if !config.offline {
        let remote = FourByteResolver::from_config(config).context("build 4byte client")?;
        chain = chain.with(Arc::new(remote));
    }
    debug!(resolvers = ?chain.names(), "resolver chain ready");

    let cache = Arc::new(SignatureCache::from_config(config));
    Ok(Arc::new(CachingResolver::new(chain, cache)))
}

// ─── Command implementations ─────────────────────────────────────────────────

async fn cmd_decode_call(
    config: &DecoderConfig,
    calldata: &str,
    signature: Option<&str>,
    with_selector: bool,
    as_json: bool,
) -> Result<()> {
    let decoder = CalldataDecoder::from_config(build_resolver(config)?, config);
    let report = decoder.decode_report(calldata, signature, with_selector).await;
    info!(failed = report.is_error(), "decode-call finished");

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if report.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_lookup(config: &DecoderConfig, selector: &str) -> Result<()> {
    let selector = parse_selector(selector)?;
    let resolver = build_resolver(config)?;
    let candidates = resolver.lookup(selector).await;
    info!(selector = %selector_hex(selector), found = candidates.len(), "lookup finished");

    if candidates.is_empty() {
        println!("No signature found for selector {}", selector_hex(selector));
    }
    for candidate in candidates {
        println!("{}", candidate);
    }
    Ok(())
}

fn cmd_selector(signature: &str) -> Result<()> {
    let spec = FunctionSpec::parse(signature)?;
    println!("Signature: {}", spec.signature);
    println!("Selector:  {}", spec.selector_hex());
    Ok(())
}

fn cmd_info(app: &AppConfig) -> Result<()> {
    println!("abilens v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Capabilities:");
    println!("  ✓ Calldata decoding          (alloy-dyn-abi)");
    println!("  ✓ Nested call expansion      (bytes arguments, depth {})", app.decoder.max_nested_depth);
    println!("  ✓ Gnosis Safe multi-send     (packed transaction batches)");
    println!("  ✓ Uniswap Universal Router   (execute commands + V3 paths)");
    println!("  ✓ zkSync sendToL1            (upgrade proposals)");
    println!("  ✓ Solidity struct blobs      (struct/enum definitions)");
    println!("  ✓ Signature lookup           (bundled + 4byte.directory, TTL cache)");
    println!("  ✓ Calldata encoding          (JSON arguments)");
    println!();
    println!("Bundled signatures:          {}", MemorySignatureRegistry::with_defaults().len());
    println!("Signature directory:         {}", app.decoder.fourbyte_url);
    println!("Offline:                     {}", app.decoder.offline);
    println!("Cache:                       {}s TTL, {} entries", app.decoder.cache_ttl_secs, app.decoder.cache_capacity);
    Ok(())
}
