//! jsonrpc-dispatch: entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use jsonrpc_dispatch::{JsonRpcRequest, RequestId};
use jsonrpc_dispatch_server::config::{resolve_listen_addr, resolve_manifest_path};
use jsonrpc_dispatch_server::handlers::MethodTable;

#[derive(Parser)]
#[command(
    name = "jsonrpc-dispatch",
    about = "JSON-RPC 2.0 dispatcher: serve registered methods over HTTP",
    version
)]
struct Cli {
    /// Method manifest (JSON). Also reads JSONRPC_DISPATCH_MANIFEST.
    /// Without one, every built-in method is exposed under its own name.
    #[arg(short, long, global = true)]
    manifest: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-RPC over HTTP (default).
    Serve {
        /// Listen address (host:port).
        /// Also reads JSONRPC_DISPATCH_ADDR, then PORT.
        #[arg(long)]
        addr: Option<String>,
    },

    /// List registered methods.
    Methods {
        /// Print as JSON, including parameter schemas.
        #[arg(long)]
        json: bool,
    },

    /// Dispatch a single call in-process and print the response.
    ///
    /// Example:
    ///   jsonrpc-dispatch call hello '{"name": "Ada"}'
    Call {
        /// Method name.
        method: String,

        /// Params as JSON.
        params: Option<String>,

        /// Request id; numeric values are sent as numbers.
        #[arg(long, default_value = "1")]
        id: String,
    },

    /// Launch the interactive console.
    Repl,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   jsonrpc-dispatch completions bash > ~/.local/share/bash-completion/completions/jsonrpc-dispatch
    ///   jsonrpc-dispatch completions zsh > ~/.zfunc/_jsonrpc-dispatch
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let manifest = resolve_manifest_path(cli.manifest.as_deref());

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            // The whole method table resolves before the listener binds.
            let table = MethodTable::load(manifest.as_deref())?;
            let addr = resolve_listen_addr(addr.as_deref());

            tracing::info!("jsonrpc-dispatch v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!(
                "Methods: {}",
                table
                    .methods()
                    .iter()
                    .map(|m| m.method.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            serve(table, &addr).await?;
        }

        Commands::Methods { json } => {
            let table = MethodTable::load(manifest.as_deref())?;
            if json {
                let methods: Vec<_> = table.methods().iter().map(|m| m.describe()).collect();
                println!("{}", serde_json::to_string_pretty(&methods)?);
            } else {
                for bound in table.methods() {
                    println!(
                        "{:<20} {:<12} {}",
                        bound.method, bound.definition.name, bound.definition.description
                    );
                }
            }
        }

        Commands::Call { method, params, id } => {
            let table = MethodTable::load(manifest.as_deref())?;
            let params = params
                .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
                .transpose()
                .map_err(|e| anyhow::anyhow!("Params are not valid JSON: {e}"))?;
            let id = match id.parse::<i64>() {
                Ok(n) => RequestId::from(n),
                Err(_) => RequestId::from(id),
            };

            let response = table
                .dispatcher()
                .handle(JsonRpcRequest::new(id, method, params))
                .await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Repl => {
            let table = MethodTable::load(manifest.as_deref())?;
            let runtime = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || jsonrpc_dispatch_server::repl::run(table, runtime))
                .await??;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "jsonrpc-dispatch", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(feature = "http")]
async fn serve(table: MethodTable, addr: &str) -> anyhow::Result<()> {
    use jsonrpc_dispatch_server::transport::HttpTransport;

    let transport = HttpTransport::new(table.dispatcher());
    transport.run(addr).await?;
    Ok(())
}

#[cfg(not(feature = "http"))]
async fn serve(_table: MethodTable, _addr: &str) -> anyhow::Result<()> {
    anyhow::bail!("built without the `http` feature; rebuild with --features http")
}
