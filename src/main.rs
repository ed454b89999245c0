use chatproxy::cli::{parse_args, run_cli_command, version_line, CliCommand, USAGE};
use chatproxy::config::ProxyConfig;
use chatproxy::logging::init_tracing;
use chatproxy::proxy::ChatProxy;

use color_eyre::Result;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = match parse_args(std::env::args()) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    // Handle --help and --version before any initialization
    match cli.command {
        CliCommand::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        _ => {}
    }

    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ProxyConfig::load(cli.config_path.as_deref())?;
    config.validate()?;
    tracing::debug!(?config, "Loaded configuration");

    // Ctrl-C cancels the in-flight call; a second Ctrl-C exits immediately
    let token = CancellationToken::new();
    let ctrlc_token = token.clone();
    ctrlc::set_handler(move || {
        if ctrlc_token.is_cancelled() {
            std::process::exit(130);
        }
        ctrlc_token.cancel();
    })?;

    let runtime = tokio::runtime::Runtime::new()?;
    let proxy = ChatProxy::new(config);

    runtime.block_on(run_cli_command(&proxy, cli, token))
}
