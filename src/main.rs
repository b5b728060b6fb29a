use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::{ArgAction, Parser};
use tracing::Level;

use mhtml2html::core::{
    format_output_path, print_error_message, ConvertOutcome, Converter, MhtmlError, MhtmlResult,
};
use mhtml2html::env::{self, EnvConfig, EnvVar};
use mhtml2html::store::ResourceStore;

/// Convert an MHTML web archive into HTML that renders offline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, after_long_help = env::generate_env_docs())]
struct Cli {
    /// MHTML file to convert, `-` reads from standard input
    #[arg(value_name = "MHTMLFILE", default_value = "-")]
    mhtml_file: String,

    /// Serve the archive on a local address and open it in a browser
    #[arg(short, long)]
    browse: bool,

    /// Remove elements matching SELECTOR (repeatable)
    #[arg(short = 'e', long = "remove-element", value_name = "SELECTOR")]
    remove_elements: Vec<String>,

    /// Clear ATTRIBUTE on elements matching SELECTOR (repeatable)
    #[arg(
        short = 'a',
        long = "remove-attribute",
        num_args = 2,
        value_names = ["SELECTOR", "ATTRIBUTE"],
        action = ArgAction::Append
    )]
    remove_attributes: Vec<String>,

    /// Minify resources while decoding
    #[arg(short, long)]
    minify: bool,

    /// Write the document to PATH instead of standard output
    /// (supports %title%, %timestamp%, %extension% and %ext%)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Address to listen on when browsing
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Port to listen on when browsing (0 = any free port)
    #[arg(long, value_name = "N")]
    port: Option<u16>,

    /// Do not open a browser when browsing
    #[arg(long)]
    no_open: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let colored = atty::is(atty::Stream::Stderr) && !env::core::NoColor::get_or_default(false);

    let env_config = match EnvConfig::from_env() {
        Ok(env_config) => env_config,
        Err(e) => exit_with_error(&e.to_string(), colored),
    };

    init_logging(&cli, &env_config, colored);

    if let Err(e) = run(cli, env_config) {
        exit_with_error(&e.to_string(), colored);
    }
}

fn run(cli: Cli, env_config: EnvConfig) -> MhtmlResult<()> {
    let input = read_input(&cli.mhtml_file)?;

    let mut options = env_config.convert_options();
    options.remove_elements = cli.remove_elements.clone();
    options.remove_attributes = cli
        .remove_attributes
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    options.minify |= cli.minify;

    let store = Converter::new(options).convert(&input)?;

    if cli.browse {
        browse(store, &cli, &env_config)
    } else {
        write_output(&store, cli.output.as_deref())
    }
}

fn read_input(path: &str) -> MhtmlResult<Vec<u8>> {
    if path == "-" {
        let mut input = Vec::new();
        io::stdin().lock().read_to_end(&mut input)?;
        Ok(input)
    } else {
        Ok(fs::read(path)?)
    }
}

fn write_output(store: &ResourceStore, output: Option<&str>) -> MhtmlResult<()> {
    let outcome = ConvertOutcome::from_store(store)?;

    match output {
        None | Some("-") => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&outcome.output)?;
            handle.flush()?;
        }
        Some(path) => {
            let path = format_output_path(path, outcome.entry_title.as_deref());
            fs::write(&path, &outcome.output)?;
            tracing::info!("wrote {} bytes to {}", outcome.output.len(), path);
        }
    }

    Ok(())
}

#[cfg(feature = "serve")]
fn browse(store: ResourceStore, cli: &Cli, env_config: &EnvConfig) -> MhtmlResult<()> {
    use mhtml2html::capabilities::SystemBrowser;
    use mhtml2html::web::{serve_archive, GatewayConfig};

    let config = GatewayConfig {
        bind_addr: cli
            .bind
            .clone()
            .unwrap_or_else(|| env_config.bind_address.clone()),
        port: cli.port.unwrap_or(env_config.port),
        open_browser: env_config.open_browser && !cli.no_open,
    };
    config
        .validate()
        .map_err(|e| MhtmlError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve_archive(store, &config, &SystemBrowser))
}

#[cfg(not(feature = "serve"))]
fn browse(_: ResourceStore, _: &Cli, _: &EnvConfig) -> MhtmlResult<()> {
    Err(MhtmlError::Io(io::Error::new(
        io::ErrorKind::Unsupported,
        "this build cannot serve archives, rebuild with the `serve` feature",
    )))
}

fn init_logging(cli: &Cli, env_config: &EnvConfig, colored: bool) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => env_config.log_level.parse().unwrap_or(Level::WARN),
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(colored)
        .with_target(false)
        .init();
}

fn exit_with_error(msg: &str, colored: bool) -> ! {
    if colored {
        print_error_message(msg);
    } else {
        eprintln!("{msg}");
    }
    process::exit(1);
}
