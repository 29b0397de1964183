//! Command-line surface for exercising the MAX event bridge.

use std::ffi::OsString;

use clap::{Args, Parser, Subcommand, ValueEnum};
use maxbridge_config::WireFormatSetting;
use maxbridge_events::WireFormat;
use tracing::debug;

use crate::bootstrap::{BootstrapDependencies, DemoOptions, run_demo};
use crate::commands::{decode_command, encode_command, render_demo, route_command};
use crate::error::AppResult;

#[derive(Debug, Parser)]
#[command(
    name = "maxbridge",
    about = "Drive the MAX SDK event pipeline from the command line"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        env = "MAXBRIDGE_OUTPUT",
        default_value_t = OutputFormat::Text
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Run a scripted ad session against the simulated plugin.
    Demo(DemoArgs),
    /// Decode a wire payload into key/value pairs.
    Decode(DecodeArgs),
    /// Encode `key=value` pairs into a wire payload.
    Encode(EncodeArgs),
    /// Route an event name and payload to a typed event.
    Route(RouteArgs),
}

#[derive(Debug, Args)]
pub(crate) struct DemoArgs {
    /// Overrides `MAXBRIDGE_SDK_KEY`.
    #[arg(long)]
    pub(crate) sdk_key: Option<String>,
    /// Overrides `MAXBRIDGE_WIRE_FORMAT`.
    #[arg(long, value_enum)]
    pub(crate) wire_format: Option<FormatArg>,
    /// Overrides `MAXBRIDGE_QUEUE_CAPACITY`.
    #[arg(long)]
    pub(crate) queue_capacity: Option<usize>,
    /// Ad units whose loads fail with no fill.
    #[arg(long = "fail-ad-unit")]
    pub(crate) failing_ad_units: Vec<String>,
    /// Banner anchor, e.g. `bottom_center`.
    #[arg(long, default_value = "bottom_center")]
    pub(crate) banner_position: String,
}

#[derive(Debug, Args)]
pub(crate) struct DecodeArgs {
    /// Raw payload, or `-` to read stdin.
    pub(crate) raw: String,
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub(crate) format: FormatArg,
}

#[derive(Debug, Args)]
pub(crate) struct EncodeArgs {
    /// Pairs written as `key=value`; the first occurrence of a key wins.
    #[arg(required = true)]
    pub(crate) pairs: Vec<String>,
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    pub(crate) format: FormatArg,
}

#[derive(Debug, Args)]
pub(crate) struct RouteArgs {
    /// Event name such as `OnRewardedAdReceivedRewardEvent`.
    pub(crate) name: String,
    /// Raw payload, or `-` to read stdin.
    #[arg(default_value = "")]
    pub(crate) raw: String,
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub(crate) format: FormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormatArg {
    Auto,
    Json,
    Delimited,
}

impl FormatArg {
    pub(crate) const fn setting(self) -> WireFormatSetting {
        match self {
            Self::Auto => WireFormatSetting::Auto,
            Self::Json => WireFormatSetting::Json,
            Self::Delimited => WireFormatSetting::Delimited,
        }
    }

    pub(crate) const fn wire_format(self) -> Option<WireFormat> {
        self.setting().to_wire_format()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse arguments from the process, run the command and return the exit code.
pub async fn run() -> i32 {
    run_from(std::env::args_os()).await
}

/// Same as [`run`] with explicit arguments; the first item is the binary name.
pub async fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = err.exit_code();
            let _ = err.print();
            return code;
        }
    };

    match execute(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            0
        }
        Err(err) => {
            let code = err.exit_code();
            eprintln!("error: {:#}", anyhow::Error::new(err));
            code
        }
    }
}

async fn execute(cli: Cli) -> AppResult<String> {
    execute_with(cli, BootstrapDependencies::from_env).await
}

async fn execute_with<L>(cli: Cli, load: L) -> AppResult<String>
where
    L: FnOnce() -> AppResult<BootstrapDependencies>,
{
    // Only `demo` reads settings; the codec commands fall back to default logging.
    let dependencies = if matches!(cli.command, Command::Demo(_)) {
        load()?
    } else {
        load().unwrap_or_default()
    };
    dependencies.init_logging()?;
    debug!(command = command_label(&cli.command), "running command");

    match cli.command {
        Command::Demo(args) => {
            let options = DemoOptions::from_args(dependencies.settings, args)?;
            let report = run_demo(options).await?;
            render_demo(&report, cli.output)
        }
        Command::Decode(args) => decode_command(&args, cli.output),
        Command::Encode(args) => encode_command(&args, cli.output),
        Command::Route(args) => route_command(&args, cli.output),
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Demo(_) => "demo",
        Command::Decode(_) => "decode",
        Command::Encode(_) => "encode",
        Command::Route(_) => "route",
    }
}
