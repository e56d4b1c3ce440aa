//! backticks-host - run the BackTicks and DeleteConfig modules from the command line.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pbx_backticks::audit::AuditLogger;
use pbx_backticks::channel::{ChannelRegistry, InMemoryChannels};
use pbx_backticks::config::Settings;
use pbx_backticks::error::{ModuleError, ValidationErrorKind};
use pbx_backticks::executor::CommandRunner;
use pbx_backticks::manager::ManagerMessage;
use pbx_backticks::modules::backticks::BackticksModule;
use pbx_backticks::modules::deleteconfig::DeleteConfigModule;
use pbx_backticks::modules::Host;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

/// Channel the CLI runs applications and functions on.
const CLI_CHANNEL: &str = "Local/backticks-host";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let (config_path, rest) = split_config_arg(&args[1..]);

    let settings = match &config_path {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    init_logging(&settings);

    info!("Starting {} v{}", NAME, VERSION);
    if let Some(path) = &config_path {
        info!("Configuration loaded from: {}", path);
    }

    match run(&settings, &rest) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Invocation failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Build the host, load both modules and perform one invocation.
fn run(settings: &Settings, args: &[String]) -> Result<ExitCode, ModuleError> {
    let audit = if settings.audit.enabled {
        Some(Arc::new(AuditLogger::new(&settings.audit.log_path)?))
    } else {
        None
    };

    let mut runner = CommandRunner::from_settings(settings);
    let mut deleteconfig = DeleteConfigModule::new(settings.paths.config_dir.clone());
    if let Some(audit) = &audit {
        runner = runner.with_audit(Arc::clone(audit));
        deleteconfig = deleteconfig.with_audit(Arc::clone(audit));
    }

    let channels = Arc::new(InMemoryChannels::new());
    let channel = channels.create(CLI_CHANNEL);

    let mut host = Host::new();
    host.load_module(&BackticksModule::new(
        Arc::new(runner),
        Arc::clone(&channels) as Arc<dyn ChannelRegistry>,
    ))?;
    host.load_module(&deleteconfig)?;

    match args {
        [mode, name, headers @ ..] if mode == "action" => {
            let mut message = ManagerMessage::action(name);
            for header in headers {
                let (key, value) = ManagerMessage::parse_header(header).ok_or_else(|| {
                    ModuleError::Validation {
                        kind: ValidationErrorKind::InvalidParameter {
                            param: "header".to_string(),
                            message: format!("expected 'Name: Value', got '{}'", header),
                        },
                    }
                })?;
                message.push(&key, &value);
            }
            let response = host.dispatch_action(&message);
            print!("{}", response.to_wire());
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        [mode, name, data] if mode == "app" => {
            host.exec_application(&channel, name, Some(data.as_str()))?;
            if let Some(variable) = data.split_once(',').map(|(v, _)| v.trim()) {
                if let Some(value) = channel.variable(variable) {
                    print!("{}={}", variable, value);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        [mode, name, data] if mode == "func" => {
            let value = host.read_function(Some(&*channel), name, data)?;
            print!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            print_help();
            Ok(ExitCode::from(2))
        }
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Run the BackTicks and DeleteConfig modules against an in-memory host.

USAGE:
    {} [OPTIONS] action <Action> ["Header: Value"]...
    {} [OPTIONS] app <Application> <data>
    {} [OPTIONS] func <Function> <data>

EXAMPLES:
    {} action BackTicks "Command: /bin/date"
    {} app BackTicks "NOW,/bin/date"
    {} action DeleteConfig "Filename: old.conf"

OPTIONS:
    -c, --config <PATH>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information
"#,
        NAME, VERSION, NAME, NAME, NAME, NAME, NAME, NAME
    );
}

/// Extract `--config`/`-c` from the arguments, returning the rest.
fn split_config_arg(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            config = iter.next().cloned();
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config = Some(path.to_string());
        } else {
            rest.push(arg.clone());
        }
    }

    (config, rest)
}

/// Initialize logging based on settings. Logs go to stderr.
fn init_logging(settings: &Settings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
