//! kubectl-getinfo - Labels, annotations, owners and scheduling fields of any Kubernetes resource

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use getinfo_core::{Command, SchedulingField};
use getinfo_kube::Query;
use tracing_subscriber::EnvFilter;

mod color;
mod commands;
mod display;
mod error;
mod exit_codes;

use commands::get::Request;
use display::OutputFormat;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "kubectl-getinfo")]
#[command(author = "kubectl-getinfo Contributors")]
#[command(version)]
#[command(
    about = "Show labels, annotations, owners and scheduling fields of Kubernetes resources",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show labels of resources
    Labels {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show annotations of resources
    Annotations {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show owner references of resources
    Owner {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show scheduling fields of pods and workload templates
    #[command(after_help = scheduling_fields_help())]
    Scheduling {
        /// [FIELD] TYPE [NAMES...]; FIELD narrows the output to one field group
        #[arg(value_name = "ARGS", required = true, num_args = 1..)]
        args: Vec<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Generate a shell completion script
    Completion {
        /// Target shell
        shell: Shell,
    },
}

/// Resource type and optional names
#[derive(Args)]
struct TargetArgs {
    /// Resource type: plural, kind or short name (e.g. pods, Deployment, sts)
    resource_type: String,

    /// Object names; all matching objects are listed when omitted
    names: Vec<String>,
}

/// Flags shared by every reporting command
#[derive(Args)]
struct QueryArgs {
    /// Namespace to query (defaults to the kubeconfig context namespace)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Query all namespaces
    #[arg(short = 'A', long)]
    all_namespaces: bool,

    /// Label selector (e.g. app=web,tier!=db)
    #[arg(short = 'l', long)]
    selector: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Colorize JSON output
    #[arg(short, long)]
    color: bool,
}

impl QueryArgs {
    fn into_request(
        self,
        command: Command,
        field: Option<SchedulingField>,
        resource_type: String,
        names: Vec<String>,
    ) -> Request {
        Request {
            command,
            field,
            query: Query {
                resource_type,
                names,
                namespace: self.namespace,
                all_namespaces: self.all_namespaces,
                selector: self.selector,
            },
            format: self.output,
            color: self.color,
        }
    }
}

fn scheduling_fields_help() -> String {
    let mut help = String::from("Fields:\n");
    for field in SchedulingField::ALL {
        help.push_str(&format!("  {:<14}{}\n", field.as_str(), field.description()));
    }
    help
}

/// Split `[FIELD] TYPE [NAMES...]`
///
/// The first word is a field only when another positional follows it.
fn split_scheduling_args(
    mut args: Vec<String>,
) -> Result<(Option<SchedulingField>, String, Vec<String>)> {
    if args.is_empty() {
        return Err(CliError::usage_with_help(
            "missing resource type",
            "usage: kubectl getinfo scheduling [FIELD] TYPE [NAMES...]",
        ));
    }

    let field = args[0].parse::<SchedulingField>().ok();
    if let Some(field) = field {
        if args.len() == 1 {
            return Err(CliError::usage_with_help(
                "missing resource type",
                format!("usage: kubectl getinfo scheduling {field} TYPE [NAMES...]"),
            ));
        }
        args.remove(0);
    }

    let resource_type = args.remove(0);
    Ok((field, resource_type, args))
}

fn into_request(command: Commands) -> Result<Request> {
    let request = match command {
        Commands::Labels { target, query } => {
            query.into_request(Command::Labels, None, target.resource_type, target.names)
        }
        Commands::Annotations { target, query } => {
            query.into_request(Command::Annotations, None, target.resource_type, target.names)
        }
        Commands::Owner { target, query } => {
            query.into_request(Command::Owner, None, target.resource_type, target.names)
        }
        Commands::Scheduling { args, query } => {
            let (field, resource_type, names) = split_scheduling_args(args)?;
            query.into_request(Command::Scheduling, field, resource_type, names)
        }
        Commands::Completion { .. } => {
            return Err(CliError::internal("completion is not a query command"));
        }
    };
    Ok(request)
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        "kubectl_getinfo=debug,getinfo_kube=debug"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completion { shell } = cli.command {
        return commands::completion::run(shell);
    }

    let request = into_request(cli.command)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("failed to start runtime: {e}")))?;
    runtime.block_on(commands::get::run(&request))
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version print to stdout and succeed
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
    };

    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
