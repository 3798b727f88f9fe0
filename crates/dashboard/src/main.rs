use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use farmvibes_dashboard::api::{RunQuery, VibeClient};
use farmvibes_dashboard::commands::{
    self, compare, home, metrics, runs, settings, submit, workflows, Context,
};
use farmvibes_dashboard::config::{DashboardConfig, DEFAULT_CONFIG_PATH};
use farmvibes_dashboard::logging::init_logging;
use farmvibes_dashboard::version::VERSION;
use farmvibes_dashboard::views::compare::CompareSort;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Terminal dashboard for FarmVibes.AI", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// API base URL for this invocation, e.g. http://localhost:31108/v0
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log debug output from the dashboard to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overview: system status, run counts and getting started
    Home,
    /// Browse the workflow catalog
    #[command(subcommand)]
    Workflows(WorkflowsCommand),
    /// Submit a new run
    Submit(SubmitArgs),
    /// List, inspect and manage runs
    #[command(subcommand)]
    Runs(RunsCommand),
    /// Compare completed runs side by side
    Compare {
        /// Run ids; defaults to every comparable run on the first page
        ids: Vec<String>,
        #[arg(long, value_enum, default_value_t = CompareSort::ExecutionTime)]
        sort: CompareSort,
    },
    /// Show CPU, memory and disk usage of the service host
    Metrics {
        #[arg(short, long)]
        watch: bool,
    },
    /// Show or change the saved API URL
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
enum WorkflowsCommand {
    List {
        /// Case-insensitive filter on name and description
        #[arg(short, long)]
        search: Option<String>,
    },
    Describe {
        name: String,
    },
    Yaml {
        name: String,
    },
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Workflow name, e.g. farm_ai/agriculture/ndvi_summary
    workflow: Option<String>,
    #[arg(short, long, default_value = "")]
    name: String,
    /// GeoJSON file with the area of interest
    #[arg(short, long)]
    geometry: Option<PathBuf>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    /// Use the last N days (7, 30, 90 and 365 are the usual picks)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    last_days: Option<u32>,
    /// Workflow parameter as key=value; repeatable
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,
    /// Follow the run until it finishes
    #[arg(short, long)]
    watch: bool,
}

#[derive(Subcommand, Debug)]
enum RunsCommand {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u64,
        #[arg(long, default_value_t = 50)]
        take: u64,
        /// Restrict to these run ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        #[arg(short, long)]
        watch: bool,
    },
    Show {
        id: String,
        #[arg(short, long)]
        watch: bool,
    },
    Cancel {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    Resubmit {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    SetUrl { url: String },
    Reset,
}

async fn dispatch(ctx: &Context, command: Command) -> Result<(), commands::CommandError> {
    match command {
        Command::Home => home::show(ctx).await,
        Command::Workflows(WorkflowsCommand::List { search }) => {
            workflows::list(ctx, search.as_deref()).await
        }
        Command::Workflows(WorkflowsCommand::Describe { name }) => {
            workflows::describe(ctx, &name).await
        }
        Command::Workflows(WorkflowsCommand::Yaml { name }) => workflows::yaml(ctx, &name).await,
        Command::Submit(args) => {
            let request = submit::SubmitRequest {
                workflow: args.workflow,
                name: args.name,
                geometry: args.geometry,
                start: args.start,
                end: args.end,
                last_days: args.last_days,
                params: args.params,
                follow: args.watch,
            };
            submit::submit(ctx, request).await
        }
        Command::Runs(RunsCommand::List {
            skip,
            take,
            ids,
            watch,
        }) => {
            let query = RunQuery {
                ids,
                fields: Vec::new(),
                skip,
                take,
            };
            runs::list(ctx, query, watch).await
        }
        Command::Runs(RunsCommand::Show { id, watch }) => runs::show(ctx, &id, watch).await,
        Command::Runs(RunsCommand::Cancel { id, yes }) => runs::cancel(ctx, &id, yes).await,
        Command::Runs(RunsCommand::Delete { id, yes }) => runs::delete(ctx, &id, yes).await,
        Command::Runs(RunsCommand::Resubmit { id }) => runs::resubmit(ctx, &id).await,
        Command::Compare { ids, sort } => compare::run(ctx, &ids, sort).await,
        Command::Metrics { watch } => metrics::show(ctx, watch).await,
        Command::Settings(SettingsCommand::Show) => settings::show(&ctx.config),
        Command::Settings(SettingsCommand::SetUrl { url }) => {
            settings::set_url(&ctx.config.config_path, &url)
        }
        Command::Settings(SettingsCommand::Reset) => settings::reset(&ctx.config.config_path),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Home);

    // Settings edits must work even when the saved URL no longer parses.
    match &command {
        Command::Settings(SettingsCommand::SetUrl { url }) => {
            return Ok(settings::set_url(&cli.config, url)?);
        }
        Command::Settings(SettingsCommand::Reset) => {
            return Ok(settings::reset(&cli.config)?);
        }
        _ => {}
    }

    let mut config = DashboardConfig::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.override_api_url(url)?;
    }

    init_logging(&config.log_dir, cli.verbose);
    info!(version = VERSION, api_url = %config.api_url, "Starting dashboard.");

    let client = VibeClient::with_timeout(
        &config.api_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let ctx = Context::new(config, client);

    if let Err(e) = dispatch(&ctx, command).await {
        error!(error = %e, "Command failed.");
        return Err(e.into());
    }
    Ok(())
}
