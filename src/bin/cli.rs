//! APCloudy command-line client
//!
//! Thin wrapper over the library for scripting and quick inspection.

use std::path::PathBuf;
use std::time::Duration;

use apcloudy::{
    ApCloudyClient, JobState,
    config::load_config,
    display::{self, TableRow},
    error::{AppError, Result},
    services::{JobFilter, RunOptions},
};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

/// APCloudy - distributed scraping platform client
#[derive(Parser, Debug)]
#[command(name = "apcloudy", version, about = "APCloudy API client")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key (overrides config and APCLOUDY_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check connectivity and credentials
    Verify,

    /// List accessible projects
    Projects,

    /// Create a project
    CreateProject {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Show project details
    Project { project: u64 },

    /// List spiders in a project
    Spiders { project: u64 },

    /// Upload a spider file
    Upload {
        project: u64,
        file: PathBuf,
        /// Spider name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a spider
    DeleteSpider { project: u64, name: String },

    /// List jobs in a project
    Jobs {
        project: u64,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        spider: Option<String>,
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        offset: Option<u64>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Start a spider
    Run {
        project: u64,
        spider: String,
        #[arg(long)]
        units: Option<u32>,
        #[arg(long)]
        priority: Option<i32>,
        /// Spider argument as key=value (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Block until the job finishes
        #[arg(long)]
        wait: bool,
    },

    /// Show job details
    Job { project: u64, job_id: String },

    /// Wait for a job to finish
    Wait {
        project: u64,
        job_id: String,
        /// Seconds between polls
        #[arg(long)]
        poll: Option<u64>,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print job log lines
    Logs {
        project: u64,
        job_id: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 1000)]
        count: u32,
    },

    /// Print every scraped item as a JSON line
    Items {
        project: u64,
        job_id: String,
        #[arg(long, default_value_t = 1000)]
        batch_size: u32,
    },

    /// Cancel a job
    Cancel { project: u64, job_id: String },

    /// Delete a job and its data
    DeleteJob { project: u64, job_id: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn parse_args(raw: &[String]) -> Result<Map<String, Value>> {
    raw.iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| AppError::config(format!("expected key=value, got '{pair}'")))?;
            // Values that look like JSON keep their type
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.into()));
            Ok((key.to_string(), value))
        })
        .collect()
}

fn print_table<T: TableRow>(records: &[T]) {
    println!("{}", display::render(records));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(key) = cli.api_key {
        config.api_key = key;
    }
    let client = ApCloudyClient::with_config(config)?;

    match cli.command {
        Command::Verify => {
            if client.verify() {
                log::info!("✓ API reachable and credentials accepted");
            } else {
                return Err(AppError::Authentication("verification failed".into()));
            }
        }

        Command::Projects => print_table(&client.list_projects()?),

        Command::CreateProject { name, description } => {
            print_table(&[client.create_project(&name, &description)?]);
        }

        Command::Project { project } => print_table(&[client.get_project(project).get_info()?]),

        Command::Spiders { project } => print_table(&client.get_project(project).spiders().list()?),

        Command::Upload {
            project,
            file,
            name,
        } => {
            let ok = client
                .get_project(project)
                .spiders()
                .upload(&file, name.as_deref())?;
            if !ok {
                return Err(AppError::response("upload was not accepted"));
            }
        }

        Command::DeleteSpider { project, name } => {
            let deleted = client.get_project(project).spiders().delete(&name)?;
            log::info!("Spider {} deleted: {}", name, deleted);
        }

        Command::Jobs {
            project,
            state,
            spider,
            count,
            offset,
            tags,
        } => {
            let filter = JobFilter {
                state: state.as_deref().map(str::parse::<JobState>).transpose()?,
                spider,
                count,
                offset,
                tags,
            };
            print_table(&client.get_project(project).jobs().list(&filter)?);
        }

        Command::Run {
            project,
            spider,
            units,
            priority,
            args,
            tags,
            wait,
        } => {
            let jobs = client.get_project(project).jobs();
            let options = RunOptions {
                units,
                priority,
                job_args: parse_args(&args)?,
                tags,
            };
            let mut job = jobs.run(&spider, options)?;
            if wait {
                job = jobs.wait_for_completion(&job.job_id, None, None)?;
            }
            print_table(&[job]);
        }

        Command::Job { project, job_id } => {
            print_table(&[client.get_project(project).jobs().get(&job_id)?]);
        }

        Command::Wait {
            project,
            job_id,
            poll,
            timeout,
        } => {
            let job = client.get_project(project).jobs().wait_for_completion(
                &job_id,
                poll.map(Duration::from_secs),
                timeout.map(Duration::from_secs),
            )?;
            print_table(&[job]);
        }

        Command::Logs {
            project,
            job_id,
            offset,
            count,
        } => {
            for line in client
                .get_project(project)
                .jobs()
                .get_logs(&job_id, offset, count)?
            {
                println!("{line}");
            }
        }

        Command::Items {
            project,
            job_id,
            batch_size,
        } => {
            let jobs = client.get_project(project).jobs();
            for item in jobs.iter_items(&job_id, batch_size) {
                println!("{}", item?);
            }
        }

        Command::Cancel { project, job_id } => {
            let cancelled = client.get_project(project).jobs().cancel(&job_id)?;
            log::info!("Job {} cancelled: {}", job_id, cancelled);
        }

        Command::DeleteJob { project, job_id } => {
            let deleted = client.get_project(project).jobs().delete(&job_id)?;
            log::info!("Job {} deleted: {}", job_id, deleted);
        }
    }

    Ok(())
}
