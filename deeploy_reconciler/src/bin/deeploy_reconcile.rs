use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use deeploy_reconciler::input::{load_apps, load_running_jobs};
use deeploy_reconciler::{
    get_app_owner_from_get_apps, get_project_name_from_get_apps, group_by_project, Reconciler,
    ReconcilerConfig,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deeploy-reconcile", version)]
#[command(about = "Reconcile escrow job records with a Deeploy get_apps response")]
struct Cli {
    /// TOML config file; DEEPLOY_* environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print running jobs with details as JSON
    Reconcile {
        /// Job records read from the escrow contract
        #[arg(long)]
        jobs: PathBuf,
        /// get_apps response
        #[arg(long)]
        apps: PathBuf,
        /// Log how each job was resolved
        #[arg(long)]
        report: bool,
    },
    /// Print running jobs grouped by project as JSON
    Projects {
        #[arg(long)]
        jobs: PathBuf,
        #[arg(long)]
        apps: PathBuf,
    },
    /// Print the project name reported for a project hash
    ProjectName {
        #[arg(long)]
        apps: PathBuf,
        #[arg(long)]
        project_hash: String,
    },
    /// Print the owner reported by live apps
    Owner {
        #[arg(long)]
        apps: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ReconcilerConfig::load(cli.config.as_deref())
        .context("Failed to load reconciler configuration")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let reconciler = Reconciler::new(config);

    match cli.command {
        Commands::Reconcile { jobs, apps, report } => {
            let running_jobs = load_running_jobs(&jobs)
                .with_context(|| format!("Failed to read job records from {}", jobs.display()))?;
            let apps = load_apps(&apps)
                .with_context(|| format!("Failed to read apps from {}", apps.display()))?;

            let (details, summary) = reconciler.reconcile_with_report(&running_jobs, &apps);
            if report {
                log::info!(
                    "Resolved {} of {} jobs: {} online, {} pipeline, {} unmatched, {} unresolved",
                    summary.resolved(),
                    summary.requested,
                    summary.from_online,
                    summary.from_pipeline,
                    summary.unmatched,
                    summary.unresolved
                );
            }
            print_json(&details)
        }
        Commands::Projects { jobs, apps } => {
            let running_jobs = load_running_jobs(&jobs)
                .with_context(|| format!("Failed to read job records from {}", jobs.display()))?;
            let apps = load_apps(&apps)
                .with_context(|| format!("Failed to read apps from {}", apps.display()))?;

            let details = reconciler.running_jobs_with_details(&running_jobs, &apps);
            print_json(&group_by_project(&details, &apps))
        }
        Commands::ProjectName { apps, project_hash } => {
            let apps = load_apps(&apps)
                .with_context(|| format!("Failed to read apps from {}", apps.display()))?;
            let name = get_project_name_from_get_apps(&apps, &project_hash)
                .ok_or_else(|| anyhow!("No project name reported for {}", project_hash))?;
            println!("{}", name);
            Ok(())
        }
        Commands::Owner { apps } => {
            let apps = load_apps(&apps)
                .with_context(|| format!("Failed to read apps from {}", apps.display()))?;
            let owner = get_app_owner_from_get_apps(&apps)
                .ok_or_else(|| anyhow!("No owner reported by any live app"))?;
            println!("{}", owner);
            Ok(())
        }
    }
}
