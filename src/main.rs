//! IncidentBuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use incidentbuddy::{
    classify_priority,
    cli::{Args, Commands, Config},
    logging,
    service::{load_requests, DefaultIncidentService},
    store::{IncidentRequest, SqliteStore},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    if let Some(db) = &args.db {
        config.store.db_path = db.to_string_lossy().into_owned();
    }
    if let Some(level) = args.log_level_override() {
        config.logging.level = level.to_string();
    }
    logging::init(&config.logging)?;

    match &args.command {
        Commands::Init => {
            if args.config.is_none() {
                init_config(&config)?;
            }
            init_store(&config)?;
        }
        Commands::Submit {
            number,
            description,
            detail,
            customer,
            organization,
            department,
            reported_date,
            json,
        } => {
            let request = IncidentRequest {
                incident_num: number.clone(),
                customer_name: customer.clone(),
                organization: organization.clone(),
                department: department.clone(),
                description: description.clone(),
                detailed_description: detail.clone(),
                reported_date: reported_date.clone(),
            };
            submit(&config, request, *json).await?;
        }
        Commands::Import { file } => import(&config, file).await?,
        Commands::List { limit } => list(&config, *limit)?,
        Commands::Priority { description, detail } => {
            println!("{}", classify_priority(description, detail));
        }
        Commands::Config => show_config(&config)?,
    }

    Ok(())
}

fn init_config(config: &Config) -> Result<()> {
    let Some(path) = Config::default_path() else {
        return Ok(());
    };
    if path.exists() {
        return Ok(());
    }

    config
        .save(&path)
        .with_context(|| format!("Failed to write configuration {}", path.display()))?;
    info!("Wrote configuration to {}", path.display());
    println!("{} {}", "Wrote config".green().bold(), path.display());
    Ok(())
}

fn init_store(config: &Config) -> Result<()> {
    let path = config.store.db_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open incident database {}", path.display()))?;
    info!("Initialized incident database at {}", path.display());
    println!(
        "{} {} ({} incidents)",
        "Initialized".green().bold(),
        path.display(),
        store.count()?
    );
    Ok(())
}

async fn submit(config: &Config, request: IncidentRequest, json: bool) -> Result<()> {
    let mut service = DefaultIncidentService::from_config(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Resolving {}", request.incident_num));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = service.submit(request).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let source = if outcome.reused {
        "reused".green()
    } else {
        "generated".yellow()
    };
    println!("{} #{}", "Incident stored".bold(), outcome.id);
    println!("  Priority: {}", outcome.priority);
    println!("  Solution ({}):", source);
    for line in outcome.solution.lines() {
        println!("    {}", line);
    }
    Ok(())
}

async fn import(config: &Config, file: &std::path::Path) -> Result<()> {
    let requests = load_requests(file)?;
    let mut service = DefaultIncidentService::from_config(config)?;

    let pb = ProgressBar::new(requests.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let summary = service
        .import(requests, |request, resolution| {
            pb.set_message(format!(
                "{} ({})",
                request.incident_num,
                if resolution.reused { "reused" } else { "generated" }
            ));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    let summary = summary?;

    println!("{}", "Incidents processed and stored".green().bold());
    println!("  Processed: {}", summary.processed);
    println!("  Reused:    {}", summary.reused);
    println!("  Generated: {}", summary.generated);
    println!("  Stored:    {}", summary.stored);
    Ok(())
}

fn list(config: &Config, limit: usize) -> Result<()> {
    let store = SqliteStore::open(config.store.db_path())?;
    let records = store.list_recent(limit)?;

    if records.is_empty() {
        println!("No incidents stored yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "{} {} [P{}] {}",
            format!("#{}", record.id).bold(),
            record.incident_number.cyan(),
            record.priority,
            record.description
        );
        if let Some(solution) = record.solution.as_deref() {
            let first_line = solution.lines().next().unwrap_or_default();
            println!("    {}", first_line.dimmed());
        }
    }
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "IncidentBuddy Configuration".bold());
    if let Some(path) = Config::default_path() {
        println!("{}", format!("# default location: {}", path.display()).dimmed());
    }
    println!(
        "{}",
        format!(
            "# API key ({}): {}",
            config.service.api_key_env,
            if config.service.api_key().is_some() { "set" } else { "not set" }
        )
        .dimmed()
    );
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
