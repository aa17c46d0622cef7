//! Agency CLI
//!
//! Command-line client for the Agency API:
//! - Check status
//! - Browse any table
//! - Pause and resume experiments
//! - Campaign reports and form exports
//! - Walk the contact wizard from a terminal

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use agency::wizard::{
    CompanyDetails, ContactDetails, ContactStep, ContactWizard, ProjectDetails, BUDGET_RANGES,
    SERVICES, TIMELINES,
};

#[derive(Parser)]
#[command(name = "agency-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Back-office client for the agency API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server and backend status
    Status,

    /// List rows of a resource (contacts, leads, campaigns, jobs, ...)
    List {
        resource: String,
        /// Case-insensitive search term
        #[arg(short, long)]
        search: Option<String>,
        /// Status filter
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Change an experiment's status
    Experiment {
        #[command(subcommand)]
        action: ExperimentAction,
    },

    /// Delivery totals and rates across campaigns
    Campaigns,

    /// Open job postings
    Jobs {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print the site stylesheet variables
    ThemeCss,

    /// Download a form's submissions as CSV
    Export {
        form_id: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill in the contact wizard interactively
    Contact,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ExperimentAction {
    Pause { id: String },
    Resume { id: String },
    Toggle { id: String },
    Results { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        base: format!("{}/api/v1", cli.api_url.trim_end_matches('/')),
    };
    let as_json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Status => {
            let response = api
                .client
                .get(format!("{}/health", cli.api_url.trim_end_matches('/')))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(&health)?);
                        return Ok(());
                    }

                    println!("Agency v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", text(&health["status"]));
                    println!(
                        "Backend:    {} ({})",
                        text(&health["backend"]),
                        text(&health["backend_kind"])
                    );
                    println!("Live connections: {}", health["ws_connections"]);
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to the Agency API at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin agency");
                    return Err(e.into());
                }
            }
        }

        Commands::List {
            resource,
            search,
            status,
            limit,
        } => {
            let mut query = vec![("limit", limit.to_string())];
            query.extend(search.map(|s| ("search", s)));
            query.extend(status.map(|s| ("status", s)));

            let body = api.get(&format!("/{}", resource), &query).await?;
            print_items(&body, as_json)?;
        }

        Commands::Experiment { action } => {
            let (path, body) = match &action {
                ExperimentAction::Pause { id } => {
                    (format!("/experiments/{}/status", id), Some(json!({"status": "paused"})))
                }
                ExperimentAction::Resume { id } => {
                    (format!("/experiments/{}/status", id), Some(json!({"status": "running"})))
                }
                ExperimentAction::Toggle { id } => (format!("/experiments/{}/toggle", id), None),
                ExperimentAction::Results { id } => (format!("/experiments/{}/results", id), None),
            };

            let result = match (&action, body) {
                (ExperimentAction::Results { .. }, _) => api.get(&path, &[]).await?,
                (_, body) => api.post(&path, body.unwrap_or_else(|| json!({}))).await?,
            };

            if as_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(variants) = result["variants"].as_array() {
                println!("{:<16} {:>9} {:>11} {:>8} {:>8}", "Variant", "Visitors", "Conversions", "Rate", "Lift");
                println!("{}", "-".repeat(56));
                for v in variants {
                    println!(
                        "{:<16} {:>9} {:>11} {:>7.2}% {:>8}",
                        text(&v["name"]),
                        v["visitors"],
                        v["conversions"],
                        v["conversion_rate"].as_f64().unwrap_or(0.0),
                        v["lift"].as_f64().map(|l| format!("{:.2}%", l)).unwrap_or_else(|| "-".to_string())
                    );
                }
                println!();
                println!("Winner: {}", text(&result["winner"]));
            } else {
                let record = &result["record"];
                let verb = if result["changed"].as_bool().unwrap_or(false) {
                    "is now"
                } else {
                    "was already"
                };
                println!("{} {} {}", text(&record["name"]), verb, text(&record["status"]));
            }
        }

        Commands::Campaigns => {
            let overview = api.get("/analytics/campaigns", &[]).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
                return Ok(());
            }

            println!(
                "{:<24} {:<10} {:>8} {:>8} {:>8} {:>10}",
                "Campaign", "Channel", "Sent", "Open %", "Click %", "ROI %"
            );
            println!("{}", "-".repeat(74));
            for c in overview["campaigns"].as_array().into_iter().flatten() {
                println!(
                    "{:<24} {:<10} {:>8} {:>8.2} {:>8.2} {:>10.2}",
                    truncate(text(&c["name"]), 24),
                    text(&c["channel"]),
                    c["totals"]["sent"],
                    c["rates"]["open_rate"].as_f64().unwrap_or(0.0),
                    c["rates"]["click_rate"].as_f64().unwrap_or(0.0),
                    c["roi"].as_f64().unwrap_or(0.0)
                );
            }
            println!();
            println!(
                "Total sent: {}  revenue: {:.2}",
                overview["totals"]["sent"],
                overview["totals"]["revenue"].as_f64().unwrap_or(0.0)
            );
        }

        Commands::Jobs { search } => {
            let mut query = vec![("status", "open".to_string())];
            query.extend(search.map(|s| ("search", s)));

            let body = api.get("/jobs", &query).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            let jobs = body["items"].as_array().cloned().unwrap_or_default();
            if jobs.is_empty() {
                println!("No open positions.");
            }
            for job in jobs {
                println!(
                    "{:<32} {:<16} {:<16} {}",
                    truncate(text(&job["title"]), 32),
                    text(&job["department"]),
                    text(&job["location"]),
                    text(&job["id"])
                );
            }
        }

        Commands::ThemeCss => {
            let response = api
                .client
                .get(format!("{}/theme.css", api.base))
                .send()
                .await?;
            print!("{}", response.error_for_status()?.text().await?);
        }

        Commands::Export { form_id, output } => {
            let response = api
                .client
                .get(format!("{}/forms/{}/submissions.csv", api.base, form_id))
                .send()
                .await?;
            let csv = check(response).await?.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &csv)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported {} rows to {:?}", csv.lines().count().saturating_sub(1), path);
                }
                None => print!("{}", csv),
            }
        }

        Commands::Contact => {
            let wizard = run_wizard()?;
            let created = api
                .post("/contacts/wizard", serde_json::to_value(wizard.data())?)
                .await?;
            println!();
            println!("Thanks! Submission {} received.", text(&created["submission"]["id"]));
        }

        Commands::Config { output } => {
            let config = agency::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

struct Api {
    client: reqwest::Client,
    base: String,
}

impl Api {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .query(query)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Turn an API error body into a readable message
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    match body["error"]["message"].as_str() {
        Some(message) => bail!("{} ({})", message, status),
        None => bail!("API returned error: {}", status),
    }
}

fn run_wizard() -> Result<ContactWizard> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |label: &str| -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;
        Ok(lines.next().transpose()?.unwrap_or_default().trim().to_string())
    };

    let mut wizard = ContactWizard::new();
    loop {
        let step = wizard.step();
        println!();
        println!(
            "Step {} of {}: {}",
            wizard.flow().step_number(),
            wizard.flow().total(),
            step.title()
        );

        match step {
            ContactStep::Contact => wizard.set_contact(ContactDetails {
                name: ask("Name")?,
                email: ask("Email")?,
                phone: optional(ask("Phone (optional)")?),
            }),
            ContactStep::Company => {
                println!("Budgets: {}", BUDGET_RANGES.join(", "));
                wizard.set_company(CompanyDetails {
                    company: optional(ask("Company (optional)")?),
                    website: optional(ask("Website (optional)")?),
                    budget: optional(ask("Budget (optional)")?),
                });
            }
            ContactStep::Services => {
                for (id, label) in SERVICES {
                    println!("  {:<12} {}", id, label);
                }
                for id in ask("Services (space separated)")?.split_whitespace() {
                    if let Err(e) = wizard.toggle_service(id) {
                        println!("  {}", e);
                    }
                }
            }
            ContactStep::Project => {
                println!("Timelines: {}", TIMELINES.join(", "));
                wizard.set_project(ProjectDetails {
                    message: ask("Tell us about the project")?,
                    timeline: optional(ask("Timeline (optional)")?),
                });
            }
        }

        if wizard.flow().is_last() {
            match wizard.finish() {
                Ok(_) => return Ok(wizard),
                Err(e) => println!("  {}", e),
            }
        } else if let Err(e) = wizard.next() {
            println!("  {}", e);
        }
    }
}

fn print_items(body: &Value, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(body)?);
        return Ok(());
    }

    let items = body["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        println!("No rows.");
        return Ok(());
    }

    for item in &items {
        let label = ["name", "title", "email", "event_name", "filename"]
            .iter()
            .find_map(|key| item[*key].as_str())
            .unwrap_or("-");
        let status = item["status"].as_str().unwrap_or("");
        println!("{:<38} {:<36} {}", text(&item["id"]), truncate(label, 36), status);
    }
    println!();
    println!("{} row(s)", body["count"]);
    Ok(())
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("-")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
