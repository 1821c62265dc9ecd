use std::path::PathBuf;
use std::str::FromStr;

use axum::http::Method;
use clap::{Parser, Subcommand};

use resource_router::config::{load_config, ServerConfig};
use resource_router::http::Body;
use resource_router::pattern::AliasTable;
use resource_router::{RequestDescriptor, Router};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect and exercise a resource-router configuration offline", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one request and print the response
    Match {
        method: String,
        resource: String,
        /// Request header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// List routes as JSON
    Routes {
        /// Only routes that could match a resource under this prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Validate the configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Check => {
            println!(
                "{}: ok ({} routes, {} aliases)",
                cli.config.display(),
                config.routes.len(),
                config.aliases.len()
            );
        }
        Commands::Routes { prefix } => {
            let router = Router::from_config(&config)?;
            let routes = match prefix {
                Some(prefix) => router.describe_under(&prefix),
                None => router.describe(),
            };
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        Commands::Match {
            method,
            resource,
            headers,
        } => match_request(&config, &method, resource, &headers).await?,
    }

    Ok(())
}

async fn match_request(
    config: &ServerConfig,
    method: &str,
    resource: String,
    headers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::from_config(config)?;
    let aliases = AliasTable::new(config.aliases.iter().map(|a| (a.from.as_str(), a.to.as_str())));
    let resource = aliases.rewrite(&resource).unwrap_or(resource);

    let mut request = RequestDescriptor::new(Method::from_str(&method.to_ascii_uppercase())?, resource);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header `{header}` is not `name:value`"))?;
        request.headers.insert(name.trim(), value.trim());
    }

    let response = router.dispatch(&mut request).await?;
    println!("{} {}", response.status.as_u16(), response.reason());
    for (name, value) in response.headers.iter() {
        println!("{name}: {value}");
    }
    if !request.params.is_empty() {
        println!("x-captures: {}", serde_json::to_string(&request.params)?);
    }
    match response.body {
        Some(Body::Text(text)) => println!("\n{text}"),
        Some(Body::Json(value)) => println!("\n{}", serde_json::to_string_pretty(&value)?),
        Some(Body::Bytes(bytes)) => println!("\n<{} bytes>", bytes.len()),
        None => {
            if let Some(message) = response.status_message {
                println!("\n{message}");
            }
        }
    }
    Ok(())
}
