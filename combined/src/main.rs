//! Command-line front-end for the marketplace session client.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{AppError, AppResult, ClientConfig};
use domain::{Condition, IdentityPatch, ProductListing, SearchFilter, SearchFilterPatch, SortKey};
use gateway_lib::{ApiResponse, Endpoint, Method, RequestOptions};
use session_lib::SessionContext;

#[derive(Parser)]
#[command(name = "market")]
#[command(about = "Marketplace session client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (demo login, no server round-trip)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (demo registration)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Update fields of the signed-in identity
    Update(UpdateArgs),
    /// Change the account password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Reload the identity from the profile endpoint
    Profile,
    /// Call a named endpoint through the gateway
    Call(CallArgs),
    /// List products matching a search filter
    Products(FilterArgs),
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Avatar URL; an empty value removes it
    #[arg(long)]
    avatar: Option<String>,
    /// Contact number; an empty value removes it
    #[arg(long)]
    contact_number: Option<String>,
}

impl UpdateArgs {
    fn into_patch(self) -> IdentityPatch {
        IdentityPatch {
            name: self.name,
            email: self.email,
            avatar: self.avatar,
            contact_number: self.contact_number,
            ..IdentityPatch::default()
        }
    }
}

#[derive(Args)]
struct CallArgs {
    /// Endpoint name, e.g. `featured-products`
    endpoint: Endpoint,
    #[arg(long, default_value = "GET")]
    method: Method,
    /// Item id below a collection endpoint (`products/{id}/`)
    #[arg(long)]
    id: Option<String>,
    /// JSON request body
    #[arg(long, value_parser = parse_json)]
    body: Option<Value>,
    /// Extra header as `Name: value`
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
    /// Query parameter as `key=value`
    #[arg(long = "query", value_parser = parse_query)]
    query: Vec<(String, String)>,
}

#[derive(Args)]
struct FilterArgs {
    /// Free text matched against title, description and tags
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// new, used or refurbished
    #[arg(long)]
    condition: Option<Condition>,
    /// date-desc, price-asc, price-desc or popularity
    #[arg(long)]
    sort: Option<SortKey>,
    #[arg(long)]
    location: Option<String>,
    /// Filter a local JSON array of listings instead of calling the server
    #[arg(long)]
    from_file: Option<PathBuf>,
}

impl FilterArgs {
    fn to_filter(&self) -> SearchFilter {
        SearchFilter::cleared().merge(SearchFilterPatch {
            query: self.search.clone(),
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            condition: self.condition,
            sort_by: self.sort,
            location: self.location.clone(),
        })
    }
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON body: {}", e))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_query(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got '{}'", raw))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn print_json(value: &impl serde::Serialize) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_response(response: &ApiResponse) -> AppResult<()> {
    println!("HTTP {}", response.status);
    print_json(&response.body)
}

fn load_listings(path: &Path) -> AppResult<Vec<ProductListing>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::validation(format!("Cannot read listings file {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&raw)?)
}

async fn run(command: Commands, session: &SessionContext) -> AppResult<()> {
    match command {
        Commands::Login { email, password } => {
            let identity = session.login(&email, &password).await?;
            print_json(&identity)
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let identity = session.register(&name, &email, &password).await?;
            print_json(&identity)
        }
        Commands::Logout => {
            session.logout().await?;
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            println!("Status: {}", session.status());
            match session.identity() {
                Some(identity) => print_json(&identity),
                None => Ok(()),
            }
        }
        Commands::Update(args) => match session.update_identity(args.into_patch())? {
            Some(identity) => print_json(&identity),
            None => {
                println!("Not signed in, nothing updated");
                Ok(())
            }
        },
        Commands::Password {
            current,
            new_password,
            confirm,
        } => {
            session
                .change_password(&current, &new_password, &confirm)
                .await?;
            println!("Password changed");
            Ok(())
        }
        Commands::Profile => match session.refresh_profile().await? {
            Some(identity) => print_json(&identity),
            None => {
                println!("Not signed in");
                Ok(())
            }
        },
        Commands::Call(args) => {
            let gateway = session.gateway();
            let mut options = RequestOptions::default()
                .method(args.method)
                .query(args.query);
            if let Some(body) = args.body {
                options = options.body(body);
            }
            for (name, value) in args.headers {
                options = options.header(name, value);
            }

            let response = match (args.endpoint, args.id) {
                (Endpoint::Messages, Some(id)) => {
                    gateway
                        .request_url(gateway.endpoints().messages(&id)?, options)
                        .await?
                }
                (endpoint, Some(id)) => {
                    gateway
                        .request_url(gateway.endpoints().resource(endpoint, &id)?, options)
                        .await?
                }
                (endpoint, None) => gateway.request(endpoint, options).await?,
            };
            print_response(&response)
        }
        Commands::Products(args) => {
            let filter = args.to_filter();
            filter.validate()?;
            debug!("Product filter: {:?}", filter);

            match &args.from_file {
                Some(path) => {
                    let listings = load_listings(path)?;
                    let selected = filter.apply(&listings);
                    info!("{} of {} listings match", selected.len(), listings.len());
                    print_json(&selected)
                }
                None => {
                    let response = session.gateway().search_products(&filter).await?;
                    print_response(&response)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    debug!("Configuration: {:?}", config);

    let session = SessionContext::open(config)?;
    let status = session.initialize().await;
    debug!("Session restored: {}", status);

    if let Err(e) = run(cli.command, &session).await {
        error!("{} ({})", e, e.code());
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call_arguments() {
        let cli = Cli::try_parse_from([
            "market",
            "call",
            "featured-products",
            "--method",
            "post",
            "--body",
            r#"{"limit": 5}"#,
            "--header",
            "X-Trace: abc",
            "--query",
            "page=2",
        ])
        .unwrap();

        let Commands::Call(args) = cli.command else {
            panic!("expected call command");
        };
        assert_eq!(args.endpoint, Endpoint::FeaturedProducts);
        assert_eq!(args.method, Method::Post);
        assert_eq!(args.body, Some(serde_json::json!({"limit": 5})));
        assert_eq!(args.headers, vec![("X-Trace".to_string(), "abc".to_string())]);
        assert_eq!(args.query, vec![("page".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_unknown_endpoint_is_rejected() {
        assert!(Cli::try_parse_from(["market", "call", "nope"]).is_err());
    }

    #[test]
    fn test_products_arguments_build_filter() {
        let cli = Cli::try_parse_from([
            "market",
            "products",
            "--search",
            "bike",
            "--condition",
            "used",
            "--sort",
            "price-asc",
            "--max-price",
            "250",
        ])
        .unwrap();

        let Commands::Products(args) = cli.command else {
            panic!("expected products command");
        };
        let filter = args.to_filter();
        assert_eq!(filter.query, "bike");
        assert_eq!(filter.condition, Condition::Used);
        assert_eq!(filter.sort_by, SortKey::PriceAsc);
        assert_eq!(filter.min_price, 0.0);
        assert_eq!(filter.max_price, 250.0);
    }

    #[test]
    fn test_parse_header_and_query() {
        assert_eq!(
            parse_header("Accept-Language: en").unwrap(),
            ("Accept-Language".to_string(), "en".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
        assert_eq!(
            parse_query("ordering=-price").unwrap(),
            ("ordering".to_string(), "-price".to_string())
        );
        assert!(parse_query("missing").is_err());
    }

    #[test]
    fn test_load_listings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(
            &path,
            r#"[{"id": "1", "title": "Road bike", "price": 120.0, "createdAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let listings = load_listings(&path).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Road bike");

        assert!(load_listings(&dir.path().join("missing.json")).is_err());
    }
}
