use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rocketshoes_cart::application::errors::AppError;
use rocketshoes_cart::infrastructure::adapters::ConsoleNotifier;
use rocketshoes_cart::infrastructure::build_cart_store;
use rocketshoes_cart::infrastructure::config::Config;
use rocketshoes_cart::{Cart, CartError, CartStore, ProductId, UpdateProductAmount};

#[derive(Parser)]
#[command(name = "rocketshoes-cart")]
#[command(about = "Shopping cart backed by the RocketShoes stock API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "cart.yaml")]
    config: PathBuf,

    /// Stock API base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// json-server db.json to use instead of the API (overrides config)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product
    Add { product_id: u64 },
    /// Remove a product from the cart
    Remove { product_id: u64 },
    /// Set the amount of a product in the cart
    Update {
        product_id: u64,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Print the cart
    Show,
    /// Interactive session reading commands from stdin
    Shell,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("rocketshoes-cart v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(),
        ref command => match run(&cli, command) {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn load_config(cli: &Cli) -> Config {
    let mut config = if cli.config.exists() {
        let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        });
        config.apply_env();
        config
    } else {
        Config::load_env()
    };

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog = Some(catalog.clone());
    }
    config
}

fn run(cli: &Cli, command: &Commands) -> Result<ExitCode, AppError> {
    let config = load_config(cli);
    let notifier = Arc::new(ConsoleNotifier::new());
    let store = build_cart_store(&config, notifier)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::Storage(e.into()))?;

    let outcome = rt.block_on(async {
        match command {
            Commands::Add { product_id } => store.add(ProductId(*product_id)).await.map(Some),
            Commands::Remove { product_id } => store.remove(ProductId(*product_id)).map(Some),
            Commands::Update { product_id, amount } => store
                .update_amount(UpdateProductAmount::new(*product_id, *amount))
                .await
                .map(Some),
            Commands::Show => Ok(Some(store.cart())),
            Commands::Shell => {
                run_shell(&store).await;
                Ok(None)
            }
            Commands::Version | Commands::InitConfig => Ok(None),
        }
    });

    match outcome {
        Ok(Some(cart)) => {
            print_cart(&cart);
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => Ok(ExitCode::SUCCESS),
        // already reported through the notifier
        Err(e) if e.is_silent() => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

async fn run_shell(store: &CartStore) {
    let mut events = store.subscribe();
    let stdin = std::io::stdin();

    println!("Commands: add <id> | remove <id> | update <id> <amount> | show | quit");
    loop {
        print!("cart> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let result: Option<Result<Cart, CartError>> = match parts.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["show"] => {
                print_cart(&store.cart());
                None
            }
            ["add", id] => match id.parse() {
                Ok(id) => Some(store.add(ProductId(id)).await),
                Err(_) => usage(),
            },
            ["remove", id] => match id.parse() {
                Ok(id) => Some(store.remove(ProductId(id))),
                Err(_) => usage(),
            },
            ["update", id, amount] => match (id.parse::<u64>(), amount.parse::<i64>()) {
                (Ok(id), Ok(amount)) => {
                    Some(store.update_amount(UpdateProductAmount::new(id, amount)).await)
                }
                _ => usage(),
            },
            _ => usage(),
        };

        if let Some(Err(e)) = &result {
            tracing::debug!("{}", e);
        }
        while let Ok(event) = events.try_recv() {
            tracing::debug!(operation = %event.operation, lines = event.cart.len(), "Cart changed");
            print_cart(&event.cart);
        }
    }
}

fn usage() -> Option<Result<Cart, CartError>> {
    println!("Commands: add <id> | remove <id> | update <id> <amount> | show | quit");
    None
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Carrinho vazio");
        return;
    }

    for product in cart {
        let title = product.title().unwrap_or("-");
        match product.subtotal() {
            Some(subtotal) => println!(
                "{:>6}  {:<40} x{:<4} {}",
                product.id.get(),
                title,
                product.amount,
                format_price(subtotal)
            ),
            None => println!("{:>6}  {:<40} x{}", product.id.get(), title, product.amount),
        }
    }
    println!(
        "{} produto(s), {} item(ns), total {}",
        cart.len(),
        cart.total_items(),
        format_price(cart.total())
    );
}

/// Brazilian real formatting, e.g. `R$ 1.259,80`
fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let units = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

fn init_config() -> ExitCode {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to cart.yaml and adjust as needed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
