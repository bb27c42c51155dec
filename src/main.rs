// BullBear Backend - market data API for the BullBear dashboard
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::{Parser, Subcommand};
use log::info;

use bullbear_backend::config::AppConfig;
use bullbear_backend::handlers::{configure_routes, display_label, not_found};
use bullbear_backend::models::DataType;
use bullbear_backend::services::DataFetcher;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind, overrides BIND_ADDRESS
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch a single metric and print it
    Fetch {
        /// One of: btc_price, total_market_cap, stablecoin_market_cap, ma50, ma200
        data_type: String,
    },

    /// Fetch every metric and print them
    FetchAll,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            serve(config).await?;
        }
        Commands::Fetch { data_type } => {
            let dtype: DataType = data_type.parse()?;
            let fetcher = DataFetcher::from_config(&config)?;
            let result = fetcher.get(dtype).await?;
            println!("{}: {:.2} ({})", display_label(&result.data_type), result.value, result.provider);
        }
        Commands::FetchAll => {
            let fetcher = DataFetcher::from_config(&config)?;
            for (data_type, result) in fetcher.get_all().await? {
                println!("{}: {:.2} ({})", display_label(&data_type), result.value, result.provider);
            }
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let fetcher = web::Data::new(DataFetcher::from_config(&config)?);

    if config.coinmarketcap_api_key.is_none() {
        log::warn!("COINMARKETCAP_API_KEY not set; market cap metrics will fail");
    }
    info!("Binance base URL: {}", config.binance_base_url);
    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(fetcher.clone())
            .configure(configure_routes)
            .default_service(web::to(not_found))
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}
