use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::Result;
use bat::PrettyPrinter;
use chrono::Local;
use cliclack::{input, spinner};
use console::style;
use dotenv::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sierra::agent::SupportAgent;
use sierra::prompt::PromptConfig;
use sierra::providers::configs::{OpenAiEmbeddingConfig, OpenAiProviderConfig};
use sierra::providers::embeddings::OpenAiEmbeddingClient;
use sierra::providers::openai::OpenAiProvider;
use sierra::store::embedding::ProductEmbeddingStore;
use sierra::store::order::OrderStore;
use sierra::store::product::ProductStore;
use sierra::tools::check_promotion::CheckPromotionEligibility;
use sierra::tools::lookup_order::LookupOrder;
use sierra::tools::recommend_product::RecommendProduct;
use sierra::tools::ToolRegistry;

fn init_logging() -> Result<()> {
    let logs_dir = Path::new("logs");
    fs::create_dir_all(logs_dir)?;
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join(format!("{}.log", Local::now().format("%Y-%m-%d"))))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn build_agent(api_key: String) -> Result<SupportAgent> {
    let data_dir = PathBuf::from("data");
    let prompts = PromptConfig::load(Path::new("config/prompt.yaml"))?;

    let provider = Arc::new(OpenAiProvider::new(OpenAiProviderConfig::new(
        api_key.clone(),
    ))?);
    let embedder = Arc::new(OpenAiEmbeddingClient::new(OpenAiEmbeddingConfig::new(
        api_key,
    ))?);

    let product_store = Arc::new(ProductStore::load(&data_dir.join("ProductCatalog.json")));
    let embedding_store = Arc::new(
        ProductEmbeddingStore::load(
            product_store.clone(),
            data_dir.join("ProductEmbeddings.json"),
            embedder,
        )
        .await,
    );
    let order_store = Arc::new(OrderStore::load(&data_dir.join("CustomerOrders.json")));

    let registry = ToolRegistry::new(vec![
        Box::new(LookupOrder::new(order_store)),
        Box::new(CheckPromotionEligibility::new()),
        Box::new(RecommendProduct::new(
            product_store,
            embedding_store,
            provider.clone(),
        )),
    ]);

    Ok(SupportAgent::new(
        provider,
        &prompts.main_system_prompt,
        registry,
    ))
}

fn render(content: &str) {
    let printed = PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .is_ok();
    if !printed {
        println!("{}", content);
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging()?;

    let api_key = match env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            error!("OpenAI API key not found");
            eprintln!("\nError: The customer support agent encountered an error and needs to close.");
            process::exit(1);
        }
    };

    let mut agent = build_agent(api_key).await?;

    println!(
        "\n{}",
        style("Sierra Outfitters Customer Support Agent").bold()
    );
    println!();

    let greeting = agent.generate_response("send a greeting to user").await;
    render(&greeting);

    loop {
        let message_text: String = match input("You:").placeholder("").interact() {
            Ok(text) => text,
            // Interrupted or closed input ends the session
            Err(_) => break,
        };

        let trimmed = message_text.trim();
        if trimmed.is_empty() {
            continue;
        }

        let spin = spinner();
        spin.start("awaiting reply");
        let response = agent.process_message(trimmed).await;
        spin.stop("");

        render(&response);
    }

    println!("\nExiting customer support agent. Goodbye!");
    Ok(())
}
