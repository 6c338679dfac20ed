use gqlclient::{Client, ClientConfig, Variables};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::env;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = env::var("GRAPHQL_URL").unwrap_or_else(|_| "https://api.github.com/graphql".to_string());
    let token = env::var("GRAPHQL_TOKEN").expect("GRAPHQL_TOKEN is required");

    let config = ClientConfig::new(url).with_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("bearer {token}"))?,
    );
    let client = Client::new(config)?;

    let data = client
        .execute_raw(
            &CancellationToken::new(),
            "{ rateLimit { limit remaining resetAt } }",
            &Variables::new(),
        )
        .await?;

    println!("data: {}", data.unwrap_or_default());
    Ok(())
}
