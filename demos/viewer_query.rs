use gqlclient::{Client, ClientConfig, Field, Operation, SelectionSet, TypeRef, Variables};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::env;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
struct RepositoryQuery {
    viewer: Viewer,
    repository: Option<Repository>,
}

#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
struct Viewer {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
struct Repository {
    name: String,
    #[serde(rename = "stargazerCount")]
    stargazer_count: i64,
}

impl Operation for RepositoryQuery {
    fn selection() -> SelectionSet {
        SelectionSet::new([
            Field::object("viewer", "User", [Field::scalar("login", "String")]),
            Field::object(
                "repository",
                "Repository",
                [
                    Field::scalar("name", "String"),
                    Field::scalar("stargazerCount", "Int"),
                ],
            )
            .arguments("owner: $owner, name: $name")
            .nullable(),
        ])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = env::var("GRAPHQL_URL").unwrap_or_else(|_| "https://api.github.com/graphql".to_string());
    let token = env::var("GRAPHQL_TOKEN").expect("GRAPHQL_TOKEN is required");

    let config = ClientConfig::new(url).with_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("bearer {token}"))?,
    );
    let client = Client::new(config)?;

    let variables = Variables::new()
        .with("owner", TypeRef::named("String"), "rust-lang")?
        .with("name", TypeRef::named("String"), "rust")?;
    let mut query = RepositoryQuery::default();
    client
        .query_with_retry(&CancellationToken::new(), &mut query, &variables, 60, 3)
        .await?;

    println!("response: {query:?}");
    Ok(())
}
