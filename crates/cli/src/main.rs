mod cli;
mod commands;
mod http;
mod logging;

use anyhow::{Context, bail};
use clap::Parser;
use ns::{CatalogClient, ClientConfig, Credential};
use std::sync::Arc;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = cli::Cli::parse();
	logging::init_logging(args.verbose);

	Url::parse(&args.endpoint)
		.with_context(|| format!("invalid endpoint URL: {}", args.endpoint))?;

	let credential = credential_from(&args)?;
	let config = ClientConfig::new(&args.endpoint, credential)
		.with_client_name(concat!("ns-cli/", env!("CARGO_PKG_VERSION")));
	let transport = Arc::new(http::HttpTransport::new()?);
	let client = CatalogClient::new(config, transport);

	match args.command {
		cli::Command::Notebooks => commands::notebooks(&client).await,
		cli::Command::Notes {
			notebook,
			offset,
			limit,
		} => commands::notes(&client, notebook.as_deref(), offset, limit).await,
		cli::Command::Create {
			title,
			content,
			notebook,
			attach,
		} => commands::create(&client, &title, content.as_deref(), notebook.as_deref(), &attach).await,
	}
}

fn credential_from(args: &cli::Cli) -> anyhow::Result<Credential> {
	if let Some(token) = &args.token {
		return Ok(Credential::Token(token.clone()));
	}
	match (&args.username, &args.password, &args.consumer_key, &args.consumer_secret) {
		(Some(username), Some(password), Some(consumer_key), Some(consumer_secret)) => {
			Ok(Credential::Password {
				username: username.clone(),
				password: password.clone(),
				consumer_key: consumer_key.clone(),
				consumer_secret: consumer_secret.clone(),
			})
		}
		_ => bail!(
			"provide either --token, or all of --username/--password/--consumer-key/--consumer-secret"
		),
	}
}
