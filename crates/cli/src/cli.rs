use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ns", about = "Sample client for remote note-storage services", version)]
pub struct Cli {
	/// Well-known service root used to bootstrap authentication
	#[arg(long, env = "NS_ENDPOINT")]
	pub endpoint: String,

	/// Pre-issued authentication token
	#[arg(long, env = "NS_TOKEN", conflicts_with_all = ["username", "password"])]
	pub token: Option<String>,

	/// Account username (with --password and consumer identity)
	#[arg(long, env = "NS_USERNAME")]
	pub username: Option<String>,

	/// Account password
	#[arg(long, env = "NS_PASSWORD")]
	pub password: Option<String>,

	/// API consumer key
	#[arg(long, env = "NS_CONSUMER_KEY")]
	pub consumer_key: Option<String>,

	/// API consumer secret
	#[arg(long, env = "NS_CONSUMER_SECRET")]
	pub consumer_secret: Option<String>,

	/// Increase log verbosity (-v, -vv)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// List the account's notebooks
	Notebooks,
	/// List note metadata from a notebook (default notebook if omitted)
	Notes {
		/// Notebook id; defaults to the account's default notebook
		#[arg(long)]
		notebook: Option<String>,
		#[arg(long, default_value_t = 0)]
		offset: u32,
		#[arg(long, default_value_t = 10)]
		limit: u32,
	},
	/// Create a note, optionally with file attachments
	Create {
		#[arg(long)]
		title: String,
		/// Note body; generated from the attachments when omitted
		#[arg(long)]
		content: Option<String>,
		/// Notebook id; defaults to the account's default notebook
		#[arg(long)]
		notebook: Option<String>,
		/// Files to attach
		#[arg(long)]
		attach: Vec<PathBuf>,
	},
}
