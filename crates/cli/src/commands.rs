//! Subcommand implementations: the five-step sample flow, split into
//! commands (authentication happens lazily on the first call).

use anyhow::{Context, bail};
use colored::Colorize;
use ns::{Attachment, CatalogClient, Note, default_notebook, media_tag};
use std::path::{Path, PathBuf};

pub async fn notebooks(client: &CatalogClient) -> anyhow::Result<()> {
	let notebooks = client.list_notebooks().await?;
	if notebooks.is_empty() {
		println!("no notebooks");
		return Ok(());
	}

	let default_id = default_notebook(&notebooks).map(|nb| nb.id.clone());
	println!("Found {} notebooks:", notebooks.len());
	for nb in &notebooks {
		let marker = if Some(&nb.id) == default_id.as_ref() {
			" (default)".green().to_string()
		} else {
			String::new()
		};
		println!("  * {} [{}]{}", nb.name.bold(), nb.id, marker);
	}
	Ok(())
}

pub async fn notes(
	client: &CatalogClient,
	notebook: Option<&str>,
	offset: u32,
	limit: u32,
) -> anyhow::Result<()> {
	let notebook_id = resolve_notebook(client, notebook).await?;
	let notes = client.find_notes(&notebook_id, offset, limit).await?;

	if notes.is_empty() {
		println!("no notes in notebook {notebook_id}");
		return Ok(());
	}
	for note in &notes {
		println!("  * {} [{}]", note.title.bold(), note.id.as_deref().unwrap_or("?"));
	}
	Ok(())
}

pub async fn create(
	client: &CatalogClient,
	title: &str,
	content: Option<&str>,
	notebook: Option<&str>,
	attach: &[PathBuf],
) -> anyhow::Result<()> {
	let notebook_id = resolve_notebook(client, notebook).await?;

	let mut attachments = Vec::with_capacity(attach.len());
	for path in attach {
		let bytes = tokio::fs::read(path)
			.await
			.with_context(|| format!("reading attachment {}", path.display()))?;
		attachments.push(Attachment::new(mime_for(path), bytes));
	}

	let content = match content {
		Some(content) => content.to_string(),
		None => {
			// Mirror the classic sample note: a line of text followed by
			// every attachment referenced inline.
			let mut body = String::from("<note>Created by ns-cli<br/>");
			for attachment in &attachments {
				body.push_str(&media_tag(&attachment.mime_type, &attachment.content_hash));
			}
			body.push_str("</note>");
			body
		}
	};

	let mut note = Note::new(notebook_id, title, content);
	note.attachments = attachments;

	let created = client.create_note(note).await?;
	match created.id {
		Some(id) => println!("Created note {}", id.bold()),
		None => bail!("service accepted the note but returned no id"),
	}
	Ok(())
}

async fn resolve_notebook(
	client: &CatalogClient,
	requested: Option<&str>,
) -> anyhow::Result<String> {
	if let Some(id) = requested {
		return Ok(id.to_string());
	}
	let notebooks = client.list_notebooks().await?;
	match default_notebook(&notebooks) {
		Some(nb) => Ok(nb.id.clone()),
		None => bail!("account has no notebooks; pass --notebook explicitly"),
	}
}

fn mime_for(path: &Path) -> &'static str {
	match path
		.extension()
		.and_then(|ext| ext.to_str())
		.map(|ext| ext.to_ascii_lowercase())
		.as_deref()
	{
		Some("png") => "image/png",
		Some("jpg" | "jpeg") => "image/jpeg",
		Some("gif") => "image/gif",
		Some("pdf") => "application/pdf",
		Some("txt" | "md") => "text/plain",
		_ => "application/octet-stream",
	}
}
