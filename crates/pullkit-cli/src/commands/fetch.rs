use anyhow::Result;

use pullkit_core::{AppConfig, FeedDataSource, ItemId, RemoteSource};

pub async fn run(config: &AppConfig, url: Option<String>, cursor: Option<String>) -> Result<()> {
    let mut config = config.clone();
    if let Some(url) = url {
        config.remote.base_url = url;
    }
    let source = RemoteSource::new(&config)?;

    let page = match cursor {
        Some(cursor) => source.fetch_after(&ItemId::from(cursor)).await?,
        None => source.fetch_first_page().await?,
    };

    if page.is_empty() {
        println!("(empty page — end of feed)");
        return Ok(());
    }

    for item in &page {
        let author = item.author.as_deref().unwrap_or("-");
        let when = item
            .published_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<12} {:<16} {:<17} {}", item.id, author, when, item.body);
    }

    if let Some(last) = page.last() {
        println!("\n{} items; next cursor: {}", page.len(), last.id);
    }

    Ok(())
}
