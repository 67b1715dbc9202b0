use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use pullkit_core::{AppConfig, FeedItem, FeedScreen, MemorySource};

pub async fn run(config: &AppConfig, posts: usize, latency_ms: u64) -> Result<()> {
    let items: Vec<FeedItem> = (1..=posts)
        .map(|n| FeedItem::new(n.to_string(), format!("post {}", n)))
        .collect();
    let source = Arc::new(
        MemorySource::new(items).with_latency(Duration::from_millis(latency_ms)),
    );
    let mut screen = FeedScreen::new(source, &config.pull);

    println!(
        "Seeded {} posts (page size 10, {}ms simulated latency)\n",
        posts, latency_ms
    );

    // Initial page.
    screen.load_more();
    run_to_rest(&mut screen, config).await;
    println!("loaded {} items", screen.items().len());

    // Short pull: never crosses the threshold, snaps back without a fetch.
    println!("\n-- short pull, released at 40 --");
    for dy in [10.0, 25.0, 40.0] {
        screen.on_move(dy);
    }
    screen.on_release();
    run_to_rest(&mut screen, config).await;
    println!("no refresh; still {} items", screen.items().len());

    // Full pull: latches at 60, holds while the refresh runs.
    println!("\n-- full pull, released at 96 --");
    for dy in [12.0, 36.0, 60.0, 84.0, 96.0] {
        screen.on_move(dy);
    }
    screen.on_release();
    run_to_rest(&mut screen, config).await;
    println!("refreshed; {} items", screen.items().len());

    // Scroll to the end of the feed.
    println!("\n-- scrolling to the end --");
    while !screen.is_exhausted() {
        screen.load_more();
        run_to_rest(&mut screen, config).await;
        println!("{} items", screen.items().len());
    }
    println!("\nFeed exhausted at {} items.", screen.items().len());

    Ok(())
}

/// Tick the animation and drain completions until the screen is fully at
/// rest: nothing in flight and the offset settled at its target.
async fn run_to_rest(screen: &mut FeedScreen, config: &AppConfig) {
    let tick = config.pull.tick_rate();
    let mut last_printed = f64::NAN;
    loop {
        if let Some(event) = screen.try_event() {
            if let Some(notice) = screen.apply(event) {
                println!("  -> {:?}", notice);
            }
        }

        let offset = screen.tick();
        if offset > 0.0 && offset != last_printed {
            let bar = "=".repeat((offset / 4.0).round() as usize);
            println!("  offset {:>6.1} |{}", offset, bar);
            last_printed = offset;
        }

        let settled = !screen.is_refreshing()
            && !screen.is_loading()
            && offset == screen.target_offset();
        if settled {
            break;
        }
        tokio::time::sleep(tick).await;
    }
}
