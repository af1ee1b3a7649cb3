//! Flip through a small canned thread the way a reader UI would.
//!
//! Run with: cargo run --example thread_browser

use bsky_threads::mock::MockThreadSource;
use bsky_threads::{RawThreadNode, ThreadNavigator, ThreadProcessor};
use serde_json::json;

fn post_json(uri: &str, handle: &str, indexed_at: &str, text: &str) -> serde_json::Value {
    json!({
        "uri": uri,
        "cid": format!("cid-{uri}"),
        "author": {"did": format!("did:plc:{handle}"), "handle": handle},
        "record": {"text": text},
        "indexedAt": indexed_at
    })
}

fn canned_thread() -> RawThreadNode {
    serde_json::from_value(json!({
        "$type": "app.bsky.feed.defs#threadViewPost",
        "post": post_json(
            "at://root", "alice.bsky.social",
            "2024-03-01T10:00:00Z", "Has anyone read the new borrow checker RFC?"
        ),
        "replies": [
            {
                "$type": "app.bsky.feed.defs#threadViewPost",
                "post": post_json(
                    "at://reply-late", "carol.bsky.social",
                    "2024-03-01T12:30:00Z", "Skimmed it. The diagnostics section is great."
                )
            },
            {
                "$type": "app.bsky.feed.defs#threadViewPost",
                "post": post_json(
                    "at://reply-early", "bob.bsky.social",
                    "2024-03-01T11:00:00Z", "Yes! Thread incoming."
                ),
                "replies": [{
                    "$type": "app.bsky.feed.defs#threadViewPost",
                    "post": post_json(
                        "at://nested", "alice.bsky.social",
                        "2024-03-01T11:45:00Z", "Looking forward to it."
                    )
                }]
            },
            {
                "$type": "app.bsky.feed.defs#notFoundPost",
                "uri": "at://deleted-reply",
                "notFound": true
            }
        ]
    }))
    .expect("canned thread must decode")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = MockThreadSource::new().with_thread("at://root", canned_thread());
    let processor = ThreadProcessor::new(source);

    let thread = processor.fetch_and_normalize("at://root").await?;
    println!(
        "fetched thread with {} posts (max depth {})\n",
        thread.post_count(),
        thread.max_depth()
    );

    let nav = ThreadNavigator::build(thread, None);

    loop {
        let position = nav.position();
        if let (Some(index), Some(post)) = (position.index, nav.current_post()) {
            let depth = nav.current_node().map(|n| n.depth).unwrap_or(0);
            println!(
                "[{}/{}] {}@{}: {}",
                index + 1,
                position.total,
                "  ".repeat(depth),
                post.author.handle,
                post.text().unwrap_or("<no text>")
            );
        }
        if !nav.move_to_next() {
            break;
        }
    }

    Ok(())
}
