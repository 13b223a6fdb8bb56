use anyhow::Context;

use recast_bot::config;
use recast_bot::entities::intent_name;
use recast_bot::logging;
use recast_bot::{Bot, HandlerRegistry};

/// Usage: `recast-classify <text...>`
///
/// Prints the best intent for the given text. Reads `RECAST_TOKEN` and, if
/// set, `RECAST_API_URL`. Exits with 1 when the request or the API failed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        eprintln!("usage: recast-classify <text...>");
        std::process::exit(2);
    }

    let cfg = config::client_config();
    cfg.require_token()?;
    let bot = Bot::with_config(cfg).context("failed to build Recast client")?;

    let registry = HandlerRegistry::new()
        .any(|results, text: &String| {
            let intent = results
                .get("intents")
                .and_then(|v| v.get(0))
                .and_then(intent_name)
                .unwrap_or_else(|| "<unnamed>".to_string());
            println!("{}\t{}", intent, text);
        })
        .otherwise(|_, text| println!("<none>\t{}", text))
        .on_error(|err, _| eprintln!("{}", err));

    let outcome = bot.process(&text, &registry, &text).await;
    log::info!("[recast-classify] outcome={:?}", outcome);

    if outcome.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
