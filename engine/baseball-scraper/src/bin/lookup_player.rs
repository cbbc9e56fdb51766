use anyhow::bail;
use baseball_scraper::{PlayerLookup, PlayerRecord};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct LookupOutput {
    #[serde(flatten)]
    player: PlayerRecord,
    player_url: Option<String>,
    savant_url: Option<String>,
}

/// Usage: lookup_player <last> [first]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (last, first) = match args.as_slice() {
        [last] => (last.as_str(), None),
        [last, first] => (last.as_str(), Some(first.as_str())),
        _ => bail!("usage: lookup_player <last> [first]"),
    };

    let lookup = PlayerLookup::new()?;
    let players = lookup.search(last, first).await?;
    eprintln!("🔎 {} match(es) for {}", players.len(), first.map_or(last.to_string(), |f| format!("{f} {last}")));

    let output: Vec<LookupOutput> = players
        .into_iter()
        .map(|player| LookupOutput {
            player_url: player.player_url(),
            savant_url: player.savant_url(),
            player,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
