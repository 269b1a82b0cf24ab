use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use crossgen::{
    feed, merge_words, read_text, read_words, write_text, Alphabet, DawgBuilder,
};
use log::info;
use serde_derive::Deserialize;
use tqdm::tqdm;

#[derive(Deserialize, Debug)]
struct Config {
    /// "english", "icelandic", or the letters of a custom alphabet in
    /// ascending collation order.
    alphabet: String,
    /// Pre-sorted word list files, one word per line.
    wordlists: Vec<PathBuf>,
    /// Output base name; the graph is written to `<output>.text.dawg`.
    output: PathBuf,
    /// Drop words longer than this before building (board words only).
    max_word_len: Option<usize>,
}

fn alphabet_from_config(name: &str) -> anyhow::Result<Alphabet> {
    match name {
        "english" => Ok(Alphabet::english()),
        "icelandic" => Ok(Alphabet::icelandic()),
        letters => Alphabet::new(letters)
            .with_context(|| format!("invalid custom alphabet \"{letters}\"")),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "crossgen.toml".to_string());
    let config: Config = toml::from_str(
        &fs::read_to_string(&config_path)
            .with_context(|| format!("could not read {config_path}"))?,
    )
    .with_context(|| format!("could not parse {config_path}"))?;
    if config.wordlists.is_empty() {
        bail!("no word lists configured");
    }

    let alphabet = alphabet_from_config(&config.alphabet)?;

    let mut streams = Vec::new();
    for path in &config.wordlists {
        let file = File::open(path)
            .with_context(|| format!("could not open word list {}", path.display()))?;
        info!("opened input file {}", path.display());
        streams.push(read_words(&alphabet, BufReader::new(file)));
    }

    let mut builder = DawgBuilder::new(alphabet.clone());
    let max_word_len = config.max_word_len;
    let stats = feed(
        &mut builder,
        tqdm(merge_words(&alphabet, streams)),
        move |word| max_word_len.map_or(true, |max| word.chars().count() <= max),
    );
    info!(
        "read {} words, kept {}, skipped {} duplicates, rejected {}",
        stats.read, stats.kept, stats.duplicates, stats.rejected
    );

    let dawg = builder.finish();
    info!(
        "graph has {} nodes, {} edges, {} prefix letters",
        dawg.node_count(),
        dawg.edge_count(),
        dawg.edge_char_count()
    );

    let out_path = PathBuf::from(format!("{}.text.dawg", config.output.display()));
    let mut out = BufWriter::new(
        File::create(&out_path)
            .with_context(|| format!("could not create {}", out_path.display()))?,
    );
    write_text(&dawg, &mut out).context("could not write graph text")?;
    out.flush().context("could not write graph text")?;
    info!("wrote {}", out_path.display());

    let reloaded = read_text(
        &alphabet,
        BufReader::new(File::open(&out_path).context("could not reopen output")?),
    )
    .context("reloading the written graph failed")?;
    if reloaded.node_count() != dawg.node_count() {
        bail!(
            "reload mismatch: wrote {} nodes, read back {}",
            dawg.node_count(),
            reloaded.node_count()
        );
    }
    info!("verified {} nodes after reload", reloaded.node_count());

    Ok(())
}
