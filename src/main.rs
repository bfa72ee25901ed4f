//! Headless overlay demo - main entry point
//!
//! Binds the overlay synchronizer to a headless editor, then plays a short
//! scripted session (layout, a burst of typing, scrolling) and logs what the
//! annotation surface looks like after each step.
//!
//! Usage: tiny-overlays [--config overlays.toml] [source-file]
//! Set RUST_LOG=debug to see every update cycle.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tiny_overlays::coordinates::{DocPos, ViewPos};
use tiny_overlays::{
    AppConfig, Document, EditorBinding, HeadlessEditor, OverlaySynchronizer, SyntaxTokenizer,
    TextModel,
};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const SAMPLE: &str = "function x() {\n\tconsole.log(\"Hello world!\");\n}";

struct Args {
    config: Option<PathBuf>,
    source: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        source: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => bail!("Unknown flag: {}", flag),
            path => args.source = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    let language = config.editor.language.clone();
    let document = match &args.source {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("Reading {}", path.display()))?;
            Document::from_bytes(&bytes, language.as_str())?
        }
        None => Document::from_str(SAMPLE, language.as_str()),
    };

    let tokenizer = SyntaxTokenizer::new();
    if let Err(err) = tokenizer.preload(&language) {
        tracing::warn!("{}; using lexical tokens", err);
    }

    let editor = Arc::new(HeadlessEditor::new(document, config.viewport()));
    let mut sync = OverlaySynchronizer::new(config.sync_config());
    sync.initialize(EditorBinding::from_host(editor.clone(), Arc::new(tokenizer)));

    // Before layout nothing can be placed on screen yet
    sync.update();
    report("initial", &editor, &sync);

    editor.layout(config.editor.width, config.editor.height);
    editor.dispatch(&mut sync);
    report("layout", &editor, &sync);

    // A burst of keystrokes collapses into one frame update
    let line = editor.line_count().min(2);
    for ch in ['/', '/', ' ', 'o', 'k'] {
        let end = editor.line_max_column(line).unwrap_or(1);
        editor.insert_at(DocPos::new(line, end), &ch.to_string());
    }
    editor.dispatch(&mut sync);
    report("typing", &editor, &sync);

    editor.scroll_to(editor.content_height() / 2.0);
    editor.dispatch(&mut sync);
    report("scroll", &editor, &sync);

    sync.teardown();
    report("teardown", &editor, &sync);

    Ok(())
}

fn report(step: &str, editor: &HeadlessEditor, sync: &OverlaySynchronizer) {
    let annotations = editor.annotations();
    tracing::info!(
        "[{}] lines={} zones={} markers={} overlays={}",
        step,
        editor.line_count(),
        annotations.zone_count(),
        annotations.marker_count(),
        annotations.overlay_count()
    );

    match sync.bounding_box() {
        Some(rect) => {
            let viewport = editor.viewport();
            let origin = viewport.view_to_physical(ViewPos { x: rect.x, y: rect.y });
            tracing::info!(
                "[{}] box at ({:.1}, {:.1}) size {:.1}x{:.1} (physical origin {:.1}, {:.1})",
                step,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                origin.x,
                origin.y
            );
        }
        None => tracing::info!("[{}] box not placed", step),
    }
}
