use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use textveil::{
    EditorSession, ExportFormat, ExportOpts, FrameOutcome, FsImageFetcher, FsStorage,
    SessionManifest, StaticGate,
};

#[derive(Parser, Debug)]
#[command(name = "textveil", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the session described by a manifest as PNG or JPEG.
    Export(ExportArgs),
    /// Print the frame layout (canvas, layer rects, text node) as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Session manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Override the manifest's output format (`png` or `jpeg`).
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Override the manifest's JPEG quality, in [0.1, 1].
    #[arg(long)]
    quality: Option<f64>,

    /// Override the manifest's export scale.
    #[arg(long)]
    scale: Option<f64>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Session manifest JSON.
    #[arg(long)]
    manifest: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn open_session(manifest_path: &Path) -> anyhow::Result<(SessionManifest, EditorSession, PathBuf)> {
    let manifest = SessionManifest::from_path(manifest_path)?;
    let root = manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut session = EditorSession::from_manifest(&manifest, &root, StaticGate::allow_all())?;
    let settled = session.resolve_layers(&FsImageFetcher::new(&root));
    tracing::debug!(settled, "resolved layers");

    let style = session.current().clone();
    if !style.normalized_text().is_empty() {
        session.compositor_mut().fonts_mut().ensure_ready(&style)?;
    }
    Ok((manifest, session, root))
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let (manifest, mut session, root) = open_session(&args.manifest)?;

    let mut opts = manifest.export.clone();
    if let Some(format) = args.format {
        opts.format = format;
    }
    if let Some(quality) = args.quality {
        opts.quality = quality;
    }
    if let Some(scale) = args.scale {
        opts.scale = scale;
    }
    if let Some(stem) = args.out.file_stem() {
        opts.file_name = stem.to_string_lossy().into_owned();
    }

    let out = session.export(&FsStorage::new(&root), &opts)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &out.image.bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    for notice in &out.notices {
        eprintln!("note: {}", notice.message());
    }
    let summary = serde_json::json!({
        "out": args.out,
        "file_name": out.image.file_name,
        "mime": out.image.mime,
        "width": out.image.width,
        "height": out.image.height,
        "degraded": out.degraded,
        "notices": out.notices,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let (_, mut session, _) = open_session(&args.manifest)?;
    let frame = match session.render()? {
        FrameOutcome::Rendered(frame) => frame,
        FrameOutcome::Loading(pending) => {
            anyhow::bail!("layers still loading: {pending:?}");
        }
    };
    let summary = serde_json::json!({
        "layout": frame.layout,
        "fingerprint": frame.fingerprint.to_string(),
        "fonts_ready": frame.fonts_ready,
        "notices": frame.notices,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
