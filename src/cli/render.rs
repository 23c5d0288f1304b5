//! Rendering commands (`qrdeck render ...`).

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use qrdeck::{Face, LayoutPlan, generate_pdf, generate_png};

use crate::cli::common::LayoutArgs;
use crate::cli::utils::{load_config, load_deck, write_output};

/// Available render subcommands.
#[derive(Subcommand, Debug)]
pub enum RenderCommand {
    /// Write the printable duplex PDF.
    Pdf(RenderPdfArgs),
    /// Write one PNG preview per page.
    Png(RenderPngArgs),
    /// Print where every card lands on every page.
    Plan(RenderPlanArgs),
}

/// Args for `qrdeck render pdf`.
#[derive(Args, Debug)]
pub struct RenderPdfArgs {
    /// Deck file to render.
    pub deck: PathBuf,
    /// Output PDF (defaults to the configured file name).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Args for `qrdeck render png`.
#[derive(Args, Debug)]
pub struct RenderPngArgs {
    /// Deck file to render.
    pub deck: PathBuf,
    /// Output directory for page PNGs.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Dots per inch used when rasterising.
    #[arg(long, default_value_t = 150)]
    pub dpi: u32,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Args for `qrdeck render plan`.
#[derive(Args, Debug)]
pub struct RenderPlanArgs {
    /// Deck file to lay out.
    pub deck: PathBuf,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Execute a render command.
pub async fn handle(command: RenderCommand) -> Result<()> {
    match command {
        RenderCommand::Pdf(args) => pdf(args).await,
        RenderCommand::Png(args) => png(args).await,
        RenderCommand::Plan(args) => plan(args),
    }
}

async fn pdf(args: RenderPdfArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let config = load_config(&args.layout)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.file_name));

    let document = generate_pdf(&deck.cards, &config)
        .await
        .with_context(|| format!("failed to render {}", args.deck.display()))?;
    if document.is_empty() {
        return Err(anyhow!("deck {} has no cards to print", args.deck.display()));
    }
    document
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Rendered {} card(s) on {} page(s) to {}",
        deck.cards.len(),
        document.page_count,
        output.display()
    );
    Ok(())
}

async fn png(args: RenderPngArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let config = load_config(&args.layout)?;
    let document = generate_png(&deck.cards, &config, args.dpi)
        .await
        .with_context(|| format!("failed to render {}", args.deck.display()))?;
    let written = document
        .save_pngs(&args.output)
        .with_context(|| format!("failed to write pages to {}", args.output.display()))?;
    println!(
        "Rendered {} page image(s) to {} at {} DPI",
        written.len(),
        args.output.display(),
        document.dpi
    );
    Ok(())
}

fn plan(args: RenderPlanArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let config = load_config(&args.layout)?;
    let plan = LayoutPlan::build(deck.cards.len(), &config.grid);

    let mut output = String::new();
    for (page_no, page) in plan.pages().iter().enumerate() {
        let face = match page.face {
            Face::Front => "front",
            Face::Back => "back",
        };
        writeln!(output, "Page {:>3} | sheet {} | {}", page_no + 1, page.group + 1, face)?;
        for cell in &page.cells {
            let card = &deck.cards[cell.card_index];
            writeln!(
                output,
                "  card {:>4} -> row {} col {} at ({:.1}, {:.1}) mm | {} - {}",
                cell.card_index + 1,
                cell.position.row,
                cell.position.col,
                cell.rect.x,
                cell.rect.y,
                card.artist,
                card.song_name
            )?;
        }
    }
    match args.output {
        Some(path) => {
            write_output(&path, &output)?;
            println!("Wrote layout plan for {} to {}", args.deck.display(), path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}
