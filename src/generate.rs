//! Turning a deck into a finished sheet document.

use tracing::{debug, info, warn};

use crate::config::SheetConfig;
use crate::deck::CardRecord;
use crate::encoder::CodeEncoder;
use crate::error::GenerateError;
use crate::faces::{BackFaceRenderer, FrontFaceRenderer};
use crate::layout::{Face, LayoutPlan, PagePlan};
use crate::marks::draw_registration_marks;
use crate::sink::DocumentSink;

/// Walks a [`LayoutPlan`] and issues draw calls to a sink, page by page.
///
/// Pages arrive in plan order: front then back for each group. Codes are
/// encoded one card at a time in index order so the sink sees a fixed
/// sequence of draws.
pub struct PageSequencer<'a, E: ?Sized> {
    config: &'a SheetConfig,
    front: FrontFaceRenderer<'a>,
    back: BackFaceRenderer<'a, E>,
}

impl<'a, E: CodeEncoder + ?Sized> PageSequencer<'a, E> {
    pub fn new(config: &'a SheetConfig, encoder: &'a E) -> Self {
        Self {
            config,
            front: FrontFaceRenderer::new(&config.front),
            back: BackFaceRenderer::new(encoder, &config.code, &config.back),
        }
    }

    pub async fn run<S: DocumentSink>(
        &self,
        deck: &[CardRecord],
        plan: &LayoutPlan,
        sink: &mut S,
    ) -> Result<(), GenerateError> {
        for page in plan.pages() {
            self.render_page(deck, page, sink).await?;
        }
        Ok(())
    }

    async fn render_page<S: DocumentSink>(
        &self,
        deck: &[CardRecord],
        page: &PagePlan,
        sink: &mut S,
    ) -> Result<(), GenerateError> {
        debug!(group = page.group, face = ?page.face, cards = page.cells.len(), "rendering page");
        sink.start_page()?;
        draw_registration_marks(sink, &self.config.grid, page.face, &self.config.marks)?;
        for cell in &page.cells {
            let card = &deck[cell.card_index];
            match page.face {
                Face::Front => self.front.render(sink, card, cell.rect)?,
                Face::Back => {
                    self.back
                        .render(sink, card, cell.card_index, cell.rect)
                        .await?
                }
            }
        }
        Ok(())
    }
}

/// Lay out `deck` and render it into `sink`, returning the sink's document.
///
/// The configuration and every record are checked before anything is drawn;
/// the first malformed record, encoding failure or sink failure aborts the
/// call and the partially drawn sink is dropped.
pub async fn generate<E, S>(
    deck: &[CardRecord],
    config: &SheetConfig,
    encoder: &E,
    mut sink: S,
) -> Result<S::Output, GenerateError>
where
    E: CodeEncoder + ?Sized,
    S: DocumentSink,
{
    config.validate()?;
    for (index, card) in deck.iter().enumerate() {
        card.validate()
            .map_err(|reason| GenerateError::MalformedRecord { index, reason })?;
    }

    let plan = LayoutPlan::build(deck.len(), &config.grid);
    if plan.is_empty() {
        warn!("deck is empty; no pages produced");
    }
    info!(
        cards = deck.len(),
        sheets = plan.group_count(),
        pages = plan.page_count(),
        "generating card sheets"
    );

    PageSequencer::new(config, encoder)
        .run(deck, &plan, &mut sink)
        .await?;
    let output = sink.finish()?;
    info!(pages = plan.page_count(), "card sheets complete");
    Ok(output)
}
