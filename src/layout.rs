//! Sheet geometry: chunking a deck into page groups and mapping each card to
//! a grid cell on the front and back faces.
//!
//! Everything here is pure. [`LayoutPlan::build`] turns a deck length and a
//! [`GridConfig`] into an immutable list of pages and cells; rendering walks
//! that plan afterwards and never recomputes positions.
//!
//! Coordinates are millimetres measured from the top-left corner of the page.

use serde::{Deserialize, Serialize};

/// Default number of cards across a sheet.
pub const CARDS_PER_ROW: usize = 3;
/// Default number of cards down a sheet.
pub const CARDS_PER_COLUMN: usize = 4;
/// Default number of cards on one sheet.
pub const CARDS_PER_PAGE: usize = CARDS_PER_ROW * CARDS_PER_COLUMN;

/// Which side of the sheet a page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Artist, year and title.
    Front,
    /// Scannable code.
    Back,
}

/// Zero-based cell coordinates inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

/// A point on the page in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Mirror image across the vertical centre line of a page `page_width` wide.
    pub fn flipped(&self, page_width: f32) -> Point {
        Point::new(page_width - self.x, self.y)
    }
}

/// Axis-aligned rectangle in millimetres; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Mirror image across the vertical centre line of a page `page_width` wide.
    ///
    /// This is where a rectangle lands on the other side of a sheet flipped
    /// over its long edge.
    pub fn flipped(&self, page_width: f32) -> Rect {
        Rect::new(page_width - self.right(), self.y, self.width, self.height)
    }

    /// Square of side `size` centered inside this rectangle.
    pub fn centered_square(&self, size: f32) -> Rect {
        Rect::new(
            self.x + (self.width - size) / 2.0,
            self.y + (self.height - size) / 2.0,
            size,
            size,
        )
    }
}

/// Page and grid dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    /// Distance from the top page edge, and from the left edge on the front
    /// face, to the first grid line. The back face takes it from the right.
    pub padding_mm: f32,
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridConfig {
    // A4 with 62mm square cards: (210 - 3 * 62) / 2 leaves 12mm on each side.
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            card_width_mm: 62.0,
            card_height_mm: 62.0,
            padding_mm: 12.0,
            columns: CARDS_PER_ROW,
            rows: CARDS_PER_COLUMN,
        }
    }
}

impl GridConfig {
    pub fn cards_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// X coordinate of the leftmost grid line on the given face.
    ///
    /// The back grid is the front grid reflected across the page, so the two
    /// coincide after a long-edge flip even when the padding leaves the grid
    /// off-centre.
    pub fn grid_left(&self, face: Face) -> f32 {
        match face {
            Face::Front => self.padding_mm,
            Face::Back => {
                self.page_width_mm - self.padding_mm - self.columns as f32 * self.card_width_mm
            }
        }
    }

    /// Rectangle covered by the cell at `pos` on the given face.
    pub fn cell_rect(&self, face: Face, pos: GridPosition) -> Rect {
        Rect::new(
            self.grid_left(face) + pos.col as f32 * self.card_width_mm,
            self.padding_mm + pos.row as f32 * self.card_height_mm,
            self.card_width_mm,
            self.card_height_mm,
        )
    }

    /// Rectangle spanned by the whole grid on the given face.
    pub fn grid_rect(&self, face: Face) -> Rect {
        Rect::new(
            self.grid_left(face),
            self.padding_mm,
            self.columns as f32 * self.card_width_mm,
            self.rows as f32 * self.card_height_mm,
        )
    }

    /// Position of the card at `local_index` on the given face.
    pub fn position(&self, face: Face, local_index: usize) -> GridPosition {
        match face {
            Face::Front => front_position(local_index, self.columns),
            Face::Back => back_position(local_index, self.columns),
        }
    }
}

/// Split `items` into consecutive groups of at most `size` elements.
///
/// Group `k` holds `items[k * size..min((k + 1) * size, len)]`; only the last
/// group may be short and none is ever empty.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).collect()
}

/// Number of page groups needed for `len` cards.
pub fn group_count(len: usize, size: usize) -> usize {
    if size == 0 { 0 } else { len.div_ceil(size) }
}

/// Front-face cell for a card: filled row by row, left to right.
pub fn front_position(local_index: usize, columns: usize) -> GridPosition {
    GridPosition {
        row: local_index / columns,
        col: local_index % columns,
    }
}

/// Back-face cell for a card.
///
/// Sheets are flipped over their long (vertical) edge for duplex printing,
/// which mirrors every row left to right. The back of the card in column
/// `c` therefore lands in column `columns - 1 - c` of the same row; card
/// order within the group is unchanged.
pub fn back_position(local_index: usize, columns: usize) -> GridPosition {
    mirror(front_position(local_index, columns), columns)
}

/// Mirror a position across the vertical axis of the grid.
pub fn mirror(pos: GridPosition, columns: usize) -> GridPosition {
    GridPosition {
        row: pos.row,
        col: columns - 1 - pos.col,
    }
}

/// One card placed on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCell {
    /// Index into the whole deck.
    pub card_index: usize,
    /// Index inside the page group.
    pub local_index: usize,
    pub position: GridPosition,
    pub rect: Rect,
}

/// A single document page and the cards it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub group: usize,
    pub face: Face,
    pub cells: Vec<PlannedCell>,
}

/// Every page of a document in output order: front then back per group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPlan {
    pages: Vec<PagePlan>,
}

impl LayoutPlan {
    pub fn build(deck_len: usize, grid: &GridConfig) -> Self {
        let indices: Vec<usize> = (0..deck_len).collect();
        let mut pages = Vec::with_capacity(group_count(deck_len, grid.cards_per_page()) * 2);
        for (group, members) in chunk(&indices, grid.cards_per_page()).into_iter().enumerate() {
            for face in [Face::Front, Face::Back] {
                let cells = members
                    .iter()
                    .enumerate()
                    .map(|(local_index, &card_index)| {
                        let position = grid.position(face, local_index);
                        PlannedCell {
                            card_index,
                            local_index,
                            position,
                            rect: grid.cell_rect(face, position),
                        }
                    })
                    .collect();
                pages.push(PagePlan { group, face, cells });
            }
        }
        Self { pages }
    }

    pub fn pages(&self) -> &[PagePlan] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn group_count(&self) -> usize {
        self.pages.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Flattened `(face, card_index, rect)` entries in page order.
    pub fn entries(&self) -> impl Iterator<Item = (Face, usize, Rect)> + '_ {
        self.pages.iter().flat_map(|page| {
            page.cells
                .iter()
                .map(move |cell| (page.face, cell.card_index, cell.rect))
        })
    }

    /// Locate the cell of `card_index` on the given face.
    pub fn find(&self, face: Face, card_index: usize) -> Option<&PlannedCell> {
        self.pages
            .iter()
            .filter(|page| page.face == face)
            .flat_map(|page| page.cells.iter())
            .find(|cell| cell.card_index == card_index)
    }
}
