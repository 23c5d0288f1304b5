//! Cut guides drawn at every grid-line intersection.
//!
//! The back page carries the front page's marks reflected across the sheet,
//! so after duplex printing both sides show the same crosses and can be cut
//! through together.

use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::layout::{Face, GridConfig, Point};
use crate::sink::DocumentSink;

/// Appearance of the registration crosses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkStyle {
    /// Length of each arm of the cross, end to end.
    pub size_mm: f32,
    pub line_width_pt: f32,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            size_mm: 2.0,
            line_width_pt: 0.3,
        }
    }
}

/// Grid-line intersections on `face`, column-major, including the outer corners.
pub fn mark_centers(grid: &GridConfig, face: Face) -> Vec<Point> {
    let left = grid.grid_left(face);
    let mut centers = Vec::with_capacity((grid.columns + 1) * (grid.rows + 1));
    for col in 0..=grid.columns {
        for row in 0..=grid.rows {
            centers.push(Point::new(
                left + col as f32 * grid.card_width_mm,
                grid.padding_mm + row as f32 * grid.card_height_mm,
            ));
        }
    }
    centers
}

/// Line segments making up the crosses: one horizontal and one vertical per center.
pub fn mark_segments(grid: &GridConfig, face: Face, style: &MarkStyle) -> Vec<(Point, Point)> {
    let half = style.size_mm / 2.0;
    mark_centers(grid, face)
        .into_iter()
        .flat_map(|c| {
            [
                (Point::new(c.x - half, c.y), Point::new(c.x + half, c.y)),
                (Point::new(c.x, c.y - half), Point::new(c.x, c.y + half)),
            ]
        })
        .collect()
}

/// Draw the registration crosses onto the current page of `sink`.
pub fn draw_registration_marks<S: DocumentSink>(
    sink: &mut S,
    grid: &GridConfig,
    face: Face,
    style: &MarkStyle,
) -> Result<(), SinkError> {
    for (from, to) in mark_segments(grid, face, style) {
        sink.draw_line(from, to, style.line_width_pt)?;
    }
    Ok(())
}
