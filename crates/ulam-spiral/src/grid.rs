//! Text-grid rendering of the spiral.
//!
//! A [`Viewport`] is the inclusive bounding box to draw. [`render_grid`]
//! walks it row-major from the top (max `y`) down, left to right, and emits
//! one glyph per cell.

use std::collections::BTreeSet;

use ulam_types::Coordinate;

/// Half-width of the viewport used when there is nothing to frame yet.
pub const DEFAULT_RADIUS: i64 = 5;

/// Characters used to draw each kind of cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    /// The spiral center.
    pub origin: char,
    /// A cell holding a prime marker.
    pub filled: char,
    /// Any other cell.
    pub blank: char,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            origin: '1',
            filled: '\u{2588}',
            blank: ' ',
        }
    }
}

/// Inclusive bounding box over spiral coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Leftmost column.
    pub min_x: i64,
    /// Rightmost column.
    pub max_x: i64,
    /// Bottom row.
    pub min_y: i64,
    /// Top row.
    pub max_y: i64,
}

impl Viewport {
    /// A square of half-width `radius` centered on the origin.
    pub const fn centered(radius: i64) -> Self {
        let radius = radius.saturating_abs();
        Self {
            min_x: radius.saturating_neg(),
            max_x: radius,
            min_y: radius.saturating_neg(),
            max_y: radius,
        }
    }

    /// Frame `coords` with one cell of padding on every side.
    ///
    /// Falls back to [`Viewport::centered`] with `default_radius` when
    /// `coords` is empty.
    pub fn around<I>(coords: I, default_radius: i64) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut bounds: Option<Self> = None;
        for c in coords {
            bounds = Some(match bounds {
                None => Self {
                    min_x: c.x,
                    max_x: c.x,
                    min_y: c.y,
                    max_y: c.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(c.x),
                    max_x: b.max_x.max(c.x),
                    min_y: b.min_y.min(c.y),
                    max_y: b.max_y.max(c.y),
                },
            });
        }

        bounds.map_or_else(
            || Self::centered(default_radius),
            |b| Self {
                min_x: b.min_x.saturating_sub(1),
                max_x: b.max_x.saturating_add(1),
                min_y: b.min_y.saturating_sub(1),
                max_y: b.max_y.saturating_add(1),
            },
        )
    }

    /// Number of columns.
    pub const fn width(&self) -> u64 {
        self.max_x.abs_diff(self.min_x).saturating_add(1)
    }

    /// Number of rows.
    pub const fn height(&self) -> u64 {
        self.max_y.abs_diff(self.min_y).saturating_add(1)
    }

    /// Whether `c` falls inside the box.
    pub const fn contains(&self, c: Coordinate) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }
}

/// Render `viewport` as text, one line per row, without a trailing newline.
///
/// The origin always draws as [`Glyphs::origin`], even when a marker sits
/// there. Markers outside the viewport are ignored.
pub fn render_grid(
    viewport: &Viewport,
    occupied: &BTreeSet<Coordinate>,
    glyphs: &Glyphs,
) -> String {
    let rows: Vec<String> = (viewport.min_y..=viewport.max_y)
        .rev()
        .map(|y| {
            (viewport.min_x..=viewport.max_x)
                .map(|x| {
                    let cell = Coordinate::new(x, y);
                    if cell.is_origin() {
                        glyphs.origin
                    } else if occupied.contains(&cell) {
                        glyphs.filled
                    } else {
                        glyphs.blank
                    }
                })
                .collect()
        })
        .collect();
    rows.join("\n")
}
