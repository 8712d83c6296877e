//! The visual surface a page shows while it is active.

use crate::SLOTS;
use crate::key::KeySettings;

/// Columns of the key label grid.
pub const GRID_COLUMNS: usize = 3;
/// Rows of the key label grid.
pub const GRID_ROWS: usize = SLOTS / GRID_COLUMNS;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Surface {
    pub title: Option<String>,
    /// Key labels by slot, laid out 3 wide and 4 high.
    pub grid: Option<[String; SLOTS]>,
    /// A large centred label.
    pub label: Option<String>,
}

impl Surface {
    pub fn titled(title: Option<&str>) -> Self {
        Surface {
            title: title.map(str::to_string),
            ..Default::default()
        }
    }

    /// The key label grid of `keys`.
    pub fn grid_of(keys: &[KeySettings; SLOTS]) -> [String; SLOTS] {
        std::array::from_fn(|slot| keys[slot].name.clone())
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.grid.is_none() && self.label.is_none()
    }

    /// Lays the surface out as `rows` lines of exactly `columns` characters.
    ///
    /// The title takes the first line, then the grid rows follow with one cell per
    /// third of the width, then the label. Whatever does not fit is cut off.
    pub fn to_lines(&self, columns: usize, rows: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows);

        if let Some(title) = &self.title {
            lines.push(center(title, columns));
        }

        if let Some(grid) = &self.grid {
            let cell = columns / GRID_COLUMNS;
            for row in grid.chunks(GRID_COLUMNS) {
                let mut line: String = row.iter().map(|name| center(name, cell)).collect();
                line.push_str(&" ".repeat(columns - cell * GRID_COLUMNS));
                lines.push(line);
            }
        }

        if let Some(label) = &self.label {
            lines.push(center(label, columns));
        }

        lines.truncate(rows);
        lines.resize(rows, " ".repeat(columns));
        lines
    }
}

/// Centres `text` in `width` characters, cutting it if it is too long.
fn center(text: &str, width: usize) -> String {
    let text: String = text.chars().take(width).collect();
    let len = text.chars().count();
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
