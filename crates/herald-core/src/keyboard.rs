//! Inline button layout: a compact text grammar parsed into a bounded grid.
//!
//! One row per line, `|` between buttons, `Label - url` per button.
//! At most 8 buttons per row and 15 rows; extras are silently dropped.

use crate::error::HeraldError;
use serde::{Deserialize, Serialize};

/// Segments beyond this count on a single line are discarded.
pub const MAX_BUTTONS_PER_ROW: usize = 8;
/// Lines beyond this count are discarded.
pub const MAX_ROWS: usize = 15;

/// A single labeled link button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub label: String,
    pub url: String,
}

/// Ordered rows of link buttons attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonGrid {
    pub rows: Vec<Vec<ButtonSpec>>,
}

impl ButtonGrid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the grid back to the input grammar with canonical spacing.
    ///
    /// `parse_buttons(grid.render())` reproduces the same grid.
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| format!("{} - {}", b.label, b.url))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A callback button for discrete choices (the publish/cancel prompt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceButton {
    pub label: String,
    pub data: String,
}

/// Parse the button-grid grammar into a bounded grid.
///
/// Blank and whitespace-only lines are skipped. A line with more than
/// [`MAX_BUTTONS_PER_ROW`] segments keeps the first 8; input with more than
/// [`MAX_ROWS`] usable lines keeps the first 15 rows. Neither overflow is an
/// error. A segment without the ` - ` separator, or with an empty label or
/// url after trimming, is a recoverable [`HeraldError::ButtonParse`].
pub fn parse_buttons(raw: &str) -> Result<ButtonGrid, HeraldError> {
    let mut rows = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let mut row = Vec::new();
        for part in line.split('|').take(MAX_BUTTONS_PER_ROW) {
            let (label, url) = part
                .split_once(" - ")
                .ok_or_else(|| HeraldError::ButtonParse(line.trim().to_string()))?;
            let (label, url) = (label.trim(), url.trim());
            if label.is_empty() || url.is_empty() {
                return Err(HeraldError::ButtonParse(line.trim().to_string()));
            }
            row.push(ButtonSpec {
                label: label.to_string(),
                url: url.to_string(),
            });
        }

        rows.push(row);
        if rows.len() >= MAX_ROWS {
            break;
        }
    }

    Ok(ButtonGrid { rows })
}
