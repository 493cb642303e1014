//! Distance matrix as returned by a routing provider.
//!
//! The shape mirrors the Google Distance Matrix JSON response so it can be
//! deserialized directly; cells keep their own reachability status.

use serde::{Deserialize, Serialize};

use crate::traits::{Leg, LegText, TravelCosts};

/// Overall status value that marks a usable matrix.
pub const STATUS_OK: &str = "OK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    pub status: String,
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub elements: Vec<MatrixCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub status: CellStatus,
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellStatus {
    Ok,
    NotFound,
    ZeroResults,
    MaxRouteLengthExceeded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

impl MatrixCell {
    pub fn reachable(distance_m: u32, duration_s: u32) -> Self {
        let leg = Leg {
            distance_m,
            duration_s: Some(duration_s),
        };
        let text = LegText::from(leg);
        Self {
            status: CellStatus::Ok,
            distance: text.distance.map(|text| TextValue {
                text,
                value: u64::from(distance_m),
            }),
            duration: text.duration.map(|text| TextValue {
                text,
                value: u64::from(duration_s),
            }),
        }
    }

    pub fn unreachable(status: CellStatus) -> Self {
        Self {
            status,
            distance: None,
            duration: None,
        }
    }

    /// The leg this cell describes, if the provider routed it.
    pub fn leg(&self) -> Option<Leg> {
        if self.status != CellStatus::Ok {
            return None;
        }
        let distance_m = u32::try_from(self.distance.as_ref()?.value).ok()?;
        let duration_s = self
            .duration
            .as_ref()
            .and_then(|duration| u32::try_from(duration.value).ok());
        Some(Leg {
            distance_m,
            duration_s,
        })
    }
}

impl DistanceMatrix {
    /// Builds an OK matrix of `size` x `size` cells from a cell function.
    pub fn from_fn(size: usize, mut cell: impl FnMut(usize, usize) -> MatrixCell) -> Self {
        let rows = (0..size)
            .map(|from| MatrixRow {
                elements: (0..size).map(|to| cell(from, to)).collect(),
            })
            .collect();
        Self {
            status: STATUS_OK.to_string(),
            origin_addresses: Vec::new(),
            destination_addresses: Vec::new(),
            rows,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn cell(&self, from: usize, to: usize) -> Option<&MatrixCell> {
        self.rows.get(from)?.elements.get(to)
    }
}

impl TravelCosts for DistanceMatrix {
    fn dimension(&self) -> usize {
        let columns = self
            .rows
            .iter()
            .map(|row| row.elements.len())
            .min()
            .unwrap_or(0);
        self.rows.len().min(columns)
    }

    fn leg(&self, from: usize, to: usize) -> Option<Leg> {
        self.cell(from, to)?.leg()
    }

    fn leg_text(&self, from: usize, to: usize) -> LegText {
        match self.cell(from, to) {
            Some(cell) if cell.status == CellStatus::Ok => LegText {
                distance: cell.distance.as_ref().map(|d| d.text.clone()),
                duration: cell.duration.as_ref().map(|d| d.text.clone()),
            },
            _ => LegText::default(),
        }
    }
}
