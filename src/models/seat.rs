use serde::Serialize;

pub const ROWS: usize = 8;
pub const COLS: usize = 10;
pub const ROW_LABELS: [char; ROWS] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Auditorium grid. Seat ids are `{row label}{column}` with 1-based columns,
/// e.g. `A1` .. `H10`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLayout {
    pub rows: usize,
    pub cols: usize,
    pub row_labels: Vec<char>,
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl SeatLayout {
    pub fn standard() -> Self {
        SeatLayout {
            rows: ROWS,
            cols: COLS,
            row_labels: ROW_LABELS.to_vec(),
        }
    }

    /// All seat ids, row by row.
    pub fn seat_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.capacity());
        for label in self.row_labels.iter().take(self.rows) {
            ids.extend((1..=self.cols).map(|col| format!("{label}{col}")));
        }
        ids
    }

    /// Row-major index of `seat_id`, or `None` if it is not part of the grid.
    pub fn position(&self, seat_id: &str) -> Option<usize> {
        let mut chars = seat_id.chars();
        let label = chars.next()?;
        let number = chars.as_str();
        // Reject "A01", "A+1" and similar spellings of a valid column.
        if number.is_empty()
            || number.starts_with('0')
            || !number.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let col: usize = number.parse().ok()?;
        let row = self
            .row_labels
            .iter()
            .take(self.rows)
            .position(|l| *l == label)?;
        (1..=self.cols)
            .contains(&col)
            .then(|| row * self.cols + (col - 1))
    }

    pub fn contains(&self, seat_id: &str) -> bool {
        self.position(seat_id).is_some()
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Orders seat ids by grid position; ids outside the grid go last,
    /// sorted lexicographically.
    pub fn sort_seats(&self, seats: &mut [String]) {
        seats.sort_by(|a, b| {
            let key_a = (self.position(a).unwrap_or(usize::MAX), a);
            let key_b = (self.position(b).unwrap_or(usize::MAX), b);
            key_a.cmp(&key_b)
        });
    }
}

/// Splits the stored comma-joined seat list.
pub fn split_seats(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn join_seats(seats: &[String]) -> String {
    seats.join(",")
}
