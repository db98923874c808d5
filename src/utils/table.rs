/// Column alignment inside a rendered table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Right,
}

/// A simple text-based table generator for Discord messages using code blocks
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    aligns: Vec<Align>,
}

impl Table {
    /// Create a new table with the given headers, all columns left aligned
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let aligns = vec![Align::Left; headers.len()];
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
            col_widths,
            aligns,
        }
    }

    /// Set the alignment of one column
    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.aligns.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<String>) {
        // Widen columns to fit the new cells
        for (i, col) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(col.chars().count());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a code block for Discord
    pub fn render(&self) -> String {
        let mut output = String::from("```\n");

        // Add header
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');

        // Add separator
        output.push_str(&self.render_separator());
        output.push('\n');

        // Add rows
        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }

        output.push_str("```");
        output
    }

    /// Pad each cell to its column width and alignment
    fn render_row(&self, row: &[String]) -> String {
        let mut cells = Vec::with_capacity(row.len());
        for (i, col) in row.iter().enumerate().take(self.col_widths.len()) {
            let width = self.col_widths[i];
            let cell = match self.aligns[i] {
                Align::Left => format!("{:<width$}", col, width = width),
                Align::Right => format!("{:>width$}", col, width = width),
            };
            cells.push(cell);
        }
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(vec!["#", "Coin", "Price"]).align(2, Align::Right);
        table.add_row(vec!["1".to_string(), "Bitcoin".to_string(), "$65,000.00".to_string()]);
        table.add_row(vec!["2".to_string(), "Ethereum".to_string(), "$3,200.00".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "```");
        assert_eq!(lines[1], "# | Coin     |      Price");
        assert_eq!(lines[2], "--+----------+-----------");
        assert_eq!(lines[3], "1 | Bitcoin  | $65,000.00");
        assert_eq!(lines[4], "2 | Ethereum |  $3,200.00");
        assert_eq!(lines[5], "```");
    }
}
