use crate::{
    error::ReportError,
    pdf::{BuiltinFont, PdfDocument},
    transaction::TransactionRecord,
};

// The geometry of the report, in PDF user units on letter-sized pages. The
// first baseline sits 42 units below the top edge of the page.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const LEFT_MARGIN: f32 = 40.0;
const TOP_BASELINE: f32 = 750.0;
const BOTTOM_MARGIN: f32 = 50.0;
const SUMMARY_LEADING: f32 = 14.5;
const TABLE_TOP: f32 = 520.0;
const ROW_HEIGHT: f32 = 20.0;
const CELL_TEXT_INSET: f32 = 5.0;
const CELL_BASELINE_DROP: f32 = 15.0;

const HEADER_BACKGROUND: [f32; 3] = [0.2, 0.4, 0.6];
const SHADED_ROW_BACKGROUND: [f32; 3] = [0.95, 0.95, 0.95];
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];

const DOCUMENT_TITLE: &str = "Financial Transactions Report";
const DOCUMENT_SUBTITLE: &str = "General summary of recorded movements";
const INCOMES_HEADING: &str = "New Incomes";
const SELF_TRANSFERS_HEADING: &str = "Self-Transfers";

/// One column of a table grid: the label shown in the header row and the width
/// the column occupies, in user units.
#[derive(Debug, Clone)]
pub struct Column {
    pub label: String,
    pub width: f32,
}

impl Column {
    pub fn new<S: Into<String>>(label: S, width: f32) -> Column {
        Column {
            label: label.into(),
            width,
        }
    }
}

/// An ordered sequence of labelled columns defining a table grid. Constructing
/// the grid validates it, so a grid that exists can always be drawn: every
/// width is positive and the columns fit between the page margins.
#[derive(Debug, Clone)]
pub struct ColumnGrid {
    columns: Vec<Column>,
}

impl ColumnGrid {
    pub fn new(columns: Vec<Column>) -> Result<ColumnGrid, ReportError> {
        for column in &columns {
            if column.width <= 0.0 {
                return Err(ReportError::with_context(format!(
                    "The column {:?} must have a positive width, got {}",
                    column.label, column.width
                )));
            }
        }
        let total_width: f32 = columns.iter().map(|column| column.width).sum();
        let usable_width = PAGE_WIDTH - 2.0 * LEFT_MARGIN;
        if total_width > usable_width {
            return Err(ReportError::with_context(format!(
                "The columns span {} units, which exceeds the {} units available between the page margins",
                total_width, usable_width
            )));
        }

        Ok(ColumnGrid { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|column| column.width).sum()
    }
}

/// The grid of the transaction history table.
fn history_grid() -> Result<ColumnGrid, ReportError> {
    ColumnGrid::new(vec![
        Column::new("Date", 90.0),
        Column::new("Source", 120.0),
        Column::new("Destination", 120.0),
        Column::new("Amount", 80.0),
        Column::new("Category", 120.0),
    ])
}

/// Where the next element lands: the page it goes on and the vertical offset on
/// that page. Within each flow the offset only ever decreases; crossing the
/// bottom margin opens a fresh page and resets it to the top, and the table
/// flow re-anchors it at the fixed table origin. Every render call owns its own
/// cursor, so concurrent renders never share state.
#[derive(Debug, Clone, Copy)]
struct PageCursor {
    page: usize,
    y: f32,
}

/// The font indices the report draws with, registered once per document.
struct ReportFonts {
    regular: usize,
    bold: usize,
    oblique: usize,
}

/// Renders the report for the given records: a summary text flow listing the
/// incomes and the self-transfers, followed by the full transaction history as
/// a paginated table. `incomes` and `self_transfers` are expected to be the
/// partition of `all_transactions` produced by the classifier; the username is
/// embedded verbatim in the identity line. Returns the bytes of the finished
/// PDF document, or the first error raised by the page stream encoder, in
/// which case no partial document is produced.
pub fn render(
    incomes: &[TransactionRecord],
    self_transfers: &[TransactionRecord],
    all_transactions: &[TransactionRecord],
    username: &str,
) -> Result<Vec<u8>, ReportError> {
    let grid = history_grid()?;
    let mut document = PdfDocument::new(DOCUMENT_TITLE.to_string());
    let fonts = ReportFonts {
        regular: document.add_builtin_font(BuiltinFont::Helvetica),
        bold: document.add_builtin_font(BuiltinFont::HelveticaBold),
        oblique: document.add_builtin_font(BuiltinFont::HelveticaOblique),
    };
    let mut cursor = PageCursor {
        page: document.add_page(PAGE_WIDTH, PAGE_HEIGHT),
        y: TOP_BASELINE,
    };

    write_summary(
        &mut document,
        &mut cursor,
        &fonts,
        incomes,
        self_transfers,
        username,
    )?;
    draw_history_table(&mut document, &mut cursor, &fonts, &grid, all_transactions)?;

    let report_bytes = document.save_to_bytes()?;
    log::debug!(
        "Rendered {} records onto {} pages ({} bytes)",
        all_transactions.len(),
        cursor.page + 1,
        report_bytes.len()
    );

    Ok(report_bytes)
}

/// Writes the summary above the table: the identity line, the title and
/// subtitle, then the two filtered listings under their headings.
fn write_summary(
    document: &mut PdfDocument,
    cursor: &mut PageCursor,
    fonts: &ReportFonts,
    incomes: &[TransactionRecord],
    self_transfers: &[TransactionRecord],
    username: &str,
) -> Result<(), ReportError> {
    let identity_line = format!("Authenticated user: {} - access granted", username);

    let mut flow = TextFlow::begin(document, cursor)?;
    flow.line(fonts.oblique, 10.0, &identity_line)?;
    flow.blank_line()?;
    flow.line(fonts.bold, 16.0, DOCUMENT_TITLE)?;
    flow.blank_line()?;
    flow.line(fonts.regular, 12.0, DOCUMENT_SUBTITLE)?;
    flow.blank_line()?;

    flow.line(fonts.bold, 14.0, INCOMES_HEADING)?;
    for record in incomes {
        flow.line(fonts.regular, 12.0, &record.summary_line())?;
    }
    flow.blank_line()?;

    flow.line(fonts.bold, 14.0, SELF_TRANSFERS_HEADING)?;
    for record in self_transfers {
        flow.line(fonts.regular, 12.0, &record.summary_line())?;
    }
    flow.finish()
}

/// Line-oriented text writer with the same page-break contract as the table:
/// the baseline drops by the fixed leading after every line, and a line that
/// would land below the bottom margin moves to the top of a fresh page instead.
struct TextFlow<'a> {
    document: &'a mut PdfDocument,
    cursor: &'a mut PageCursor,
    current_font: Option<(usize, f32)>,
}

impl<'a> TextFlow<'a> {
    fn begin(
        document: &'a mut PdfDocument,
        cursor: &'a mut PageCursor,
    ) -> Result<TextFlow<'a>, ReportError> {
        open_text_object(document, cursor)?;
        Ok(TextFlow {
            document,
            cursor,
            current_font: None,
        })
    }

    fn line(&mut self, font_index: usize, font_size: f32, text: &str) -> Result<(), ReportError> {
        self.break_page_if_needed()?;
        if self.current_font != Some((font_index, font_size)) {
            self.document
                .set_font(self.cursor.page, font_index, font_size)?;
            self.current_font = Some((font_index, font_size));
        }
        self.document.show_text(self.cursor.page, text)?;
        self.advance()
    }

    fn blank_line(&mut self) -> Result<(), ReportError> {
        self.break_page_if_needed()?;
        self.advance()
    }

    fn finish(self) -> Result<(), ReportError> {
        self.document.end_text(self.cursor.page)
    }

    fn advance(&mut self) -> Result<(), ReportError> {
        self.document.next_line(self.cursor.page)?;
        self.cursor.y -= SUMMARY_LEADING;
        Ok(())
    }

    /// The baseline has already been advanced past the last written line, so it
    /// is checked before writing rather than after: a trailing line never opens
    /// a page that would stay empty.
    fn break_page_if_needed(&mut self) -> Result<(), ReportError> {
        if self.cursor.y >= BOTTOM_MARGIN {
            return Ok(());
        }
        self.document.end_text(self.cursor.page)?;
        self.cursor.page = self.document.add_page(PAGE_WIDTH, PAGE_HEIGHT);
        self.cursor.y = TOP_BASELINE;
        open_text_object(self.document, self.cursor)?;
        if let Some((font_index, font_size)) = self.current_font {
            self.document
                .set_font(self.cursor.page, font_index, font_size)?;
        }
        Ok(())
    }
}

fn open_text_object(document: &mut PdfDocument, cursor: &PageCursor) -> Result<(), ReportError> {
    document.begin_text(cursor.page)?;
    document.set_text_leading(cursor.page, SUMMARY_LEADING)?;
    document.set_text_position(cursor.page, LEFT_MARGIN, cursor.y)
}

/// Draws the transaction history table: the header row once, then one data row
/// per record in their original order, shading every other row and breaking to
/// a new page whenever the next row would cross the bottom margin. The shading
/// alternation follows the global row index, so it is not reset by page breaks.
fn draw_history_table(
    document: &mut PdfDocument,
    cursor: &mut PageCursor,
    fonts: &ReportFonts,
    grid: &ColumnGrid,
    records: &[TransactionRecord],
) -> Result<(), ReportError> {
    // The table starts at its fixed offset on the page the summary ended on.
    // A summary long enough to run past that offset overlaps the first rows;
    // the listings are expected to stay well above it.
    cursor.y = TABLE_TOP;

    draw_header_row(document, cursor.page, grid, cursor.y, fonts)?;
    cursor.y -= ROW_HEIGHT;

    for (row_index, record) in records.iter().enumerate() {
        if row_index % 2 == 1 {
            // The background is filled before the grid lines and the text are
            // drawn, so neither is ever obscured by it.
            document.set_fill_color(cursor.page, SHADED_ROW_BACKGROUND)?;
            document.fill_rect(
                cursor.page,
                LEFT_MARGIN,
                cursor.y - ROW_HEIGHT,
                grid.total_width(),
                ROW_HEIGHT,
            )?;
            document.set_fill_color(cursor.page, BLACK)?;
        }

        let cells = [
            record.date.to_string(),
            record.account_from.clone(),
            record.account_to.clone(),
            format!("${}", record.amount),
            record.category().to_string(),
        ];
        draw_row(document, cursor.page, grid, cursor.y, fonts.regular, 11.0, &cells)?;

        cursor.y -= ROW_HEIGHT;
        if row_index + 1 < records.len() && cursor.y < BOTTOM_MARGIN {
            cursor.page = document.add_page(PAGE_WIDTH, PAGE_HEIGHT);
            cursor.y = TOP_BASELINE;
        }
    }

    Ok(())
}

fn draw_header_row(
    document: &mut PdfDocument,
    page: usize,
    grid: &ColumnGrid,
    y: f32,
    fonts: &ReportFonts,
) -> Result<(), ReportError> {
    document.set_fill_color(page, HEADER_BACKGROUND)?;
    document.fill_rect(page, LEFT_MARGIN, y - ROW_HEIGHT, grid.total_width(), ROW_HEIGHT)?;
    document.set_fill_color(page, BLACK)?;

    let labels: Vec<String> = grid
        .columns()
        .iter()
        .map(|column| column.label.clone())
        .collect();
    draw_row(document, page, grid, y, fonts.bold, 12.0, &labels)
}

/// The row primitive shared by the header and the data rows: the two horizontal
/// boundary lines, a vertical line at every column boundary including both
/// outer edges, and each cell's text inset from its column's left edge. It is
/// style-agnostic, any background fill is drawn by the caller beforehand.
fn draw_row(
    document: &mut PdfDocument,
    page: usize,
    grid: &ColumnGrid,
    y: f32,
    font_index: usize,
    font_size: f32,
    cells: &[String],
) -> Result<(), ReportError> {
    let right_edge = LEFT_MARGIN + grid.total_width();

    document.move_to(page, LEFT_MARGIN, y)?;
    document.line_to(page, right_edge, y)?;
    document.stroke(page)?;

    document.move_to(page, LEFT_MARGIN, y - ROW_HEIGHT)?;
    document.line_to(page, right_edge, y - ROW_HEIGHT)?;
    document.stroke(page)?;

    let mut column_x = LEFT_MARGIN;
    for (column, cell_text) in grid.columns().iter().zip(cells) {
        document.move_to(page, column_x, y)?;
        document.line_to(page, column_x, y - ROW_HEIGHT)?;
        document.stroke(page)?;

        document.write_text(
            page,
            font_index,
            font_size,
            [column_x + CELL_TEXT_INSET, y - CELL_BASELINE_DROP],
            cell_text,
        )?;
        column_x += column.width;
    }

    document.move_to(page, right_edge, y)?;
    document.line_to(page, right_edge, y - ROW_HEIGHT)?;
    document.stroke(page)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_history_grid_fits_between_the_margins() {
        let grid = history_grid().unwrap();
        assert_eq!(grid.columns().len(), 5);
        assert!(grid.total_width() <= PAGE_WIDTH - 2.0 * LEFT_MARGIN);
    }

    #[test]
    fn grids_wider_than_the_usable_page_are_rejected() {
        let error = ColumnGrid::new(vec![
            Column::new("Date", 300.0),
            Column::new("Source", 300.0),
        ])
        .unwrap_err();
        assert!(error.to_string().contains("exceeds"));
    }

    #[test]
    fn non_positive_column_widths_are_rejected() {
        assert!(ColumnGrid::new(vec![Column::new("Date", 0.0)]).is_err());
        assert!(ColumnGrid::new(vec![Column::new("Date", -20.0)]).is_err());
    }
}
