//! Fixed-template PDF layout for sales reports.
//!
//! Every report has the same structure: a title, a key/value summary table, an itemized table
//! with one row per record and a totals row, and a bar chart of quantities per product. Given the
//! same summary and records in the same order, the page content is identical between runs.

use std::path::PathBuf;

use genpdf::elements::{
    Break, FrameCellDecorator, PaddedElement, Paragraph, StyledElement, TableLayout,
};
use genpdf::error::Error;
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, Margins, PaperSize};
use rust_decimal::Decimal;

use crate::builder::DocumentBuilder;
use crate::config::Settings;
use crate::elements::{Bar, BarChart};
use crate::fonts;
use crate::model::{ReportSummary, SaleRecord};

const DARK_BLUE: Color = Color::Rgb(0, 0, 139);
const MUTED_GREY: Color = Color::Rgb(110, 110, 110);
const BODY_FONT_SIZE: u8 = 10;
const TITLE_FONT_SIZE: u8 = 24;
const HEADING_FONT_SIZE: u8 = 14;
const FOOTER_HEIGHT_MM: i32 = 10;
const HEADER_GAP_MM: i32 = 2;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const EMPTY_MESSAGE: &str = "No sales records";

/// Renders [`ReportSummary`] values and their records into PDF bytes.
#[derive(Clone, Debug)]
pub struct ReportRenderer {
    title: String,
    fonts_dir: Option<PathBuf>,
    font_family: String,
}

impl ReportRenderer {
    pub fn new(
        title: impl Into<String>,
        fonts_dir: Option<PathBuf>,
        font_family: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            fonts_dir,
            font_family: font_family.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.report_title.clone(),
            settings.fonts_dir.clone(),
            settings.font_family.clone(),
        )
    }

    /// Whether a font family is available, i.e. whether [`render`](Self::render) can succeed.
    pub fn fonts_available(&self) -> bool {
        fonts::fonts_available(self.fonts_dir.as_deref(), &self.font_family)
    }

    /// Lays out the report and serializes it as PDF.
    pub fn render(&self, summary: &ReportSummary, records: &[SaleRecord]) -> Result<Vec<u8>, Error> {
        let font_family = fonts::load_font_family(self.fonts_dir.as_deref(), &self.font_family)?;
        let generated_at = summary.generated_at.format(TIMESTAMP_FORMAT).to_string();

        let header_title = self.title.clone();
        let footer_stamp = generated_at.clone();
        let mut document = DocumentBuilder::new(font_family)
            .with_title(self.title.clone())
            .with_paper_size(PaperSize::A4)
            .with_margins(Margins::trbl(12, 18, 10, 18))
            .with_font_size(BODY_FONT_SIZE)
            .with_header(HEADER_GAP_MM, move |page| {
                let text = if page > 1 { header_title.clone() } else { String::new() };
                Paragraph::new(text)
                    .aligned(Alignment::Right)
                    .styled(Style::new().with_font_size(8).with_color(MUTED_GREY))
            })
            .with_footer(FOOTER_HEIGHT_MM, move |page| {
                Paragraph::new(format!("Generated {} | Page {}", footer_stamp, page))
                    .aligned(Alignment::Center)
                    .styled(Style::new().with_font_size(8).with_color(MUTED_GREY))
            })
            .build();

        document.push(
            Paragraph::new(self.title.clone()).styled(
                Style::new()
                    .bold()
                    .with_font_size(TITLE_FONT_SIZE)
                    .with_color(DARK_BLUE),
            ),
        );
        document.push(Break::new(1.5));
        document.push(summary_table(summary, &generated_at)?);
        document.push(Break::new(2));

        document.push(heading("Sales Detail"));
        document.push(Break::new(0.5));
        document.push(items_table(summary, records)?);
        document.push(Break::new(2));

        document.push(heading("Units Sold by Product"));
        document.push(
            BarChart::new(
                records
                    .iter()
                    .map(|record| Bar::new(record.product(), record.quantity()))
                    .collect(),
            )
            .with_bar_color(DARK_BLUE)
            .with_empty_message(EMPTY_MESSAGE),
        );

        let mut bytes = Vec::new();
        document.render(&mut bytes)?;
        Ok(bytes)
    }
}

fn heading(text: &str) -> StyledElement<Paragraph> {
    Paragraph::new(text.to_owned()).styled(
        Style::new()
            .bold()
            .with_font_size(HEADING_FONT_SIZE)
            .with_color(DARK_BLUE),
    )
}

type Cell = PaddedElement<StyledElement<Paragraph>>;

fn cell(text: impl Into<String>, alignment: Alignment, style: Style) -> Cell {
    Paragraph::new(text.into())
        .aligned(alignment)
        .styled(style)
        .padded(Margins::trbl(1, 2, 1, 2))
}

fn summary_table(summary: &ReportSummary, generated_at: &str) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(vec![1, 1]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let rows = [
        ("Total Items Sold:", summary.units_sold.to_string()),
        ("Line Items:", summary.items_count.to_string()),
        ("Total Revenue:", format_currency(summary.total_revenue)),
        ("Report Generated:", generated_at.to_owned()),
    ];

    for (label, value) in rows {
        table
            .row()
            .element(cell(label, Alignment::Left, Style::new().bold()))
            .element(cell(value, Alignment::Left, Style::new()))
            .push()?;
    }

    Ok(table)
}

fn items_table(summary: &ReportSummary, records: &[SaleRecord]) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(vec![5, 2, 2, 2]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let header = Style::new().bold().with_color(DARK_BLUE);
    table
        .row()
        .element(cell("Product", Alignment::Left, header))
        .element(cell("Quantity", Alignment::Right, header))
        .element(cell("Unit Price", Alignment::Right, header))
        .element(cell("Total", Alignment::Right, header))
        .push()?;

    if records.is_empty() {
        table
            .row()
            .element(cell(EMPTY_MESSAGE, Alignment::Left, Style::new().italic()))
            .element(cell("", Alignment::Right, Style::new()))
            .element(cell("", Alignment::Right, Style::new()))
            .element(cell("", Alignment::Right, Style::new()))
            .push()?;
    }

    for record in records {
        table
            .row()
            .element(cell(record.product(), Alignment::Left, Style::new()))
            .element(cell(
                record.quantity().to_string(),
                Alignment::Right,
                Style::new(),
            ))
            .element(cell(
                format_currency(record.unit_price()),
                Alignment::Right,
                Style::new(),
            ))
            .element(cell(
                format_currency(record.line_total()),
                Alignment::Right,
                Style::new(),
            ))
            .push()?;
    }

    let total = Style::new().bold();
    table
        .row()
        .element(cell("Total", Alignment::Left, total))
        .element(cell(summary.units_sold.to_string(), Alignment::Right, total))
        .element(cell("", Alignment::Right, total))
        .element(cell(
            format_currency(summary.total_revenue),
            Alignment::Right,
            total,
        ))
        .push()?;

    Ok(table)
}

/// Formats an amount as dollars with two decimals and thousands separators, e.g. `$6,255.00`.
pub fn format_currency(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{fraction}")
}
