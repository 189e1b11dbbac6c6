//! Custom layout elements built on top of `genpdf` primitives.
//!
//! `genpdf` ships paragraphs, tables and images but no charts, so the bar chart used in the
//! report is drawn here from lines and paragraphs.

use genpdf::elements::Paragraph;
use genpdf::error::Error;
use genpdf::style::{Color, Style};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Size};

const DEFAULT_CHART_HEIGHT_MM: f64 = 85.0;
const Y_AXIS_GUTTER_MM: f64 = 16.0;
const RIGHT_PADDING_MM: f64 = 4.0;
const TOP_PADDING_MM: f64 = 8.0;
const X_LABEL_BAND_MM: f64 = 10.0;
const BAR_STROKE_SPACING_MM: f64 = 0.2;
const BAR_WIDTH_RATIO: f64 = 0.6;
const VALUE_AXIS_HEADROOM: f64 = 1.2;
const Y_AXIS_STEPS: usize = 4;
const DEFAULT_LABEL_CHARS: usize = 15;
const LABEL_FONT_SIZE: u8 = 7;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// One bar of a [`BarChart`].
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    label: String,
    value: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: impl Into<f64>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A vertical bar chart with a labelled value axis.
///
/// Bars are laid out left to right in insertion order, one evenly sized slot per bar. The value
/// axis starts at zero and leaves 20% headroom above the tallest bar. Category labels are cut to
/// a fixed number of characters and shortened further until they fit their slot.
pub struct BarChart {
    bars: Vec<Bar>,
    height: Mm,
    bar_color: Color,
    axis_color: Color,
    grid_color: Color,
    label_chars: usize,
    empty_message: String,
}

impl BarChart {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            height: mm_from_f64(DEFAULT_CHART_HEIGHT_MM),
            bar_color: Color::Rgb(0, 0, 139),
            axis_color: Color::Rgb(0, 0, 0),
            grid_color: Color::Rgb(200, 200, 200),
            label_chars: DEFAULT_LABEL_CHARS,
            empty_message: "No data".to_owned(),
        }
    }

    pub fn with_height(mut self, height: impl Into<Mm>) -> Self {
        self.height = height.into();
        self
    }

    pub fn with_bar_color(mut self, color: Color) -> Self {
        self.bar_color = color;
        self
    }

    /// Sets the maximum number of characters kept from each category label.
    pub fn with_label_chars(mut self, label_chars: usize) -> Self {
        self.label_chars = label_chars.max(1);
        self
    }

    /// Sets the text drawn in place of bars when the chart has no data.
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Upper bound of the value axis.
    pub fn value_axis_max(&self) -> f64 {
        let max = self
            .bars
            .iter()
            .map(Bar::value)
            .fold(0.0_f64, f64::max);
        if max > 0.0 {
            max * VALUE_AXIS_HEADROOM
        } else {
            1.0
        }
    }

    fn line_style(color: Color) -> Style {
        Style::new().with_color(color)
    }

    fn render_label(
        context: &genpdf::Context,
        area: &render::Area<'_>,
        origin: Position,
        width: Mm,
        text: &str,
        alignment: Alignment,
        style: Style,
    ) -> Result<(), Error> {
        let mut label_area = area.clone();
        label_area.add_offset(origin);
        label_area.set_width(width);
        let mut paragraph = Paragraph::new(text.to_owned());
        paragraph.set_alignment(alignment);
        paragraph.render(context, label_area, style)?;
        Ok(())
    }
}

/// Cuts `label` to `limit` characters, then drops trailing characters until it fits `width`.
fn fit_label(
    label: &str,
    limit: usize,
    style: Style,
    font_cache: &genpdf::fonts::FontCache,
    width: Mm,
) -> String {
    let mut chars: Vec<char> = label.chars().take(limit).collect();
    loop {
        let candidate: String = chars.iter().collect();
        if chars.len() <= 1 || style.str_width(font_cache, &candidate) <= width {
            return candidate;
        }
        chars.pop();
    }
}

/// Horizontal offsets of the strokes filling a bar `width` millimetres wide, both edges included.
fn fill_offsets(width: f64) -> Vec<f64> {
    if width <= 0.0 {
        return vec![0.0];
    }
    let gaps = (width / BAR_STROKE_SPACING_MM).ceil().max(1.0) as usize;
    let step = width / gaps as f64;
    (0..=gaps).map(|index| step * index as f64).collect()
}

fn format_tick(value: f64, axis_max: f64) -> String {
    if axis_max >= 10.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

impl Element for BarChart {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        if self.height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let width = mm_to_f64(area.size().width);
        let height = mm_to_f64(self.height);
        let label_style = style.with_font_size(LABEL_FONT_SIZE);
        let line_height = mm_to_f64(label_style.line_height(&context.font_cache));

        let plot_left = Y_AXIS_GUTTER_MM;
        let plot_right = (width - RIGHT_PADDING_MM).max(plot_left + 1.0);
        let plot_top = TOP_PADDING_MM;
        let plot_bottom = (height - X_LABEL_BAND_MM).max(plot_top + 1.0);
        let plot_width = plot_right - plot_left;
        let plot_height = plot_bottom - plot_top;
        let position = |x: f64, y: f64| Position::new(mm_from_f64(x), mm_from_f64(y));

        let axis_max = self.value_axis_max();
        for step in 0..=Y_AXIS_STEPS {
            let fraction = step as f64 / Y_AXIS_STEPS as f64;
            let y = plot_bottom - plot_height * fraction;
            if step > 0 {
                area.draw_line(
                    vec![position(plot_left, y), position(plot_right, y)],
                    Self::line_style(self.grid_color),
                );
            }
            Self::render_label(
                context,
                &area,
                position(0.0, y - line_height / 2.0),
                mm_from_f64(plot_left - 2.0),
                &format_tick(axis_max * fraction, axis_max),
                Alignment::Right,
                label_style,
            )?;
        }

        area.draw_line(
            vec![
                position(plot_left, plot_top),
                position(plot_left, plot_bottom),
                position(plot_right, plot_bottom),
            ],
            Self::line_style(self.axis_color),
        );

        if self.bars.is_empty() {
            Self::render_label(
                context,
                &area,
                position(plot_left, plot_top + plot_height / 2.0 - line_height / 2.0),
                mm_from_f64(plot_width),
                &self.empty_message,
                Alignment::Center,
                label_style,
            )?;
        } else {
            let slot = plot_width / self.bars.len() as f64;
            let bar_width = slot * BAR_WIDTH_RATIO;

            for (index, bar) in self.bars.iter().enumerate() {
                let slot_left = plot_left + slot * index as f64;
                let center = slot_left + slot / 2.0;
                let bar_height = plot_height * (bar.value.max(0.0) / axis_max);

                if bar_height > 0.0 {
                    // Strokes are hairlines, so the bar is filled with closely spaced verticals.
                    for offset in fill_offsets(bar_width) {
                        let x = center - bar_width / 2.0 + offset;
                        area.draw_line(
                            vec![position(x, plot_bottom), position(x, plot_bottom - bar_height)],
                            Self::line_style(self.bar_color),
                        );
                    }
                }

                Self::render_label(
                    context,
                    &area,
                    position(slot_left, plot_bottom - bar_height - line_height - 0.5),
                    mm_from_f64(slot),
                    &format_tick(bar.value, axis_max.max(10.0)),
                    Alignment::Center,
                    label_style,
                )?;
                Self::render_label(
                    context,
                    &area,
                    position(slot_left, plot_bottom + 1.0),
                    mm_from_f64(slot),
                    &fit_label(
                        &bar.label,
                        self.label_chars,
                        label_style,
                        &context.font_cache,
                        mm_from_f64(slot),
                    ),
                    Alignment::Center,
                    label_style,
                )?;
            }
        }

        result.size = Size::new(area.size().width, self.height);
        Ok(result)
    }
}
