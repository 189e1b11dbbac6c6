//! Assembles a `genpdf::Document` with the page chrome shared by every report: margins, a
//! running header and a fixed-height footer.

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::render::Area;
use genpdf::style::Style;
use genpdf::{Context, Document, Element, Margins, Mm, PageDecorator, Position, Size};

type BandFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Content drawn on every page, produced from the 1-based page number.
struct PageBand {
    /// Reserved height. Headers take whatever their element needs when unset.
    height: Option<Mm>,
    factory: Box<BandFactory>,
}

impl PageBand {
    fn new<F, E>(height: Option<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height,
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }

    fn element(&self, page: usize) -> Box<dyn Element> {
        (self.factory)(page)
    }
}

pub struct DocumentBuilder {
    font_family: FontFamily<FontData>,
    title: Option<String>,
    paper_size: Option<Size>,
    margins: Option<Margins>,
    font_size: Option<u8>,
    header_gap: Mm,
    header: Option<PageBand>,
    footer: Option<PageBand>,
}

impl DocumentBuilder {
    pub fn new(font_family: FontFamily<FontData>) -> Self {
        Self {
            font_family,
            title: None,
            paper_size: None,
            margins: None,
            font_size: None,
            header_gap: Mm::from(0),
            header: None,
            footer: None,
        }
    }

    /// Title written to the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Running header; `gap` separates it from the page body.
    pub fn with_header<F, E>(mut self, gap: impl Into<Mm>, header: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.header_gap = gap.into();
        self.header = Some(PageBand::new(None, header));
        self
    }

    /// Footer pinned to the bottom of the printable area.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(PageBand::new(Some(height.into()), footer));
        self
    }

    pub fn build(self) -> Document {
        let mut document = Document::new(self.font_family);
        if let Some(title) = self.title {
            document.set_title(title);
        }
        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }
        if let Some(font_size) = self.font_size {
            document.set_font_size(font_size);
        }

        document.set_page_decorator(ReportPageDecorator {
            page: 0,
            margins: self.margins,
            header_gap: self.header_gap,
            header: self.header,
            footer: self.footer,
        });
        document
    }
}

struct ReportPageDecorator {
    page: usize,
    margins: Option<Margins>,
    header_gap: Mm,
    header: Option<PageBand>,
    footer: Option<PageBand>,
}

impl ReportPageDecorator {
    fn draw_footer(
        &self,
        footer: &PageBand,
        context: &Context,
        area: &mut Area<'_>,
        style: Style,
    ) -> Result<(), Error> {
        let reserved = footer.height.unwrap_or(Mm::from(0));
        let available = area.size().height;
        if reserved > available {
            return Err(Error::new(
                "Footer does not fit on the page",
                ErrorKind::InvalidData,
            ));
        }

        let mut band = area.clone();
        band.add_offset(Position::new(0, available - reserved));
        let rendered = footer.element(self.page).render(context, band, style)?;
        if rendered.has_more {
            return Err(Error::new(
                format!("Footer on page {} overflows its band", self.page),
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - reserved);
        Ok(())
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: Area<'a>,
        style: Style,
    ) -> Result<Area<'a>, Error> {
        self.page += 1;

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(footer) = &self.footer {
            self.draw_footer(footer, context, &mut area, style)?;
        }

        if let Some(header) = &self.header {
            let rendered = header.element(self.page).render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, rendered.size.height + self.header_gap));
        }

        Ok(area)
    }
}
