//! Document-level driver for the layout engine.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{Document, DocumentPrimitives, PagePrimitives};

use super::assembler::{AnalyzedPage, PageAssembler};
use super::builder::{check_page_sequence, DocumentBuilder};
use super::options::ConvertOptions;
use super::section::SectionTracker;

/// Turns extracted primitives into a [`Document`].
///
/// Pages are analyzed independently, on a rayon pool when parallelism is
/// enabled. Heading bands and section stamping then run once over the
/// analyzed pages in ascending page order, so the output does not depend
/// on how the analysis was scheduled.
pub struct LayoutEngine {
    options: ConvertOptions,
}

impl LayoutEngine {
    /// Create an engine with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// The options this engine runs with.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a whole document.
    pub fn run(&self, primitives: &DocumentPrimitives) -> Result<Document> {
        self.options.layout.validate()?;

        let mut pages: Vec<&PagePrimitives> = primitives.pages.iter().collect();
        pages.sort_by_key(|p| p.page_number);
        check_page_sequence(pages.iter().map(|p| p.page_number))?;

        let assembler = PageAssembler::new(&self.options.layout);
        let analyzed = self.analyze_pages(&assembler, &pages)?;

        let bands = assembler.font_bands(&analyzed);
        log::debug!(
            "Analyzed {} pages, {} heading bands",
            analyzed.len(),
            bands.len()
        );

        let mut tracker = SectionTracker::new();
        let mut builder = DocumentBuilder::with_capacity(analyzed.len());
        for page in analyzed {
            builder.push(assembler.assemble(page, &bands, &mut tracker));
        }

        builder.build()
    }

    fn analyze_pages(
        &self,
        assembler: &PageAssembler<'_>,
        pages: &[&PagePrimitives],
    ) -> Result<Vec<AnalyzedPage>> {
        if !self.options.parallel || pages.len() < 2 {
            return pages.iter().map(|p| assembler.analyze(p)).collect();
        }

        let analyze = || {
            pages
                .par_iter()
                .map(|p| assembler.analyze(p))
                .collect::<Result<Vec<_>>>()
        };

        match self.options.worker_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::Other(format!("Failed to build worker pool: {}", e)))?;
                pool.install(analyze)
            }
            None => analyze(),
        }
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::model::{ContentItem, RawTextBlock};

    fn page(number: u32, blocks: &[(&str, f32, f32)]) -> PagePrimitives {
        blocks.iter().fold(PagePrimitives::new(number), |page, (text, y, size)| {
            page.with_text(RawTextBlock::new(
                number,
                *text,
                BoundingBox::new(50.0, *y, 400.0, *y + size),
                *size,
                false,
            ))
        })
    }

    #[test]
    fn test_section_carries_across_pages() {
        let primitives = DocumentPrimitives {
            pages: vec![
                page(2, &[("Continued.", 100.0, 12.0)]),
                page(1, &[("Methods", 50.0, 24.0), ("Intro body.", 100.0, 12.0)]),
            ],
        };

        let doc = LayoutEngine::default().run(&primitives).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(
            doc.pages[1].content,
            vec![ContentItem::paragraph(
                "Continued.",
                Some("Methods".into()),
                None
            )]
        );
    }

    #[test]
    fn test_gap_fails_before_analysis() {
        let primitives = DocumentPrimitives {
            pages: vec![page(1, &[]), page(3, &[])],
        };
        assert!(matches!(
            LayoutEngine::default().run(&primitives),
            Err(Error::MissingPage(2))
        ));
    }

    #[test]
    fn test_bounded_pool_matches_sequential() {
        let primitives = DocumentPrimitives {
            pages: (1..=6)
                .map(|n| page(n, &[("Heading", 20.0, 20.0), ("Body", 60.0, 10.0)]))
                .collect(),
        };

        let sequential = LayoutEngine::new(ConvertOptions::new().sequential())
            .run(&primitives)
            .unwrap();
        let pooled = LayoutEngine::new(ConvertOptions::new().with_worker_threads(2))
            .run(&primitives)
            .unwrap();
        assert_eq!(sequential, pooled);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let options = ConvertOptions::new()
            .with_layout(crate::layout::LayoutConfig::new().with_max_heading_level(0));
        let result = LayoutEngine::new(options).run(&DocumentPrimitives::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
