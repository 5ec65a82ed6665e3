//! Strategy selection across the two line detectors.

use crate::core::config::{ConfigValidator, LineDetectionMethod, TableGridConfig};
use crate::core::errors::{TableGridError, TableGridResult};
use crate::core::traits::{LineDetector, TokenSource};
use crate::domain::{CellBBox, CellDetection, TableLayout};
use crate::processors::{BinarizationMode, MorphologicalLineDetector, PixelContrastLineDetector};
use crate::utils::{DebugSink, load_image};
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// Cells found by [`BorderedCellExtractor::extract`] and how they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct CellExtraction {
    pub detection: CellDetection,
    /// Detector that produced `detection`.
    pub method: LineDetectionMethod,
    /// Every attempt made, in order, with its failure if it failed.
    pub processing_messages: Vec<String>,
    /// Whether the cells come from the text-masked morphological pass.
    pub text_masked: bool,
    /// Mean height of the masked words; 0 unless `text_masked`.
    pub mean_word_height: f64,
}

impl CellExtraction {
    pub fn cells(&self) -> &[CellBBox] {
        &self.detection.cells
    }

    /// Groups the cells into rows.
    pub fn layout(&self) -> TableLayout {
        TableLayout::from_cells(
            &self.detection.cells,
            self.text_masked,
            self.mean_word_height,
        )
    }
}

/// A successful attempt before processing messages are attached.
struct Found {
    detection: CellDetection,
    method: LineDetectionMethod,
    text_masked: bool,
    mean_word_height: f64,
}

impl Found {
    fn plain(detection: CellDetection, method: LineDetectionMethod) -> Self {
        Self {
            detection,
            method,
            text_masked: false,
            mean_word_height: 0.0,
        }
    }
}

#[derive(Debug, Default)]
struct AttemptLog {
    messages: Vec<String>,
    failures: Vec<String>,
}

impl AttemptLog {
    fn start(&mut self, label: &str) {
        tracing::debug!(target: "table_grid", attempt = label, "line detection attempt");
        self.messages.push(format!("Line detection using {label}"));
    }

    /// Records `result`, turning recoverable failures into `None`.
    fn settle<T>(&mut self, label: &str, result: TableGridResult<T>) -> TableGridResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_detection_failure() || matches!(e, TableGridError::TokenSource(_)) => {
                tracing::warn!(target: "table_grid", attempt = label, error = %e, "line detection failed");
                let message = format!("{label} failed: {e}");
                self.messages.push(message.clone());
                self.failures.push(message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Finds the cells of a bordered table, trying the configured detectors in
/// turn.
///
/// With one configured method, the other one is the fallback. With both, both
/// run and the one reporting more cells wins, ties going to the morphological
/// detector. The morphological detector itself tries an adaptive threshold,
/// then Otsu, then (when a [`TokenSource`] is attached) the text-masked pass.
#[derive(Debug)]
pub struct BorderedCellExtractor {
    config: TableGridConfig,
    thresholds: Vec<(&'static str, Box<dyn LineDetector>)>,
    text_masking: MorphologicalLineDetector,
    pixel_contrast: Box<dyn LineDetector>,
    token_source: Option<Arc<dyn TokenSource>>,
    debug: DebugSink,
}

impl BorderedCellExtractor {
    /// # Errors
    ///
    /// Returns `TableGridError::Config` if the configuration is invalid.
    pub fn new(config: TableGridConfig) -> TableGridResult<Self> {
        config.validate()?;
        let morphological =
            MorphologicalLineDetector::new(config.morphological.clone(), config.cell_grid.clone())?
                .with_deskew(config.deskew_image);
        let pixel_contrast =
            PixelContrastLineDetector::new(config.pixel_contrast.clone(), config.cell_grid.clone())?
                .with_deskew(config.deskew_image);

        let thresholds: Vec<(&'static str, Box<dyn LineDetector>)> = vec![
            (
                "adaptive threshold",
                Box::new(morphological.clone().with_mode(BinarizationMode::Adaptive)),
            ),
            (
                "Otsu threshold",
                Box::new(morphological.clone().with_mode(BinarizationMode::Otsu)),
            ),
        ];

        Ok(Self {
            thresholds,
            text_masking: morphological,
            pixel_contrast: Box::new(pixel_contrast),
            token_source: None,
            debug: DebugSink::from_config(&config.debug),
            config,
        })
    }

    /// Enables the text-masked morphological pass.
    pub fn with_token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    /// Overrides the sink built from the debug configuration.
    pub fn with_debug_sink(mut self, debug: DebugSink) -> Self {
        self.debug = debug;
        self
    }

    pub fn config(&self) -> &TableGridConfig {
        &self.config
    }

    /// Detects the cells of the table in `image`, optionally restricted to
    /// `region`. Cells are relative to the region.
    ///
    /// # Errors
    ///
    /// * `TableGridError::Exhausted` when every attempt failed to find cells.
    /// * `TableGridError::MalformedInput` for an empty image or region.
    pub fn extract(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
    ) -> TableGridResult<CellExtraction> {
        let mut log = AttemptLog::default();
        let found = match self.config.line_detection_methods.as_slice() {
            [method] => match self.run(*method, image, region, &mut log)? {
                Some(found) => Some(found),
                None => self.run(other(*method), image, region, &mut log)?,
            },
            _ => self.evaluate_all(image, region, &mut log)?,
        };

        let Some(found) = found else {
            return Err(TableGridError::Exhausted {
                attempts: log.failures,
            });
        };
        tracing::info!(
            target: "table_grid",
            method = %found.method,
            cells = found.detection.cells.len(),
            text_masked = found.text_masked,
            "table cells extracted"
        );
        Ok(CellExtraction {
            detection: found.detection,
            method: found.method,
            processing_messages: log.messages,
            text_masked: found.text_masked,
            mean_word_height: found.mean_word_height,
        })
    }

    /// Loads the image at `path` and runs [`extract`](Self::extract) on it.
    pub fn extract_file(
        &self,
        path: &Path,
        region: Option<CellBBox>,
    ) -> TableGridResult<CellExtraction> {
        let image = load_image(path)?;
        self.extract(&image, region)
    }

    fn run(
        &self,
        method: LineDetectionMethod,
        image: &DynamicImage,
        region: Option<CellBBox>,
        log: &mut AttemptLog,
    ) -> TableGridResult<Option<Found>> {
        match method {
            LineDetectionMethod::PixelContrast => self.run_pixel_contrast(image, region, log),
            LineDetectionMethod::Morphological => self.run_morphological(image, region, log),
        }
    }

    fn run_pixel_contrast(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        log: &mut AttemptLog,
    ) -> TableGridResult<Option<Found>> {
        let label = "pixel contrast";
        log.start(label);
        let result = self
            .pixel_contrast
            .detect_all_cells(image, region, &self.debug)
            .map(|d| Found::plain(d, LineDetectionMethod::PixelContrast));
        log.settle(label, result)
    }

    fn run_morphological(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        log: &mut AttemptLog,
    ) -> TableGridResult<Option<Found>> {
        for (label, detector) in &self.thresholds {
            log.start(label);
            let result = detector
                .detect_all_cells(image, region, &self.debug)
                .map(|d| Found::plain(d, LineDetectionMethod::Morphological));
            if let Some(found) = log.settle(label, result)? {
                return Ok(Some(found));
            }
        }

        let Some(source) = &self.token_source else {
            return Ok(None);
        };
        let label = "text masking and adaptive threshold";
        log.start(label);
        let result = self
            .text_masking
            .detect_with_text_masked(image, region, source.as_ref(), &self.debug)
            .map(|(detection, mean_word_height)| Found {
                detection,
                method: LineDetectionMethod::Morphological,
                text_masked: true,
                mean_word_height,
            });
        log.settle(label, result)
    }

    fn evaluate_all(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        log: &mut AttemptLog,
    ) -> TableGridResult<Option<Found>> {
        let morphological = self.run_morphological(image, region, log)?;
        let pixel_contrast = self.run_pixel_contrast(image, region, log)?;
        let chosen = match (morphological, pixel_contrast) {
            (Some(m), Some(p)) if p.detection.cells.len() > m.detection.cells.len() => Some(p),
            (Some(m), _) => Some(m),
            (None, p) => p,
        };
        if let Some(found) = &chosen {
            log.messages
                .push(format!("Chosen method of line detection: {}", found.method));
        }
        Ok(chosen)
    }
}

fn other(method: LineDetectionMethod) -> LineDetectionMethod {
    match method {
        LineDetectionMethod::PixelContrast => LineDetectionMethod::Morphological,
        LineDetectionMethod::Morphological => LineDetectionMethod::PixelContrast,
    }
}
