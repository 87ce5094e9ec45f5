/// Darknet-style network description parser.
///
/// Walks the lines once, tracking the running feature-map shape, and records
/// a [`LayerDescriptor`] for every complete `[convolutional]` section.

use tracing::{debug, warn};

use crate::conv::output_extent;
use super::store::{FeatureShape, LayerDescriptor, LayerStore, ParseDiagnostic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Net,
    Conv,
    Pool,
}

impl Section {
    fn from_header(line: &str) -> Option<Section> {
        match line {
            "[net]" => Some(Section::Net),
            "[convolutional]" => Some(Section::Conv),
            "[maxpool]" => Some(Section::Pool),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Section::None => "none",
            Section::Net => "net",
            Section::Conv => "convolutional",
            Section::Pool => "maxpool",
        }
    }
}

/// Layer parameters seen since the last flush.
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    filters: Option<usize>,
    size: Option<usize>,
    stride: Option<usize>,
    pad: Option<usize>,
}

impl Pending {
    fn conv(&self) -> Option<(usize, usize, usize, usize)> {
        Some((self.filters?, self.size?, self.stride?, self.pad?))
    }

    fn pool(&self) -> Option<(usize, usize)> {
        Some((self.size?, self.stride?))
    }
}

/// Single-pass parser state. Build one per parse with [`ConfigParser::parse`].
pub struct ConfigParser {
    section: Section,
    section_line: usize,
    section_done: bool,
    shape: FeatureShape,
    pending: Pending,
    store: LayerStore,
}

impl ConfigParser {
    /// Parses `lines` into a layer store. Never fails; problems are reported
    /// through [`LayerStore::diagnostics`] and logged.
    ///
    /// Every section header clears `filters`, `size`, `stride` and `pad`, as
    /// does the completion of a `[maxpool]`. A `[convolutional]` section must
    /// therefore set all four keys itself; values from a preceding section are
    /// never inherited, and a section missing one of them records no layer.
    pub fn parse<I, S>(lines: I) -> LayerStore
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = ConfigParser {
            section: Section::None,
            section_line: 0,
            section_done: false,
            shape: FeatureShape::default(),
            pending: Pending::default(),
            store: LayerStore::default(),
        };
        for (idx, line) in lines.into_iter().enumerate() {
            parser.line(idx + 1, line.as_ref().trim());
        }
        parser.finish()
    }

    fn line(&mut self, line_no: usize, line: &str) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return;
        }
        if let Some(section) = Section::from_header(line) {
            self.enter(section, line_no);
            return;
        }
        if self.section == Section::None {
            self.diagnose(ParseDiagnostic::NoSection { line: line_no });
        }
        let Some((key, value)) = line.split_once('=') else {
            return;
        };
        let (key, value) = (key.trim(), value.trim());
        match (self.section, key) {
            (Section::Net, "height" | "width" | "channels") => {
                let Some(parsed) = self.integer(line_no, key, value) else {
                    return;
                };
                match key {
                    "height" => self.shape.height = parsed,
                    "width" => self.shape.width = parsed,
                    _ => self.shape.channels = parsed,
                }
            }
            (_, "filters" | "size" | "stride" | "pad") => {
                let Some(parsed) = self.integer(line_no, key, value) else {
                    return;
                };
                match key {
                    "filters" => self.pending.filters = Some(parsed),
                    "size" => self.pending.size = Some(parsed),
                    "stride" => self.pending.stride = Some(parsed),
                    _ => self.pending.pad = Some(parsed),
                }
                self.try_complete(line_no);
            }
            _ => {}
        }
    }

    fn enter(&mut self, section: Section, line_no: usize) {
        self.check_incomplete();
        self.section = section;
        self.section_line = line_no;
        self.section_done = false;
        self.pending = Pending::default();
        debug!(line = line_no, section = section.name(), "section");
    }

    /// Fires the section's completion event once its parameters are all set.
    fn try_complete(&mut self, line_no: usize) {
        if self.section_done {
            return;
        }
        match self.section {
            Section::Conv => {
                if let Some((filters, size, stride, pad)) = self.pending.conv() {
                    self.finish_conv(line_no, filters, size, stride, pad);
                }
            }
            Section::Pool => {
                if let Some((size, stride)) = self.pending.pool() {
                    self.finish_pool(line_no, size, stride);
                }
            }
            Section::None | Section::Net => {}
        }
    }

    fn finish_conv(&mut self, line_no: usize, filters: usize, size: usize, stride: usize, pad: usize) {
        self.section_done = true;
        self.pending = Pending::default();

        let effective_pad = if pad == 1 { size / 2 } else { 0 };
        let input = self.shape;
        let extents = self.extents(line_no, Section::Conv, input, effective_pad, size, stride);
        if let Some((height, width)) = extents {
            if height <= 0 || width <= 0 {
                self.diagnose(ParseDiagnostic::DegenerateLayer {
                    layer: self.store.layers.len(),
                    height,
                    width,
                });
            }
        }
        let (height, width) = extents.unwrap_or((0, 0));
        let (out_h, out_w) = (height.max(0) as usize, width.max(0) as usize);

        let layer = LayerDescriptor {
            input_height: input.height,
            input_width: input.width,
            input_channels: input.channels,
            filters,
            kernel_size: size,
            kernel_channels: input.channels,
            output_height: out_h,
            output_width: out_w,
            output_channels: filters,
            padding: effective_pad,
            stride,
        };
        debug!(
            layer = self.store.layers.len(),
            input = %layer.input_shape(),
            output = %layer.output_shape(),
            kernel = size,
            "convolutional layer"
        );
        self.store.layers.push(layer);
        self.shape = layer.output_shape();
    }

    fn finish_pool(&mut self, line_no: usize, size: usize, stride: usize) {
        self.section_done = true;
        self.pending = Pending::default();

        let Some((height, width)) = self.extents(line_no, Section::Pool, self.shape, 0, size, stride) else {
            return;
        };
        if height <= 0 || width <= 0 {
            self.diagnose(ParseDiagnostic::DegeneratePool { line: line_no, height, width });
        }
        self.shape.height = height.max(0) as usize;
        self.shape.width = width.max(0) as usize;
        debug!(output = %self.shape, "maxpool");
    }

    /// Output height and width, or `None` (with a diagnostic) for a zero stride.
    fn extents(
        &mut self,
        line_no: usize,
        section: Section,
        input: FeatureShape,
        pad: usize,
        size: usize,
        stride: usize,
    ) -> Option<(i64, i64)> {
        let height = output_extent(input.height, pad, size, stride);
        let width = output_extent(input.width, pad, size, stride);
        match (height, width) {
            (Some(h), Some(w)) => Some((h, w)),
            _ => {
                self.diagnose(ParseDiagnostic::ZeroStride {
                    line: line_no,
                    section: section.name(),
                });
                None
            }
        }
    }

    fn check_incomplete(&mut self) {
        if self.section == Section::Conv && !self.section_done {
            self.diagnose(ParseDiagnostic::IncompleteLayer { line: self.section_line });
        }
    }

    fn integer(&mut self, line_no: usize, key: &str, value: &str) -> Option<usize> {
        let parsed = value.parse().ok();
        if parsed.is_none() {
            self.diagnose(ParseDiagnostic::InvalidValue {
                line: line_no,
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        parsed
    }

    fn diagnose(&mut self, diagnostic: ParseDiagnostic) {
        warn!("network config: {diagnostic}");
        self.store.diagnostics.push(diagnostic);
    }

    fn finish(mut self) -> LayerStore {
        self.check_incomplete();
        self.store.output = self.shape;
        self.store
    }
}
