//! Coordinate system transformation hub
//!
//! Three coordinate spaces with explicit transformations:
//! 1. Document space: 1-based lines and columns (what the model exposes)
//! 2. Layout space: logical pixels, pre-scroll (where lines and zones live)
//! 3. View space: logical pixels, post-scroll (what overlays are placed in)
//!
//! Physical pixels are only derived for reporting; nothing is rendered here.

// === Document Space ===

/// Position in a document, 1-based like the editor gutter
///
/// Column 1 is before the first character, the last valid column of a line
/// is its character count plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPos {
    pub line: u32,
    pub column: u32,
}

impl DocPos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

// === Layout Space (pre-scroll) ===

/// Position in layout space - where things are before scrolling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPos {
    pub x: f32,
    pub y: f32,
}

/// Size in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutSize {
    pub width: f32,
    pub height: f32,
}

// === View Space (post-scroll) ===

/// Position in view space - layout minus scroll offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPos {
    pub x: f32,
    pub y: f32,
}

/// A resolved document position: top-left of the character cell plus the
/// height of the line it sits on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

/// Rectangle in view space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// === Physical Space (device pixels) ===

/// Position in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalPos {
    pub x: f32,
    pub y: f32,
}

// === Text Metrics ===

/// All text measurement configuration in one place
#[derive(Debug, Clone)]
pub struct TextMetrics {
    /// Base font size in logical pixels
    pub font_size: f32,
    /// Line height in logical pixels
    pub line_height: f32,
    /// Average space width in logical pixels
    pub space_width: f32,
    /// Number of spaces per tab
    pub tab_stops: u32,
}

impl TextMetrics {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            line_height: font_size * 1.4,
            space_width: font_size * 0.6, // Approximate for monospace
            tab_stops: 4,
        }
    }

    pub fn with_tab_stops(mut self, tab_stops: u32) -> Self {
        self.tab_stops = tab_stops.max(1);
        self
    }

    /// Visual column reached after the first `chars` characters of a line
    pub fn visual_column(&self, line_text: &str, chars: usize) -> u32 {
        let mut column = 0;
        for ch in line_text.chars().take(chars) {
            if ch == '\t' {
                // Tab advances to next tab stop
                column = ((column / self.tab_stops) + 1) * self.tab_stops;
            } else {
                column += 1;
            }
        }
        column
    }

    /// Calculate x offset for a visual column
    pub fn column_to_x(&self, column: u32) -> f32 {
        column as f32 * self.space_width
    }
}

// === Viewport ===

/// Scroll state, window size and text metrics of one editor view
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Current scroll position in layout space
    pub scroll: LayoutPos,
    /// Logical size (DPI-independent)
    pub logical_size: LayoutSize,
    /// HiDPI scale factor
    pub scale_factor: f32,
    /// Width of the gutter left of the text content
    pub content_left: f32,
    pub metrics: TextMetrics,
}

impl Viewport {
    /// Create a viewport that has not been laid out yet
    pub fn new(font_size: f32, scale_factor: f32) -> Self {
        Self {
            scroll: LayoutPos::default(),
            logical_size: LayoutSize::default(),
            scale_factor,
            content_left: 0.0,
            metrics: TextMetrics::new(font_size),
        }
    }

    pub fn with_gutter(mut self, content_left: f32) -> Self {
        self.content_left = content_left;
        self
    }

    pub fn with_metrics(mut self, metrics: TextMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// A viewport with zero area cannot place anything
    pub fn is_laid_out(&self) -> bool {
        self.logical_size.width > 0.0 && self.logical_size.height > 0.0
    }

    /// Update viewport on window resize
    pub fn resize(&mut self, logical_width: f32, logical_height: f32) {
        self.logical_size = LayoutSize {
            width: logical_width.max(0.0),
            height: logical_height.max(0.0),
        };
    }

    /// Width available to text, right of the gutter
    pub fn visible_content_width(&self) -> f32 {
        if !self.is_laid_out() {
            return 0.0;
        }
        (self.logical_size.width - self.content_left).max(0.0)
    }

    /// Horizontal layout position of a 1-based column on a line
    pub fn column_to_layout_x(&self, line_text: &str, column: u32) -> f32 {
        let chars = column.saturating_sub(1) as usize;
        self.content_left + self.metrics.column_to_x(self.metrics.visual_column(line_text, chars))
    }

    /// Layout position to view position (apply scroll)
    pub fn layout_to_view(&self, pos: LayoutPos) -> ViewPos {
        ViewPos {
            x: pos.x - self.scroll.x,
            y: pos.y - self.scroll.y,
        }
    }

    /// View position to physical position (apply scale factor)
    pub fn view_to_physical(&self, pos: ViewPos) -> PhysicalPos {
        PhysicalPos {
            x: pos.x * self.scale_factor,
            y: pos.y * self.scale_factor,
        }
    }

    /// Whether a vertical layout span intersects the rendered range
    pub fn is_rendered(&self, top: f32, height: f32) -> bool {
        if !self.is_laid_out() {
            return false;
        }
        let view_top = top - self.scroll.y;
        view_top < self.logical_size.height && view_top + height > 0.0
    }
}
