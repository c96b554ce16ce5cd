//! Requested sheet heights and the container they are resolved against

/// A requested height for the sheet
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum SheetHeight {
    /// Exact sheet height in points, handle included
    Fixed(f32),
    /// Fit the content's natural height (plus the handle)
    #[default]
    Automatic,
}

impl SheetHeight {
    pub fn is_automatic(&self) -> bool {
        matches!(self, SheetHeight::Automatic)
    }
}

impl From<f32> for SheetHeight {
    fn from(height: f32) -> Self {
        SheetHeight::Fixed(height)
    }
}

/// Safe-area insets of the container
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub bottom: f32,
}

/// Size of the view the sheet is presented in
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ContainerSize {
    pub width: f32,
    pub height: f32,
    pub safe_area: Insets,
}

impl ContainerSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            safe_area: Insets::default(),
        }
    }

    pub fn with_safe_area(mut self, top: f32, bottom: f32) -> Self {
        self.safe_area = Insets { top, bottom };
        self
    }
}

/// Measures the sheet content's natural (fitting) height
///
/// Implemented by the host's layout system. Closures taking the constrained
/// width work directly:
///
/// ```rust
/// use sheet_core::ContentMeasure;
///
/// let measure = |_width: f32| 240.0;
/// assert_eq!(measure.natural_height(320.0), 240.0);
/// ```
pub trait ContentMeasure {
    /// Natural height of the content when laid out at `width`
    fn natural_height(&self, width: f32) -> f32;
}

impl<F> ContentMeasure for F
where
    F: Fn(f32) -> f32,
{
    fn natural_height(&self, width: f32) -> f32 {
        self(width)
    }
}
