//! # Crop Interaction
//!
//! The crop step has two layers:
//!
//! - [`CropBox`] — aspect-locked crop geometry over a source image. New
//!   boxes are framed the way a crop widget auto-crops: the largest box of
//!   the requested aspect ratio that fits, scaled to 80% and centered.
//! - [`CropWidget`] / [`CropAdapter`] — the interactive widget handle and
//!   its owner. A widget is a live resource with an explicit `destroy`; the
//!   adapter guarantees at most one exists and that it is destroyed on
//!   replace, close and drop.
//!
//! # Example
//! ```rust
//! use photo_intake::image::processor::CropRegion;
//! use photo_intake::intake::crop::CropBox;
//!
//! let mut b = CropBox::framed(1000, 1000, 1.0);
//! assert_eq!(b.region(), CropRegion::new(100, 100, 800, 800));
//!
//! b.drag(-500.0, 0.0);
//! assert_eq!(b.region().x, 0);
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::image::processor::CropRegion;

/// Fraction of the largest fitting box used for the default framing.
pub const AUTO_CROP_AREA: f64 = 0.8;

/// Aspect-locked crop rectangle in source-pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropBox {
    image_w: f64,
    image_h: f64,
    aspect: f64,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl CropBox {
    /// Frames a new box on a `image_w × image_h` image.
    ///
    /// A non-positive or non-finite aspect ratio falls back to 1:1.
    pub fn framed(image_w: u32, image_h: u32, aspect_ratio: f64) -> Self {
        let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            1.0
        };
        let image_w = f64::from(image_w.max(1));
        let image_h = f64::from(image_h.max(1));

        let (fit_w, fit_h) = fit(image_w, image_h, aspect);
        let w = fit_w * AUTO_CROP_AREA;
        let h = fit_h * AUTO_CROP_AREA;

        Self {
            image_w,
            image_h,
            aspect,
            x: (image_w - w) / 2.0,
            y: (image_h - h) / 2.0,
            w,
            h,
        }
    }

    /// Moves the box, keeping it inside the image.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.x = (self.x + dx).clamp(0.0, self.image_w - self.w);
        self.y = (self.y + dy).clamp(0.0, self.image_h - self.h);
    }

    /// Resizes the box around its center to `width`, holding the aspect ratio.
    ///
    /// The box never grows past the largest fitting box and never shrinks
    /// below one pixel.
    pub fn resize(&mut self, width: f64) {
        let (max_w, _) = fit(self.image_w, self.image_h, self.aspect);
        let min_w = 1.0_f64.max(self.aspect).min(max_w);
        let w = if width.is_finite() { width } else { self.w };
        let w = w.clamp(min_w, max_w);
        let h = w / self.aspect;

        let cx = self.x + self.w / 2.0;
        let cy = self.y + self.h / 2.0;
        self.w = w;
        self.h = h;
        self.x = (cx - w / 2.0).clamp(0.0, self.image_w - w);
        self.y = (cy - h / 2.0).clamp(0.0, self.image_h - h);
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect
    }

    /// The box rounded to whole pixels.
    pub fn region(&self) -> CropRegion {
        CropRegion::new(
            self.x.round() as u32,
            self.y.round() as u32,
            self.w.round() as u32,
            self.h.round() as u32,
        )
        .clamp_to(self.image_w as u32, self.image_h as u32)
    }
}

/// Largest `aspect`-shaped box that fits inside the image.
fn fit(image_w: f64, image_h: f64, aspect: f64) -> (f64, f64) {
    if image_w / image_h > aspect {
        (image_h * aspect, image_h)
    } else {
        (image_w, image_w / aspect)
    }
}

/// A live interactive crop widget bound to one source image.
pub trait CropWidget: Send {
    /// Currently selected region.
    fn region(&self) -> CropRegion;

    /// Moves the selection by a pixel offset.
    fn drag(&mut self, dx: f64, dy: f64);

    /// Resizes the selection to `width` pixels, aspect ratio held.
    fn resize(&mut self, width: f64);

    /// Releases the underlying widget. Called exactly once by [`CropAdapter`].
    fn destroy(&mut self);
}

/// Creates widgets bound to a decoded source image.
pub trait CropWidgetFactory: Send + Sync {
    fn create(&self, image_w: u32, image_h: u32, aspect_ratio: f64) -> Box<dyn CropWidget>;
}

/// Widget backed purely by [`CropBox`] geometry.
#[derive(Debug)]
pub struct FramedCropWidget {
    crop: CropBox,
}

impl CropWidget for FramedCropWidget {
    fn region(&self) -> CropRegion {
        self.crop.region()
    }

    fn drag(&mut self, dx: f64, dy: f64) {
        self.crop.drag(dx, dy);
    }

    fn resize(&mut self, width: f64) {
        self.crop.resize(width);
    }

    fn destroy(&mut self) {}
}

#[derive(Clone, Debug, Default)]
pub struct FramedCropFactory;

impl CropWidgetFactory for FramedCropFactory {
    fn create(&self, image_w: u32, image_h: u32, aspect_ratio: f64) -> Box<dyn CropWidget> {
        Box::new(FramedCropWidget {
            crop: CropBox::framed(image_w, image_h, aspect_ratio),
        })
    }
}

/// Exclusive owner of the single live crop widget.
pub struct CropAdapter {
    factory: Arc<dyn CropWidgetFactory>,
    widget: Option<Box<dyn CropWidget>>,
}

impl CropAdapter {
    pub fn new(factory: Arc<dyn CropWidgetFactory>) -> Self {
        Self {
            factory,
            widget: None,
        }
    }

    /// Binds a new widget to an image, destroying the previous one first.
    pub fn open(&mut self, image_w: u32, image_h: u32, aspect_ratio: f64) {
        self.close();
        self.widget = Some(self.factory.create(image_w, image_h, aspect_ratio));
        debug!(image_w, image_h, aspect_ratio, "crop widget created");
    }

    /// Destroys the live widget, if any.
    pub fn close(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.destroy();
            debug!("crop widget destroyed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.widget.is_some()
    }

    pub fn widget(&self) -> Option<&dyn CropWidget> {
        self.widget.as_deref()
    }

    pub fn widget_mut(&mut self) -> Option<&mut (dyn CropWidget + 'static)> {
        self.widget.as_deref_mut()
    }
}

impl Drop for CropAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Factory that counts live and total widgets.
    #[derive(Default)]
    pub(crate) struct CountingFactory {
        pub(crate) live: Arc<AtomicUsize>,
        pub(crate) created: AtomicUsize,
    }

    struct CountingWidget {
        inner: FramedCropWidget,
        live: Arc<AtomicUsize>,
        destroyed: bool,
    }

    impl CropWidget for CountingWidget {
        fn region(&self) -> CropRegion {
            self.inner.region()
        }
        fn drag(&mut self, dx: f64, dy: f64) {
            self.inner.drag(dx, dy);
        }
        fn resize(&mut self, width: f64) {
            self.inner.resize(width);
        }
        fn destroy(&mut self) {
            assert!(!self.destroyed, "widget destroyed twice");
            self.destroyed = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl CropWidgetFactory for CountingFactory {
        fn create(&self, image_w: u32, image_h: u32, aspect_ratio: f64) -> Box<dyn CropWidget> {
            self.live.fetch_add(1, Ordering::SeqCst);
            self.created.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingWidget {
                inner: FramedCropWidget {
                    crop: CropBox::framed(image_w, image_h, aspect_ratio),
                },
                live: self.live.clone(),
                destroyed: false,
            })
        }
    }

    #[test]
    fn square_framing_is_centered_eighty_percent() {
        let b = CropBox::framed(1000, 1000, 1.0);
        assert_eq!(b.region(), CropRegion::new(100, 100, 800, 800));
    }

    #[test]
    fn passport_framing_on_landscape_image() {
        let b = CropBox::framed(1200, 800, 413.0 / 531.0);
        let r = b.region();
        // height-bound: 800 * 0.8
        assert_eq!(r.height, 640);
        assert_eq!(r.y, 80);
        let ratio = f64::from(r.width) / f64::from(r.height);
        assert!((ratio - 413.0 / 531.0).abs() < 0.01, "ratio {ratio}");
        assert!((i64::from(r.x) * 2 + i64::from(r.width) - 1200).abs() <= 1);
    }

    #[test]
    fn invalid_aspect_falls_back_to_square() {
        let b = CropBox::framed(100, 50, f64::NAN);
        assert_eq!(b.aspect_ratio(), 1.0);
        assert_eq!(b.region(), CropRegion::new(30, 5, 40, 40));
    }

    #[test]
    fn drag_is_clamped_to_image() {
        let mut b = CropBox::framed(1000, 1000, 1.0);
        b.drag(10_000.0, -10_000.0);
        assert_eq!(b.region(), CropRegion::new(200, 0, 800, 800));
    }

    #[test]
    fn resize_holds_aspect_and_center() {
        let mut b = CropBox::framed(1000, 1000, 1.0);
        b.resize(400.0);
        assert_eq!(b.region(), CropRegion::new(300, 300, 400, 400));

        b.resize(5000.0);
        assert_eq!(b.region(), CropRegion::new(0, 0, 1000, 1000));

        b.resize(0.0);
        assert_eq!(b.region().width, 1);
    }

    #[test]
    fn adapter_never_holds_more_than_one_widget() {
        let factory = Arc::new(CountingFactory::default());
        let live = factory.live.clone();
        let mut adapter = CropAdapter::new(factory.clone());

        adapter.open(100, 100, 1.0);
        adapter.open(200, 200, 1.0);
        adapter.open(300, 300, 1.0);
        assert_eq!(live.load(Ordering::SeqCst), 1);
        assert_eq!(factory.created.load(Ordering::SeqCst), 3);

        adapter.close();
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(!adapter.is_open());

        adapter.close();
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn adapter_drop_destroys_widget() {
        let factory = Arc::new(CountingFactory::default());
        let live = factory.live.clone();
        {
            let mut adapter = CropAdapter::new(factory);
            adapter.open(10, 10, 1.0);
            assert_eq!(live.load(Ordering::SeqCst), 1);
        }
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn adapter_forwards_interaction() {
        let mut adapter = CropAdapter::new(Arc::new(FramedCropFactory));
        adapter.open(1000, 1000, 1.0);
        let w = adapter.widget_mut().expect("open");
        w.resize(500.0);
        w.drag(-1000.0, -1000.0);
        assert_eq!(
            adapter.widget().expect("open").region(),
            CropRegion::new(0, 0, 500, 500)
        );
    }
}
