// Gesture orchestration.
//
// A `FillSession` lives for one press-drag-release gesture. It floods the
// region once, at press time, and keeps the resulting solid layer; every
// drag position then re-renders the gradient on top of a fresh copy of that
// layer. `Painter` owns the source image and scratch layer across
// gestures and runs the Idle / Seeded state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::colour::{MatchConfig, parse_colours};
use crate::error::Error;
use crate::fill::flood_fill;
use crate::geometry::DragGeometry;
use crate::gradient::{Surface, composite_over, render_gradient};
use crate::types::{Colour, PixelBuffer, Point, Rect};

/// Knobs for the fill step of a gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillOptions {
    pub matching: MatchConfig,
    /// Solid colour laid down before the gradient replaces it.
    pub fill_colour: Colour,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self { matching: MatchConfig::default(), fill_colour: Colour::BLACK }
    }
}

/// State of one gesture, from press to release.
#[derive(Debug)]
pub struct FillSession {
    source_point: Point,
    current_point: Point,
    colours: Vec<Colour>,
    bounds: Rect,
    layer: PixelBuffer,
}

impl FillSession {
    /// Start a gesture at `point`: parse colours, flood the region from the
    /// `source` snapshot and paint the zero-length gradient onto `surface`.
    ///
    /// All validation runs before `surface` is touched.
    pub fn begin<S, C>(
        source: &PixelBuffer,
        surface: &mut S,
        point: Point,
        colours: &[C],
        options: &FillOptions,
    ) -> Result<Self, Error>
    where
        S: Surface + ?Sized,
        C: AsRef<str>,
    {
        let colours = parse_colours(colours)?;
        if colours.len() < 2 {
            return Err(Error::InsufficientColours(colours.len()));
        }
        if !source.contains(point.x, point.y) {
            return Err(Error::OutOfBoundsSeed {
                x: point.x,
                y: point.y,
                width: source.width(),
                height: source.height(),
            });
        }
        let target = surface.context().ok_or(Error::MissingSurfaceContext)?;
        if !target.same_size(source) {
            return Err(Error::SizeMismatch(format!(
                "surface {}x{} vs source {}x{}",
                target.width(),
                target.height(),
                source.width(),
                source.height()
            )));
        }

        let mut layer = PixelBuffer::new(source.width(), source.height());
        let fill = flood_fill(source, &mut layer, point, options.fill_colour, &options.matching, None)?;
        log::info!(
            "fill at ({}, {}): {} px in {:?}, {} colours",
            point.x,
            point.y,
            fill.filled,
            fill.bounds,
            colours.len()
        );

        let mut session = Self {
            source_point: point,
            current_point: point,
            colours,
            bounds: fill.bounds,
            layer,
        };
        session.render(surface)?;
        Ok(session)
    }

    /// Move the drag end to `point` and repaint. The fill is reused as is.
    pub fn update<S: Surface + ?Sized>(&mut self, surface: &mut S, point: Point) -> Result<DragGeometry, Error> {
        self.current_point = point;
        self.render(surface)
    }

    /// Replace the surface contents with the fill layer plus the gradient for
    /// the current drag.
    fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<DragGeometry, Error> {
        let target = surface.context().ok_or(Error::MissingSurfaceContext)?;
        let geom = DragGeometry::from_drag(
            self.source_point,
            self.current_point,
            self.bounds,
            (target.width(), target.height()),
        );
        target.copy_from(&self.layer)?;
        let painted = render_gradient(target, &self.colours, geom.angle, geom.rect)?;
        log::debug!(
            "gradient {:.1}° dist {} x{:.2} over {:?}: {painted} px",
            geom.angle,
            geom.distance,
            geom.factor,
            geom.rect
        );
        Ok(geom)
    }

    pub fn source_point(&self) -> Point {
        self.source_point
    }

    pub fn current_point(&self) -> Point {
        self.current_point
    }

    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// Tight box of the filled pixels.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Clears the shared busy flag when a pass finishes, error or not.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Source image, scratch layer and at most one live gesture.
pub struct Painter {
    source: PixelBuffer,
    scratch: PixelBuffer,
    session: Option<FillSession>,
    options: FillOptions,
    busy: Arc<AtomicBool>,
}

impl Painter {
    pub fn new(source: PixelBuffer, options: FillOptions) -> Self {
        let scratch = PixelBuffer::new(source.width(), source.height());
        Self { source, scratch, session: None, options, busy: Arc::new(AtomicBool::new(false)) }
    }

    /// Idle -> Seeded. A new press replaces whatever gesture was still open.
    /// On error the open gesture (if any) and the scratch layer are kept as they were.
    pub fn begin<C: AsRef<str>>(&mut self, point: Point, colours: &[C]) -> Result<(), Error> {
        let _busy = BusyGuard::raise(&self.busy);
        let mut staged = PixelBuffer::new(self.source.width(), self.source.height());
        match FillSession::begin(&self.source, &mut staged, point, colours, &self.options) {
            Ok(session) => {
                if self.session.replace(session).is_some() {
                    log::warn!("new gesture while one was open; discarding the old one");
                }
                self.scratch = staged;
                Ok(())
            }
            Err(e) => {
                log::warn!("gesture at ({}, {}) rejected: {e}", point.x, point.y);
                Err(e)
            }
        }
    }

    /// Seeded -> Seeded. Without an open gesture the move is dropped.
    pub fn update(&mut self, point: Point) -> Result<Option<DragGeometry>, Error> {
        let _busy = BusyGuard::raise(&self.busy);
        match self.session.as_mut() {
            Some(session) => session.update(&mut self.scratch, point).map(Some),
            None => {
                log::debug!("move to ({}, {}) with no gesture; ignored", point.x, point.y);
                Ok(None)
            }
        }
    }

    /// Seeded -> Idle. The scratch layer is merged into the source, which
    /// becomes the snapshot the next gesture fills from.
    pub fn end(&mut self) -> Result<(), Error> {
        let _busy = BusyGuard::raise(&self.busy);
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        composite_over(&mut self.source, &self.scratch)?;
        self.scratch.clear(Colour::TRANSPARENT);
        log::info!(
            "gesture from ({}, {}) to ({}, {}) committed",
            session.source_point().x,
            session.source_point().y,
            session.current_point().x,
            session.current_point().y
        );
        Ok(())
    }

    /// What the user should see right now: source with the scratch layer on top.
    pub fn compose(&self, out: &mut PixelBuffer) -> Result<(), Error> {
        out.copy_from(&self.source)?;
        composite_over(out, &self.scratch)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Shared handle to the busy flag, for callers on other threads.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    pub fn is_seeded(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&FillSession> {
        self.session.as_ref()
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn scratch(&self) -> &PixelBuffer {
        &self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Colour = Colour::rgb(255, 0, 0);
    const BLUE: Colour = Colour::rgb(0, 0, 255);

    /// 8x8 white canvas with a blue vertical wall at x = 4.
    fn walled() -> PixelBuffer {
        let mut buf = PixelBuffer::filled(8, 8, Colour::WHITE);
        for y in 0..8 {
            buf.set(4, y, BLUE);
        }
        buf
    }

    #[test]
    fn begin_paints_only_the_seeded_region() {
        let source = walled();
        let mut surface = PixelBuffer::new(8, 8);
        let session =
            FillSession::begin(&source, &mut surface, Point::new(1, 1), &["#f00", "#f00"], &FillOptions::default())
                .unwrap();
        assert_eq!(session.bounds(), Rect::new(0.0, 0.0, 3.0, 7.0));
        for y in 0..8 {
            for x in 0..8 {
                let expect = if x < 4 { RED } else { Colour::TRANSPARENT };
                assert_eq!(surface.get(x, y), expect, "({x}, {y})");
            }
        }
    }

    #[test]
    fn validation_failures_leave_surface_untouched() {
        let source = walled();
        let mut surface = PixelBuffer::filled(8, 8, BLUE);
        let before = surface.clone();
        let opts = FillOptions::default();

        let err = FillSession::begin(&source, &mut surface, Point::new(1, 1), &["#f00", "bogus"], &opts);
        assert!(matches!(err, Err(Error::UnparseableColour(_))));
        let err = FillSession::begin(&source, &mut surface, Point::new(1, 1), &["#f00"], &opts);
        assert!(matches!(err, Err(Error::InsufficientColours(1))));
        let err = FillSession::begin(&source, &mut surface, Point::new(8, 1), &["#f00", "#fff"], &opts);
        assert!(matches!(err, Err(Error::OutOfBoundsSeed { .. })));
        let mut small = PixelBuffer::new(2, 2);
        let err = FillSession::begin(&source, &mut small, Point::new(1, 1), &["#f00", "#fff"], &opts);
        assert!(matches!(err, Err(Error::SizeMismatch(_))));

        assert_eq!(surface, before);
    }

    #[test]
    fn moves_overwrite_instead_of_accumulating() {
        let source = PixelBuffer::filled(10, 1, Colour::WHITE);
        let mut surface = PixelBuffer::new(10, 1);
        let colours = ["rgba(255,0,0,0.5)", "rgba(0,0,255,0.5)"];
        let mut session =
            FillSession::begin(&source, &mut surface, Point::new(0, 0), &colours, &FillOptions::default()).unwrap();

        session.update(&mut surface, Point::new(9, 0)).unwrap();
        let first = surface.clone();
        session.update(&mut surface, Point::new(5, 0)).unwrap();
        session.update(&mut surface, Point::new(9, 0)).unwrap();
        assert_eq!(surface, first);
        // half-transparent stops on an opaque layer stay half-transparent
        assert_eq!(surface.get(0, 0).a, 128);
    }

    #[test]
    fn drag_direction_flips_the_gradient() {
        let source = PixelBuffer::filled(11, 1, Colour::WHITE);
        let mut surface = PixelBuffer::new(11, 1);
        let mut session =
            FillSession::begin(&source, &mut surface, Point::new(5, 0), &["#f00", "#00f"], &FillOptions::default())
                .unwrap();

        let geom = session.update(&mut surface, Point::new(10, 0)).unwrap();
        assert_eq!(geom.angle, 0.0);
        assert!(surface.get(0, 0).r > surface.get(0, 0).b);
        assert!(surface.get(10, 0).b > surface.get(10, 0).r);

        let geom = session.update(&mut surface, Point::new(0, 0)).unwrap();
        assert!((geom.angle - 180.0).abs() < 1e-9);
        assert!(surface.get(0, 0).b > surface.get(0, 0).r);
        assert!(surface.get(10, 0).r > surface.get(10, 0).b);
    }

    #[test]
    fn painter_commits_on_end() {
        let mut painter = Painter::new(walled(), FillOptions::default());
        painter.begin(Point::new(6, 6), &["#0f0", "#0f0"]).unwrap();
        assert!(painter.is_seeded());
        painter.update(Point::new(7, 7)).unwrap();
        painter.end().unwrap();

        assert!(!painter.is_seeded());
        assert!(!painter.is_busy());
        assert_eq!(painter.source().get(6, 6), Colour::rgb(0, 255, 0));
        assert_eq!(painter.source().get(1, 1), Colour::WHITE);
        assert_eq!(painter.source().get(4, 0), BLUE);
        assert_eq!(painter.scratch().get(6, 6), Colour::TRANSPARENT);

        // The committed green region is now its own colour for the next gesture.
        painter.begin(Point::new(1, 1), &["#f00", "#f00"]).unwrap();
        assert_eq!(painter.session().unwrap().bounds(), Rect::new(0.0, 0.0, 3.0, 7.0));
    }

    #[test]
    fn painter_rejects_bad_gesture_and_stays_idle() {
        let mut painter = Painter::new(walled(), FillOptions::default());
        let before = painter.source().clone();
        assert!(painter.begin(Point::new(99, 0), &["#f00", "#fff"]).is_err());
        assert!(!painter.is_seeded());
        assert!(!painter.is_busy());
        assert_eq!(painter.update(Point::new(1, 1)), Ok(None));
        painter.end().unwrap();
        assert_eq!(painter.source(), &before);
    }

    #[test]
    fn rejected_press_keeps_the_open_gesture() {
        let mut painter = Painter::new(walled(), FillOptions::default());
        painter.begin(Point::new(1, 1), &["#f00", "#f00"]).unwrap();
        let scratch = painter.scratch().clone();

        assert!(painter.begin(Point::new(1, 1), &["#f00", "bogus"]).is_err());
        assert!(painter.is_seeded());
        assert_eq!(painter.session().unwrap().source_point(), Point::new(1, 1));
        assert_eq!(painter.scratch(), &scratch);

        // the kept gesture still commits normally
        painter.end().unwrap();
        assert_eq!(painter.source().get(1, 1), RED);
    }

    #[test]
    fn busy_guard_raises_and_clears_the_flag() {
        let flag = AtomicBool::new(false);
        {
            let _busy = BusyGuard::raise(&flag);
            assert!(flag.load(Ordering::Acquire));
        }
        assert!(!flag.load(Ordering::Acquire));

        let failing = |flag: &AtomicBool| -> Result<(), Error> {
            let _busy = BusyGuard::raise(flag);
            assert!(flag.load(Ordering::Acquire));
            Err(Error::MissingSurfaceContext)
        };
        assert!(failing(&flag).is_err());
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn busy_flag_is_shared_with_the_painter() {
        let painter = Painter::new(walled(), FillOptions::default());
        let shared = painter.busy_flag();
        {
            let _busy = BusyGuard::raise(&painter.busy);
            assert!(painter.is_busy());
            assert!(shared.load(Ordering::Acquire));
        }
        assert!(!painter.is_busy());
        assert!(!shared.load(Ordering::Acquire));
    }

    #[test]
    fn busy_is_raised_while_a_pass_runs_on_another_thread() {
        use std::sync::mpsc;
        use std::thread;

        let mut painter = Painter::new(PixelBuffer::filled(256, 256, Colour::WHITE), FillOptions::default());
        let flag = painter.busy_flag();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (seen_tx, seen_rx) = mpsc::channel();
        let watcher = thread::spawn(move || {
            while stop_rx.try_recv().is_err() {
                if flag.load(Ordering::Acquire) {
                    let _ = seen_tx.send(());
                    return;
                }
                thread::yield_now();
            }
        });

        // keep passes running until the watcher catches one in progress
        let mut seen = false;
        for _ in 0..2000 {
            painter.begin(Point::new(0, 0), &["#f00", "#00f"]).unwrap();
            painter.update(Point::new(255, 255)).unwrap();
            painter.end().unwrap();
            if seen_rx.try_recv().is_ok() {
                seen = true;
                break;
            }
        }
        let _ = stop_tx.send(());
        watcher.join().unwrap();
        assert!(seen || seen_rx.try_recv().is_ok());
        assert!(!painter.is_busy());
    }

    #[test]
    fn compose_shows_scratch_over_source() {
        let mut painter = Painter::new(walled(), FillOptions::default());
        painter.begin(Point::new(0, 0), &["#00f", "#00f"]).unwrap();
        let mut out = PixelBuffer::new(8, 8);
        painter.compose(&mut out).unwrap();
        assert_eq!(out.get(0, 0), BLUE);
        assert_eq!(out.get(6, 0), Colour::WHITE);
    }
}
