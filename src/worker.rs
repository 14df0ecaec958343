// Background painter: a thread that owns the Painter and takes one action at a time.
// The window thread only sends actions and picks up finished frames, so a slow
// fill never stalls input handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::error::Error;
use crate::session::{FillOptions, Painter};
use crate::types::{PixelBuffer, Point};

/// What the input side can ask for. Ordering per gesture is `Begin`, `Update*`, `End`.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Begin { point: Point, colours: Vec<String> },
    Update { point: Point },
    End,
    Shutdown,
}

/// What comes back.
#[derive(Debug)]
pub enum Event {
    /// Source with the current scratch layer on top, ready to display.
    Frame(PixelBuffer),
    /// The action was rejected; nothing was drawn for it.
    Rejected(Error),
}

pub struct PaintWorker {
    actions: Sender<Action>,
    events: Receiver<Event>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PaintWorker {
    pub fn spawn(source: PixelBuffer, options: FillOptions) -> Result<Self, Error> {
        let painter = Painter::new(source, options);
        let busy = painter.busy_flag();
        let (action_tx, action_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("paint-worker".into())
            .spawn(move || run(painter, action_rx, event_tx))
            .map_err(|e| Error::WorkerSpawn(format!("could not start paint worker: {e}")))?;
        log::debug!("paint worker started");

        Ok(Self { actions: action_tx, events: event_rx, busy, handle: Some(handle) })
    }

    pub fn send(&self, action: Action) -> Result<(), Error> {
        self.actions.send(action).map_err(|_| Error::WorkerGone)
    }

    /// True while the worker is inside a fill or composite pass.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Drain finished events and keep only the newest frame.
    /// Rejections are logged and dropped.
    pub fn latest_frame(&self) -> Result<Option<PixelBuffer>, Error> {
        let mut latest = None;
        loop {
            match self.events.try_recv() {
                Ok(Event::Frame(frame)) => latest = Some(frame),
                Ok(Event::Rejected(e)) => log::warn!("gesture dropped: {e}"),
                Err(TryRecvError::Empty) => return Ok(latest),
                Err(TryRecvError::Disconnected) => {
                    return if latest.is_some() { Ok(latest) } else { Err(Error::WorkerGone) };
                }
            }
        }
    }

    /// Stop the thread and hand back whatever it produced but nobody collected.
    pub fn shutdown(mut self) -> Vec<Event> {
        self.stop();
        self.events.try_iter().collect()
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // a dead worker cannot receive; join still reaps it
            let _ = self.actions.send(Action::Shutdown);
            if handle.join().is_err() {
                log::error!("paint worker panicked");
            }
            log::debug!("paint worker stopped");
        }
    }
}

impl Drop for PaintWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut painter: Painter, actions: Receiver<Action>, events: Sender<Event>) {
    let mut pending: Option<Action> = None;
    loop {
        let action = match pending.take() {
            Some(a) => a,
            None => match actions.recv() {
                Ok(a) => a,
                Err(_) => break,
            },
        };

        let result = match action {
            Action::Begin { point, colours } => painter.begin(point, colours.as_slice()),
            Action::Update { point } => {
                let point = coalesce_moves(point, &actions, &mut pending);
                painter.update(point).map(|_| ())
            }
            Action::End => painter.end(),
            Action::Shutdown => break,
        };

        let event = match result {
            Ok(()) => {
                let mut frame = PixelBuffer::new(painter.source().width(), painter.source().height());
                match painter.compose(&mut frame) {
                    Ok(()) => Event::Frame(frame),
                    Err(e) => Event::Rejected(e),
                }
            }
            Err(e) => Event::Rejected(e),
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

/// Skip over queued moves so only the newest position is rendered.
/// The first non-move action found is parked in `pending`.
fn coalesce_moves(mut point: Point, actions: &Receiver<Action>, pending: &mut Option<Action>) -> Point {
    let mut skipped = 0;
    while let Ok(next) = actions.try_recv() {
        match next {
            Action::Update { point: p } => {
                point = p;
                skipped += 1;
            }
            other => {
                *pending = Some(other);
                break;
            }
        }
    }
    if skipped > 0 {
        log::debug!("coalesced {skipped} queued moves");
    }
    point
}
