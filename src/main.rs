// What you SEE:
// • The source picture (a file, one webcam frame, or generated line art).
// • Press inside a region: it floods with the first colour of the gradient.
// • Drag: the gradient turns toward the pointer and stretches with the drag.
// • Release: the result is baked in and becomes part of the picture.
// • 1..9 pick a colour (fading to white), R picks the rainbow. ESC quits.

use std::time::{Duration, Instant};

use gradient_fill::camera::capture_still;
use gradient_fill::config::{Config, SourceKind};
use gradient_fill::draw::{Drawer, blit, draw_crosshair, draw_text_5x7, line_art};
use gradient_fill::logging::{LoggingConfig, init_logging};
use gradient_fill::types::FrameBuffer;
use gradient_fill::worker::{Action, PaintWorker};
use gradient_fill::{Error, PixelBuffer, Point};

const RAINBOW: [&str; 9] = [
    "#ff2929", // red
    "#ff7a29", // orange
    "#fad02e", // yellow
    "#bf7f35", // brown
    "#91fa49", // green
    "#36d8b7", // turquoise
    "#991ef9", // violet
    "#3b8aff", // blue
    "#ff5dcd", // pink
];

fn main() -> Result<(), Error> {
    let cfg = Config::from_args(std::env::args().skip(1))?;
    init_logging(LoggingConfig { env_filter: cfg.log_filter.clone(), ..LoggingConfig::default() });

    /* --- Source picture + window ---
       Visual: window opens showing the picture to colour in. */
    let source = load_source(&cfg)?;
    let (w, h) = (source.width(), source.height());
    log::info!("source is {w}x{h} ({:?})", cfg.source);
    let mut drawer = Drawer::new("Gradient Fill", w, h)?;

    /* --- Background painter ---
       Visual: nothing yet; it answers every gesture step with a finished frame. */
    let worker = PaintWorker::spawn(source.clone(), cfg.fill)?;
    let mut painting = source;
    let mut screen = FrameBuffer::new(w, h);

    let mut colours = cfg.colours.clone();
    let mut was_down = false;
    let mut last_point: Option<Point> = None;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Colour choice applies to the next press, never mid-gesture. */
        if let Some(i) = drawer.palette_key() {
            colours = vec![RAINBOW[i].to_string(), "#FFFFFF".to_string()];
            log::info!("colours: {colours:?}");
        }
        if drawer.r_pressed_once() {
            colours = RAINBOW.iter().map(|c| c.to_string()).collect();
            log::info!("colours: rainbow");
        }

        /* 2) Pointer -> gesture actions (press = Begin, drag = Update, release = End). */
        let down = drawer.left_mouse_down();
        let pos = drawer
            .mouse_pos()
            .map(|(x, y)| Point::new(x.min(w - 1), y.min(h - 1)));
        match (was_down, down, pos) {
            (false, true, Some(p)) => {
                worker.send(Action::Begin { point: p, colours: colours.clone() })?;
                last_point = Some(p);
            }
            (true, true, Some(p)) if last_point != Some(p) => {
                worker.send(Action::Update { point: p })?;
                last_point = Some(p);
            }
            (true, false, _) => {
                worker.send(Action::End)?;
                last_point = None;
            }
            _ => {}
        }
        was_down = down;

        /* 3) Show the newest finished frame; older ones are skipped. */
        if let Some(frame) = worker.latest_frame()? {
            painting = frame;
        }
        blit(&painting, &mut screen)?;

        /* 4) Overlays: crosshair + HUD. */
        if let Some((mx, my)) = drawer.mouse_pos() {
            draw_crosshair(&mut screen, mx as i32, my as i32, 12, 0x00_FF_CC_33);
        }
        let status = if down || worker.is_busy() { "FILL" } else { "IDLE" };
        draw_text_5x7(&mut screen, 8, 8, &format!("{status} | {hud_fps_text}"), 0x00_FF_FF_FF);

        drawer.present(&screen)?;

        frames_this_second += 1;
        let elapsed = now.duration_since(last_fps_time);
        if elapsed >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / elapsed.as_secs_f32();
            log::debug!("FPS: {fps:.1}");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    let leftover = worker.shutdown();
    log::debug!("{} undelivered events at exit", leftover.len());
    Ok(())
}

fn load_source(cfg: &Config) -> Result<PixelBuffer, Error> {
    let source = match &cfg.source {
        SourceKind::Image(path) => {
            let img = image::open(path)?.to_rgba8();
            let (w, h) = img.dimensions();
            PixelBuffer::from_rgba(w as usize, h as usize, img.into_raw())
        }
        SourceKind::Camera(index) => capture_still(*index, cfg.width as u32, cfg.height as u32),
        SourceKind::LineArt => Ok(line_art(cfg.width, cfg.height)),
    }?;
    if source.is_empty() {
        return Err(Error::ImageLoad("source image has no pixels".into()));
    }
    Ok(source)
}
