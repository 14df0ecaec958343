// Startup configuration: defaults plus command-line overrides.
//
//   --image PATH          fill regions of a PNG/JPEG
//   --camera INDEX        fill regions of one webcam snapshot
//   --size WxH            canvas size for the generated line art
//   --threshold N         per-channel match tolerance (default 5)
//   --alpha-threshold N   alpha below this counts as white (default 1)
//   --brightness N        greys brighter than this count as white (default 180)
//   --colour C            gradient stop; repeat for more stops
//   --log FILTER          env_logger filter, overrides RUST_LOG

use std::path::PathBuf;

use crate::colour::parse_colours;
use crate::error::Error;
use crate::session::FillOptions;

/// Where the source image comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    Image(PathBuf),
    Camera(u32),
    LineArt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub source: SourceKind,
    pub width: usize,
    pub height: usize,
    pub fill: FillOptions,
    pub colours: Vec<String>,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::LineArt,
            width: 800,
            height: 600,
            fill: FillOptions::default(),
            colours: vec!["#FF0000".into(), "#FFFFFF".into()],
            log_filter: None,
        }
    }
}

impl Config {
    /// Parse flags (without the program name). Colours are checked here so a
    /// typo fails at startup rather than at the first click.
    pub fn from_args<I, S>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cfg = Config::default();
        let mut colours: Vec<String> = Vec::new();
        let mut args = args.into_iter().map(Into::<String>::into);

        while let Some(flag) = args.next() {
            let mut value = || args.next().ok_or_else(|| Error::Config(format!("{flag} needs a value")));
            match flag.as_str() {
                "--image" => cfg.source = SourceKind::Image(PathBuf::from(value()?)),
                "--camera" => cfg.source = SourceKind::Camera(number(&flag, &value()?)?),
                "--size" => {
                    let (w, h) = size(&value()?)?;
                    cfg.width = w;
                    cfg.height = h;
                }
                "--threshold" => cfg.fill.matching.threshold = number(&flag, &value()?)?,
                "--alpha-threshold" => cfg.fill.matching.alpha_threshold = number(&flag, &value()?)?,
                "--brightness" => cfg.fill.matching.brightness_threshold = number(&flag, &value()?)?,
                "--colour" | "--color" => colours.push(value()?),
                "--log" => cfg.log_filter = Some(value()?),
                other => return Err(Error::Config(format!("unknown flag {other}"))),
            }
        }

        if !colours.is_empty() {
            cfg.colours = colours;
        }
        let parsed = parse_colours(cfg.colours.as_slice())?;
        if parsed.len() < 2 {
            return Err(Error::InsufficientColours(parsed.len()));
        }
        Ok(cfg)
    }
}

fn number<T: std::str::FromStr>(flag: &str, v: &str) -> Result<T, Error> {
    v.parse().map_err(|_| Error::Config(format!("{flag}: bad number {v:?}")))
}

fn size(v: &str) -> Result<(usize, usize), Error> {
    let bad = || Error::Config(format!("--size: expected WxH, got {v:?}"));
    let (w, h) = v.split_once(['x', 'X']).ok_or_else(bad)?;
    let w: usize = w.trim().parse().map_err(|_| bad())?;
    let h: usize = h.trim().parse().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(bad());
    }
    Ok((w, h))
}
