use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Demo configuration, filled from command-line arguments.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// PNG written after rendering.
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Cells per side of each demo grid.
    pub grid_size: u32,
    /// Allow a software adapter (CI machines without a GPU).
    pub software: bool,
    /// `env_logger` filter override.
    pub log_filter: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("heatmaps.png"),
            width: 800,
            height: 600,
            grid_size: 64,
            software: false,
            log_filter: None,
        }
    }
}

/// Largest `--grid` accepted; wgpu's default 2-D texture size limit.
pub const MAX_GRID_SIZE: u32 = 8192;

const USAGE: &str = "usage: ember-studio [--out FILE] [--size WxH] [--grid N] [--software] [--log FILTER]";

impl StudioConfig {
    /// Parses `args` (without the program name).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => config.output = PathBuf::from(value(&mut args, "--out")?),
                "--size" => {
                    let v = value(&mut args, "--size")?;
                    (config.width, config.height) = parse_size(&v)?;
                }
                "--grid" => {
                    let v = value(&mut args, "--grid")?;
                    config.grid_size = v.parse().with_context(|| format!("invalid grid size {v:?}"))?;
                    if config.grid_size == 0 || config.grid_size > MAX_GRID_SIZE {
                        bail!("grid size must be in 1..={MAX_GRID_SIZE}, got {}", config.grid_size);
                    }
                }
                "--software" => config.software = true,
                "--log" => config.log_filter = Some(value(&mut args, "--log")?),
                "-h" | "--help" => bail!("{USAGE}"),
                other => bail!("unknown argument {other:?}\n{USAGE}"),
            }
        }

        Ok(config)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().with_context(|| format!("{flag} expects a value"))
}

fn parse_size(v: &str) -> Result<(u32, u32)> {
    let (w, h) = v
        .split_once('x')
        .with_context(|| format!("size must look like WIDTHxHEIGHT, got {v:?}"))?;
    let w: u32 = w.parse().with_context(|| format!("invalid width in {v:?}"))?;
    let h: u32 = h.parse().with_context(|| format!("invalid height in {v:?}"))?;
    if w == 0 || h == 0 {
        bail!("size must be non-zero, got {v:?}");
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<StudioConfig> {
        StudioConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_args() {
        let c = parse(&[]).unwrap();
        assert_eq!((c.width, c.height, c.grid_size), (800, 600, 64));
        assert!(!c.software);
    }

    #[test]
    fn all_flags() {
        let c = parse(&["--out", "a.png", "--size", "320x200", "--grid", "8", "--software", "--log", "debug"])
            .unwrap();
        assert_eq!(c.output, PathBuf::from("a.png"));
        assert_eq!((c.width, c.height), (320, 200));
        assert_eq!(c.grid_size, 8);
        assert!(c.software);
        assert_eq!(c.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn grid_size_upper_bound_is_inclusive() {
        assert_eq!(parse(&["--grid", "8192"]).unwrap().grid_size, MAX_GRID_SIZE);
        assert!(parse(&["--grid", "8193"]).is_err());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--size", "10"]).is_err());
        assert!(parse(&["--size", "0x10"]).is_err());
        assert!(parse(&["--grid", "0"]).is_err());
        assert!(parse(&["--grid", "65536"]).is_err());
        assert!(parse(&["--out"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }
}
