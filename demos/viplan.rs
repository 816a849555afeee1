// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! viplan, a small tool that runs one VI layer commit against an in-memory register block and
//! prints the resulting scaling plan and register writes. The output timing can be given on the
//! command line or read from the first active CRTC of a DRM card.

use std::fs::File;
use std::os::fd::AsFd;
use std::os::fd::BorrowedFd;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::anyhow;
use anyhow::Context;
use argh::FromArgs;
use drm::control::Device as _;

use de2_mixer::format::FormatInfo;
use de2_mixer::layer::ColorProperties;
use de2_mixer::layer::PlaneRegistrar;
use de2_mixer::layer::ZposRange;
use de2_mixer::regmap::memory::MemoryRegisterMap;
use de2_mixer::state::CrtcState;
use de2_mixer::state::Framebuffer;
use de2_mixer::state::FramebufferPlane;
use de2_mixer::state::OutputTiming;
use de2_mixer::DrmFourcc;
use de2_mixer::Mixer;
use de2_mixer::MixerConfig;
use de2_mixer::PlaneState;
use de2_mixer::Rect;

/// A rectangle given as `WIDTHxHEIGHT+X+Y`.
#[derive(Debug, Copy, Clone)]
struct RectArg {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl FromStr for RectArg {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const USAGE: &str = "rectangles are given as WIDTHxHEIGHT+X+Y";

        let mut parts = s.split('+');
        let size = parts.next().ok_or(USAGE)?;
        let x = parts.next().unwrap_or("0").parse().map_err(|_| USAGE)?;
        let y = parts.next().unwrap_or("0").parse().map_err(|_| USAGE)?;
        let (width, height) = size.split_once('x').ok_or(USAGE)?;

        Ok(RectArg {
            x,
            y,
            width: width.parse().map_err(|_| USAGE)?,
            height: height.parse().map_err(|_| USAGE)?,
        })
    }
}

/// A pixel format given by its four character code, e.g. NV12 or XR24.
#[derive(Debug, Copy, Clone)]
struct FourccArg(DrmFourcc);

impl FromStr for FourccArg {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: [u8; 4] = s.as_bytes().try_into().map_err(|_| "fourcc must be 4 characters")?;
        DrmFourcc::try_from(u32::from_le_bytes(code))
            .map(FourccArg)
            .map_err(|_| "unknown fourcc")
    }
}

/// Plans and programs one VI layer commit
#[derive(Debug, FromArgs)]
struct Args {
    /// mixer preset, e.g. h3, v3s, a64-mixer1 or h6. Default: h3
    #[argh(option, default = "String::from(\"h3\")")]
    mixer: String,

    /// pixel format of the framebuffer. Default: NV12
    #[argh(option, default = "FourccArg(DrmFourcc::Nv12)")]
    format: FourccArg,

    /// source rectangle in framebuffer pixels, WIDTHxHEIGHT+X+Y
    #[argh(option)]
    src: RectArg,

    /// destination rectangle on the output, WIDTHxHEIGHT+X+Y
    #[argh(option)]
    dst: RectArg,

    /// blender pipe to place the layer in. Default: 0
    #[argh(option, default = "0")]
    zpos: u32,

    /// DRM card to read the output timing from, e.g. /dev/dri/card0
    #[argh(option)]
    card: Option<PathBuf>,

    /// output mode as HDISPLAYxVDISPLAY@CLOCK_KHZ/HTOTALxVTOTAL, used without --card.
    /// Default: 1920x1080@148500/2200x1125
    #[argh(option)]
    mode: Option<String>,
}

fn parse_mode(s: &str) -> anyhow::Result<OutputTiming> {
    let err = || anyhow!("invalid mode {s:?}, expected HDISPLAYxVDISPLAY@CLOCK_KHZ/HTOTALxVTOTAL");

    let (active, rest) = s.split_once('@').ok_or_else(err)?;
    let (clock, total) = rest.split_once('/').ok_or_else(err)?;
    let (hdisplay, vdisplay) = active.split_once('x').ok_or_else(err)?;
    let (htotal, vtotal) = total.split_once('x').ok_or_else(err)?;

    Ok(OutputTiming {
        clock_khz: clock.parse()?,
        hdisplay: hdisplay.parse()?,
        htotal: htotal.parse()?,
        vdisplay: vdisplay.parse()?,
        vtotal: vtotal.parse()?,
    })
}

/// A simple wrapper for a DRM card node.
struct Card(File);

impl AsFd for Card {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl drm::Device for Card {}
impl drm::control::Device for Card {}

impl Card {
    fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        std::fs::OpenOptions::new().read(true).write(true).open(path).map(Card)
    }
}

/// Reads the timing of the first CRTC that has a mode set.
fn card_timing(path: &Path) -> anyhow::Result<OutputTiming> {
    let card = Card::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let resources = card.resource_handles().context("failed to get DRM resources")?;

    for &handle in resources.crtcs() {
        let Some(mode) = card.get_crtc(handle)?.mode() else {
            continue;
        };

        let (hdisplay, vdisplay) = mode.size();
        log::info!("Using mode {:?} of CRTC {:?}", mode.name(), handle);

        return Ok(OutputTiming {
            clock_khz: mode.clock(),
            hdisplay: hdisplay.into(),
            htotal: mode.hsync().2.into(),
            vdisplay: vdisplay.into(),
            vtotal: mode.vsync().2.into(),
        });
    }

    Err(anyhow!("no active CRTC on {}", path.display()))
}

/// Prints the plane properties instead of registering them anywhere.
struct PrintingRegistrar;

impl PlaneRegistrar for PrintingRegistrar {
    fn init_plane(&mut self, formats: &[DrmFourcc]) -> anyhow::Result<()> {
        println!("plane: {} formats", formats.len());
        Ok(())
    }

    fn add_zpos_property(&mut self, zpos: &ZposRange) -> anyhow::Result<()> {
        println!("  zpos: {} in [{}, {}]", zpos.initial, zpos.min, zpos.max);
        Ok(())
    }

    fn add_color_properties(&mut self, color: &ColorProperties) -> anyhow::Result<()> {
        println!("  color: {:?} {:?}", color.default_encoding, color.default_range);
        Ok(())
    }
}

fn framebuffer(format: &'static FormatInfo, width: u32, height: u32) -> Framebuffer {
    let luma_size = width * height * format.cpp[0];
    let planes = (0..format.num_planes)
        .map(|i| {
            let (pitch, offset) = if i == 0 {
                (width * format.cpp[0], 0)
            } else {
                let chroma_size = width / format.hsub * height / format.vsub * format.cpp[i];
                (width / format.hsub * format.cpp[i], luma_size + (i as u32 - 1) * chroma_size)
            };

            FramebufferPlane { dma_addr: 0x4000_0000, offset, pitch }
        })
        .collect();

    Framebuffer { format, planes }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Args = argh::from_env();

    let cfg = MixerConfig::preset(&args.mixer)
        .ok_or_else(|| anyhow!("unknown mixer preset {:?}", args.mixer))?;
    let mixer = Rc::new(Mixer::new(cfg)?);
    let layers = mixer.create_video_layers(&mut PrintingRegistrar)?;
    let layer = layers.first().ok_or_else(|| anyhow!("mixer has no VI channel"))?;

    let timing = match (&args.card, &args.mode) {
        (Some(card), _) => card_timing(card)?,
        (None, Some(mode)) => parse_mode(mode)?,
        (None, None) => parse_mode("1920x1080@148500/2200x1125")?,
    };
    println!("timing: {:?}, {:?} Hz", timing, timing.refresh_rate());

    let format = FormatInfo::lookup(args.format.0)
        .ok_or_else(|| anyhow!("{:?} has no format description", args.format.0))?;
    let (src, dst) = (args.src, args.dst);
    let fb_width = (src.x + src.width).max(1) as u32;
    let fb_height = (src.y + src.height).max(1) as u32;

    let mut state = PlaneState {
        crtc: Some(CrtcState { enabled: true, timing }),
        fb: Some(framebuffer(format, fb_width, fb_height)),
        src: Rect::fixed(src.x, src.y, src.width, src.height),
        dst: Rect::new(dst.x, dst.y, dst.width, dst.height),
        zpos: args.zpos,
        ..layer.reset_state()
    };
    layer.check(&mut state)?;

    if !state.visible {
        println!("layer is not visible");
        return Ok(());
    }

    let (geometry, plan) = layer.scaling_plan(&state)?;
    println!("geometry: {:?}", geometry);
    println!("plan: {:?}", plan);

    let mut regs = MemoryRegisterMap::new();
    mixer.reset(&mut regs)?;
    regs.clear_log();

    layer.atomic_update(&mut regs, &layer.reset_state(), &state)?;

    for (reg, val) in regs.writes() {
        println!("{:#07x} <- {:#010x}", reg, val);
    }

    Ok(())
}
