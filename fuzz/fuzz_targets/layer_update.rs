#![no_main]

use std::rc::Rc;

use de2_mixer::format::ColorEncoding;
use de2_mixer::format::ColorRange;
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
use libfuzzer_sys::fuzz_target;

struct NullRegistrar;

impl PlaneRegistrar for NullRegistrar {
    fn init_plane(&mut self, _: &[DrmFourcc]) -> anyhow::Result<()> {
        Ok(())
    }

    fn add_zpos_property(&mut self, _: &ZposRange) -> anyhow::Result<()> {
        Ok(())
    }

    fn add_color_properties(&mut self, _: &ColorProperties) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Hands out little-endian integers from the fuzzer input, then zeroes.
struct Input<'a>(&'a [u8]);

impl Input<'_> {
    fn u32(&mut self) -> u32 {
        let n = self.0.len().min(4);
        let (head, tail) = self.0.split_at(n);
        self.0 = tail;
        head.iter().rev().fold(0, |acc, b| (acc << 8) | u32::from(*b))
    }

    fn u16(&mut self) -> u32 {
        self.u32() & 0xffff
    }

    /// A 16.16 coordinate or extent small enough that rectangle arithmetic cannot overflow.
    fn fixed(&mut self) -> i32 {
        (self.u32() & 0x3fff_ffff) as i32
    }

    /// A pixel coordinate that may lie left of or above the output.
    fn pixel(&mut self) -> i32 {
        self.u16() as i32 - 0x8000
    }

    fn extent(&mut self) -> i32 {
        (self.u16() & 0x3fff) as i32
    }
}

fn plane_state(input: &mut Input, formats: &[DrmFourcc], pipes: u32) -> PlaneState {
    let fourcc = formats[input.u32() as usize % formats.len()];
    let format = FormatInfo::lookup(fourcc);
    let planes = (0..3)
        .map(|_| FramebufferPlane {
            dma_addr: u64::from(input.u32()),
            offset: input.u16(),
            pitch: input.u16(),
        })
        .collect();

    let timing = OutputTiming {
        clock_khz: input.u32(),
        hdisplay: input.u16(),
        htotal: input.u16(),
        vdisplay: input.u16(),
        vtotal: input.u16(),
    };

    PlaneState {
        crtc: Some(CrtcState { enabled: input.u32() & 1 == 1, timing }),
        fb: format.map(|format| Framebuffer { format, planes }),
        src: Rect::new(input.fixed(), input.fixed(), input.fixed(), input.fixed()),
        dst: Rect::new(input.pixel(), input.pixel(), input.extent(), input.extent()),
        zpos: input.u32() % pipes,
        color_encoding: ColorEncoding::n(input.u32() & 1).unwrap_or_default(),
        color_range: ColorRange::n(input.u32() & 1).unwrap_or_default(),
        visible: false,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut input = Input(data);
    let preset = ["h3", "v3s", "a64", "h6"][input.u32() as usize % 4];
    let Some(cfg) = MixerConfig::preset(preset) else {
        return;
    };
    let pipes = cfg.plane_count();
    let Ok(mixer) = Mixer::new(cfg) else {
        return;
    };
    let mixer = Rc::new(mixer);
    let Ok(layers) = mixer.create_video_layers(&mut NullRegistrar) else {
        return;
    };

    let mut regs = MemoryRegisterMap::new();
    let _ = mixer.reset(&mut regs);

    for layer in &layers {
        let old = layer.reset_state();
        let formats = layer.capabilities().formats;
        let mut new = plane_state(&mut input, formats, pipes);

        if layer.check(&mut new).is_ok() {
            let _ = layer.atomic_update(&mut regs, &old, &new);
        }
    }
});
