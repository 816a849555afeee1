// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use de2_mixer::format::FormatInfo;
    use de2_mixer::layer::router;
    use de2_mixer::layer::ColorProperties;
    use de2_mixer::layer::PlaneRegistrar;
    use de2_mixer::layer::UpdateError;
    use de2_mixer::layer::ZposRange;
    use de2_mixer::regmap::memory::MemoryRegisterMap;
    use de2_mixer::regs;
    use de2_mixer::state::CrtcState;
    use de2_mixer::state::Framebuffer;
    use de2_mixer::state::FramebufferPlane;
    use de2_mixer::state::OutputTiming;
    use de2_mixer::DrmFourcc;
    use de2_mixer::Mixer;
    use de2_mixer::MixerConfig;
    use de2_mixer::PlaneState;
    use de2_mixer::Rect;
    use de2_mixer::VideoLayer;

    /// Accepts every plane, like a framework with plenty of memory.
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

    const TIMING: OutputTiming = OutputTiming {
        clock_khz: 74_250,
        hdisplay: 1280,
        htotal: 1650,
        vdisplay: 720,
        vtotal: 750,
    };

    /// A mixer with two VI layers and a register block fresh out of reset.
    struct Display {
        mixer: Rc<Mixer>,
        layers: Vec<VideoLayer>,
        committed: Vec<PlaneState>,
        regs: MemoryRegisterMap,
    }

    impl Display {
        fn new() -> Self {
            let _ = env_logger::try_init();

            let mixer = Rc::new(Mixer::new(MixerConfig::v3s_mixer()).unwrap());
            let layers = mixer.create_video_layers(&mut NullRegistrar).unwrap();
            let committed = layers.iter().map(VideoLayer::reset_state).collect();
            let mut regs = MemoryRegisterMap::new();
            mixer.reset(&mut regs).unwrap();
            regs.clear_log();

            Self { mixer, layers, committed, regs }
        }

        /// Checks and commits `states`, one per layer, as one batch in layer order.
        fn commit(&mut self, mut states: Vec<PlaneState>) -> Result<(), UpdateError> {
            for (layer, state) in self.layers.iter().zip(states.iter_mut()) {
                layer.check(state).unwrap();
            }

            for (i, layer) in self.layers.iter().enumerate() {
                layer.atomic_update(&mut self.regs, &self.committed[i], &states[i])?;
                self.committed[i] = states[i].clone();
            }

            Ok(())
        }

        fn binding(&mut self, pipe: u32) -> Option<u32> {
            router::pipe_binding(&mut self.regs, &self.mixer, pipe).unwrap()
        }

        fn layer_enabled(&self, channel: u32) -> bool {
            let attr = regs::chan_vi_layer_attr(self.mixer.channel_base(channel), 0);
            self.regs.peek(attr) & regs::CHAN_VI_LAYER_ATTR_EN != 0
        }
    }

    fn framebuffer(fourcc: DrmFourcc, width: u32, height: u32) -> Framebuffer {
        let format = FormatInfo::lookup(fourcc).unwrap();
        let planes = (0..format.num_planes)
            .map(|i| {
                let hsub = if i == 0 { 1 } else { format.hsub };
                FramebufferPlane {
                    dma_addr: 0x4800_0000,
                    offset: i as u32 * width * height * 4,
                    pitch: width * format.cpp[i] / hsub,
                }
            })
            .collect();

        Framebuffer { format, planes }
    }

    fn shown(fourcc: DrmFourcc, dst: Rect, zpos: u32) -> PlaneState {
        PlaneState {
            crtc: Some(CrtcState { enabled: true, timing: TIMING }),
            fb: Some(framebuffer(fourcc, 640, 480)),
            src: Rect::fixed(0, 0, 640, 480),
            dst,
            zpos,
            ..Default::default()
        }
    }

    fn hidden(zpos: u32) -> PlaneState {
        PlaneState { zpos, ..Default::default() }
    }

    #[test]
    fn test_two_layers_swap_pipes_in_one_batch() {
        let mut display = Display::new();

        display
            .commit(vec![
                shown(DrmFourcc::Nv12, Rect::new(0, 0, 1280, 720), 0),
                shown(DrmFourcc::Xrgb8888, Rect::new(100, 100, 640, 480), 1),
            ])
            .unwrap();
        assert_eq!(display.binding(0), Some(0));
        assert_eq!(display.binding(1), Some(1));

        // Channel 0 moves up first and takes pipe 1 from channel 1. Channel 1 must then leave
        // pipe 1 alone when it moves down.
        display
            .commit(vec![
                shown(DrmFourcc::Nv12, Rect::new(0, 0, 1280, 720), 1),
                shown(DrmFourcc::Xrgb8888, Rect::new(100, 100, 640, 480), 0),
            ])
            .unwrap();
        assert_eq!(display.binding(0), Some(1));
        assert_eq!(display.binding(1), Some(0));
        assert!(display.layer_enabled(0));
        assert!(display.layer_enabled(1));

        let bld_base = display.mixer.blender_base();
        assert_eq!(
            display.regs.peek(regs::blend_attr_insize(bld_base, 1)),
            regs::size(1280, 720)
        );
        assert_eq!(display.regs.peek(regs::blend_attr_coord(bld_base, 0)), regs::coord(100, 100));
    }

    #[test]
    fn test_recommit_does_not_touch_routing() {
        let mut display = Display::new();
        let states = vec![
            shown(DrmFourcc::Yuyv, Rect::new(0, 0, 320, 240), 2),
            shown(DrmFourcc::Rgb565, Rect::new(320, 0, 640, 480), 0),
        ];

        display.commit(states.clone()).unwrap();
        display.regs.clear_log();
        display.commit(states).unwrap();

        let bld_base = display.mixer.blender_base();
        assert!(display.regs.writes_to(regs::blend_route(bld_base)).is_empty());
        assert!(display.regs.writes_to(regs::blend_pipe_ctl(bld_base)).is_empty());
        assert_eq!(display.binding(2), Some(0));
        assert_eq!(display.binding(0), Some(1));
    }

    #[test]
    fn test_pipe_follows_latest_owner() {
        let mut display = Display::new();
        let dst = Rect::new(0, 0, 640, 480);

        display.commit(vec![shown(DrmFourcc::Nv12, dst, 2), hidden(1)]).unwrap();
        assert_eq!(display.binding(2), Some(0));

        display.commit(vec![hidden(2), shown(DrmFourcc::Nv21, dst, 2)]).unwrap();
        assert_eq!(display.binding(2), Some(1));
        assert!(!display.layer_enabled(0));

        display.commit(vec![shown(DrmFourcc::Nv12, dst, 2), hidden(2)]).unwrap();
        assert_eq!(display.binding(2), Some(0));
        assert!(!display.layer_enabled(1));
        // Nothing else got enabled on the way.
        assert_eq!(display.binding(0), None);
        assert_eq!(display.binding(1), None);
    }

    #[test]
    fn test_offscreen_layer_is_disabled() {
        let mut display = Display::new();

        display
            .commit(vec![shown(DrmFourcc::Xrgb8888, Rect::new(0, 0, 640, 480), 1), hidden(0)])
            .unwrap();
        assert!(display.layer_enabled(0));

        display
            .commit(vec![shown(DrmFourcc::Xrgb8888, Rect::new(1280, 0, 640, 480), 1), hidden(0)])
            .unwrap();
        assert!(!display.layer_enabled(0));
        assert_eq!(display.binding(1), None);
    }

    #[test]
    fn test_unsupported_format_leaves_hardware_alone() {
        let mut display = Display::new();
        let dst = Rect::new(0, 0, 640, 480);

        display.commit(vec![shown(DrmFourcc::Nv12, dst, 0), hidden(1)]).unwrap();
        let before = display.regs.snapshot();

        let mut state = shown(DrmFourcc::Nv42, dst, 1);
        state.visible = true;
        let err = display.layers[0].atomic_update(&mut display.regs, &display.committed[0], &state);

        assert_eq!(err, Err(UpdateError::UnsupportedFormat(DrmFourcc::Nv42)));
        assert_eq!(display.regs.snapshot(), before);
    }
}
