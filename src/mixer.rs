// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Mixer instances: per-SoC configuration, register block layout and blender reset.

use std::rc::Rc;

use thiserror::Error;

use crate::layer::planner::ScalerTuning;
use crate::layer::InitError;
use crate::layer::PlaneRegistrar;
use crate::layer::VideoLayer;
use crate::regmap::RegisterMap;
use crate::regmap::RegmapResult;
use crate::regs;

/// Static description of one mixer instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixerConfig {
    /// Which set of channel colour-space converters this mixer uses (0 or 1). Unused on DE3.
    pub ccsc: usize,
    /// DE3 register layout.
    pub is_de3: bool,
    /// Module clock rate in Hz.
    pub mod_rate: u64,
    /// Bit `n` is set if channel `n` has a scaler.
    pub scaler_mask: u32,
    /// Scanline buffer capacity of the scaler for YUV formats, in pixels.
    pub scanline_yuv: u32,
    /// Number of UI channels.
    pub ui_num: u32,
    /// Number of VI channels. VI channels come first.
    pub vi_num: u32,
}

impl MixerConfig {
    pub fn a83t_mixer0() -> Self {
        Self { mod_rate: 297_000_000, ..Self::h3_mixer0() }
    }

    pub fn a83t_mixer1() -> Self {
        Self::r40_mixer1()
    }

    pub fn h3_mixer0() -> Self {
        Self {
            ccsc: 0,
            is_de3: false,
            mod_rate: 432_000_000,
            scaler_mask: 0xf,
            scanline_yuv: 2048,
            ui_num: 3,
            vi_num: 1,
        }
    }

    pub fn r40_mixer0() -> Self {
        Self { mod_rate: 297_000_000, ..Self::h3_mixer0() }
    }

    pub fn r40_mixer1() -> Self {
        Self {
            ccsc: 1,
            is_de3: false,
            mod_rate: 297_000_000,
            scaler_mask: 0x3,
            scanline_yuv: 2048,
            ui_num: 1,
            vi_num: 1,
        }
    }

    pub fn v3s_mixer() -> Self {
        Self {
            ccsc: 0,
            is_de3: false,
            mod_rate: 150_000_000,
            scaler_mask: 0x3,
            scanline_yuv: 2048,
            ui_num: 1,
            vi_num: 2,
        }
    }

    pub fn a64_mixer0() -> Self {
        Self { scanline_yuv: 4096, ..Self::r40_mixer0() }
    }

    pub fn a64_mixer1() -> Self {
        Self::r40_mixer1()
    }

    pub fn h6_mixer0() -> Self {
        Self {
            ccsc: 0,
            is_de3: true,
            mod_rate: 600_000_000,
            scaler_mask: 0xf,
            scanline_yuv: 4096,
            ui_num: 3,
            vi_num: 1,
        }
    }

    /// Looks up a preset by name, e.g. "h3" or "a64-mixer1".
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "a83t" | "a83t-mixer0" => Some(Self::a83t_mixer0()),
            "a83t-mixer1" => Some(Self::a83t_mixer1()),
            "h3" | "h3-mixer0" => Some(Self::h3_mixer0()),
            "r40" | "r40-mixer0" => Some(Self::r40_mixer0()),
            "r40-mixer1" => Some(Self::r40_mixer1()),
            "v3s" => Some(Self::v3s_mixer()),
            "a64" | "a64-mixer0" => Some(Self::a64_mixer0()),
            "a64-mixer1" => Some(Self::a64_mixer1()),
            "h6" | "h6-mixer0" => Some(Self::h6_mixer0()),
            _ => None,
        }
    }

    /// Total number of channels, which is also the number of pipe slots in use.
    pub fn plane_count(&self) -> u32 {
        self.ui_num + self.vi_num
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ccsc > 1 {
            return Err(ConfigError::Ccsc(self.ccsc));
        }

        if self.vi_num == 0 || self.vi_num > 2 {
            return Err(ConfigError::ViChannels(self.vi_num));
        }

        if self.plane_count() > MAX_PIPES {
            return Err(ConfigError::TooManyChannels(self.plane_count()));
        }

        if self.scanline_yuv == 0 {
            return Err(ConfigError::Scanline);
        }

        if self.mod_rate == 0 {
            return Err(ConfigError::ModuleClock);
        }

        Ok(())
    }
}

/// The blender has five pipe slots.
pub const MAX_PIPES: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("colour-space converter set {0} does not exist")]
    Ccsc(usize),

    #[error("unsupported number of VI channels: {0}")]
    ViChannels(u32),

    #[error("{0} channels exceed the blender's pipe slots")]
    TooManyChannels(u32),

    #[error("scanline buffer capacity must not be zero")]
    Scanline,

    #[error("module clock rate must not be zero")]
    ModuleClock,
}

/// Source of the mixer's module clock rate.
pub trait ModuleClock {
    /// Current rate in Hz.
    fn rate(&self) -> u64;
}

/// A clock that always reports the same rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl ModuleClock for FixedClock {
    fn rate(&self) -> u64 {
        self.0
    }
}

pub struct Mixer {
    cfg: MixerConfig,
    clock: Box<dyn ModuleClock>,
    tuning: ScalerTuning,
}

impl std::fmt::Debug for Mixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mixer")
            .field("cfg", &self.cfg)
            .field("clock_rate", &self.clock.rate())
            .field("tuning", &self.tuning)
            .finish()
    }
}

impl Mixer {
    /// Creates a mixer whose module clock runs at the configured rate.
    pub fn new(cfg: MixerConfig) -> Result<Self, ConfigError> {
        let clock = FixedClock(cfg.mod_rate);
        Self::with_clock(cfg, Box::new(clock))
    }

    pub fn with_clock(cfg: MixerConfig, clock: Box<dyn ModuleClock>) -> Result<Self, ConfigError> {
        cfg.validate()?;

        Ok(Self { cfg, clock, tuning: Default::default() })
    }

    pub fn with_tuning(mut self, tuning: ScalerTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn config(&self) -> &MixerConfig {
        &self.cfg
    }

    pub fn tuning(&self) -> &ScalerTuning {
        &self.tuning
    }

    pub fn clock_rate(&self) -> u64 {
        self.clock.rate()
    }

    pub fn blender_base(&self) -> u32 {
        if self.cfg.is_de3 {
            regs::DE3_BLD_BASE
        } else {
            regs::DE2_BLD_BASE
        }
    }

    pub fn channel_base(&self, channel: u32) -> u32 {
        if self.cfg.is_de3 {
            regs::DE3_CH_BASE + regs::DE3_CH_SIZE * channel
        } else {
            regs::DE2_CH_BASE + regs::DE2_CH_SIZE * channel
        }
    }

    /// Whether `channel` has a scaler.
    pub fn has_scaler(&self, channel: u32) -> bool {
        channel < u32::BITS && self.cfg.scaler_mask & (1 << channel) != 0
    }

    /// Brings the blender into its initial state: mixer running, black background, default
    /// blend equations and no pipe slot enabled.
    pub fn reset<R: RegisterMap + ?Sized>(&self, regs: &mut R) -> RegmapResult<()> {
        let base = self.blender_base();

        regs.write(regs::GLOBAL_CTL, regs::GLOBAL_CTL_RT_EN)?;
        regs.write(regs::blend_bkcolor(base), regs::BLEND_COLOR_BLACK)?;

        // Fill the bottom pipe with black.
        regs.write(regs::blend_pipe_ctl(base), regs::blend_pipe_ctl_fc_en(0))?;
        regs.write(regs::blend_attr_fcolor(base, 0), regs::BLEND_COLOR_BLACK)?;

        for pipe in 0..self.cfg.plane_count() {
            regs.write(regs::blend_mode(base, pipe), regs::BLEND_MODE_DEF)?;
        }

        regs.write(regs::blend_route(base), 0)?;
        regs.update_bits(regs::blend_pipe_ctl(base), regs::BLEND_PIPE_CTL_EN_MSK, 0)?;

        log::debug!("Mixer blender reset, {} pipes", self.cfg.plane_count());

        Ok(())
    }

    /// Creates and registers one VI layer per VI channel.
    pub fn create_video_layers(
        self: &Rc<Self>,
        registrar: &mut dyn PlaneRegistrar,
    ) -> Result<Vec<VideoLayer>, InitError> {
        (0..self.cfg.vi_num)
            .map(|index| VideoLayer::new(Rc::clone(self), index, registrar))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regmap::memory::MemoryRegisterMap;

    #[test]
    fn test_presets_are_valid() {
        let names =
            ["a83t", "a83t-mixer1", "h3", "r40", "r40-mixer1", "v3s", "a64", "a64-mixer1", "h6"];
        for name in names {
            let cfg = MixerConfig::preset(name).unwrap();
            assert_eq!(cfg.validate(), Ok(()), "{name}");
        }

        assert!(MixerConfig::preset("a10").is_none());
    }

    #[test]
    fn test_invalid_configs() {
        let cfg = MixerConfig { ccsc: 2, ..MixerConfig::h3_mixer0() };
        assert_eq!(cfg.validate(), Err(ConfigError::Ccsc(2)));

        let cfg = MixerConfig { ui_num: 4, vi_num: 2, ..MixerConfig::h3_mixer0() };
        assert_eq!(cfg.validate(), Err(ConfigError::TooManyChannels(6)));

        let cfg = MixerConfig { mod_rate: 0, ..MixerConfig::h3_mixer0() };
        assert!(Mixer::new(cfg).is_err());
    }

    #[test]
    fn test_register_bases() {
        let de2 = Mixer::new(MixerConfig::h3_mixer0()).unwrap();
        assert_eq!(de2.blender_base(), 0x1000);
        assert_eq!(de2.channel_base(1), 0x3000);

        let de3 = Mixer::new(MixerConfig::h6_mixer0()).unwrap();
        assert_eq!(de3.blender_base(), 0x800);
        assert_eq!(de3.channel_base(1), 0x1800);
    }

    #[test]
    fn test_scaler_mask() {
        let mixer = Mixer::new(MixerConfig::a64_mixer1()).unwrap();
        assert!(mixer.has_scaler(0));
        assert!(mixer.has_scaler(1));
        assert!(!mixer.has_scaler(2));
        assert!(!mixer.has_scaler(40));
    }

    #[test]
    fn test_clock_override() {
        let mixer =
            Mixer::with_clock(MixerConfig::h3_mixer0(), Box::new(FixedClock(100_000_000))).unwrap();
        assert_eq!(mixer.clock_rate(), 100_000_000);
    }

    #[test]
    fn test_reset_unbinds_all_pipes() {
        let mixer = Mixer::new(MixerConfig::h3_mixer0()).unwrap();
        let base = mixer.blender_base();
        let mut regs = MemoryRegisterMap::new();
        regs.poke(regs::blend_pipe_ctl(base), 0xf00);
        regs.poke(regs::blend_route(base), 0x3210);

        mixer.reset(&mut regs).unwrap();

        assert_eq!(regs.peek(regs::blend_pipe_ctl(base)), regs::blend_pipe_ctl_fc_en(0));
        assert_eq!(regs.peek(regs::blend_route(base)), 0);
        assert_eq!(regs.peek(regs::blend_bkcolor(base)), regs::BLEND_COLOR_BLACK);
        assert_eq!(regs.peek(regs::blend_mode(base, 3)), regs::BLEND_MODE_DEF);
        assert_eq!(regs.peek(regs::GLOBAL_CTL), regs::GLOBAL_CTL_RT_EN);
    }
}
