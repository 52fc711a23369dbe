#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    pub iters: usize,
    pub steps_per_frame: usize,
    pub delta_per_step: f64,
    pub delta_minimum: f64,
    pub t_start: f64,
    pub t_end: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iters: 800,
            steps_per_frame: 500,
            delta_per_step: 1.0e-5,
            delta_minimum: 1.0e-7,
            t_start: -3.0,
            t_end: 3.0,
        }
    }
}

/// How quickly old points are faded out of the canvas each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrailMode {
    #[default]
    Fast,
    Slow,
    Infinite,
    None,
}

impl TrailMode {
    /// Per-channel amount subtracted from every pixel each frame.
    pub fn fade_amount(self) -> u8 {
        match self {
            TrailMode::Fast => 10,
            TrailMode::Slow => 2,
            TrailMode::Infinite => 0,
            TrailMode::None => 255,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            TrailMode::Fast => TrailMode::Slow,
            TrailMode::Slow => TrailMode::Infinite,
            TrailMode::Infinite => TrailMode::None,
            TrailMode::None => TrailMode::Fast,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrailMode::Fast => "fast fade",
            TrailMode::Slow => "slow fade",
            TrailMode::Infinite => "infinite",
            TrailMode::None => "no trail",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DotSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl DotSize {
    /// Stamp radius in canvas pixels.
    pub fn radius_px(self) -> f32 {
        match self {
            DotSize::Small => 0.5,
            DotSize::Medium => 1.5,
            DotSize::Large => 5.0,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            DotSize::Small => DotSize::Medium,
            DotSize::Medium => DotSize::Large,
            DotSize::Large => DotSize::Small,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DotSize::Small => "small",
            DotSize::Medium => "medium",
            DotSize::Large => "large",
        }
    }
}

/// What happens when t runs past the end of its range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EquationMode {
    /// Randomize a fresh equation.
    #[default]
    Automatic,
    /// Replay the same equation from the start.
    Repeat,
}

impl EquationMode {
    pub fn label(self) -> &'static str {
        match self {
            EquationMode::Automatic => "automatic",
            EquationMode::Repeat => "repeat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_mode_cycles_through_all_variants() {
        let mut mode = TrailMode::Fast;
        let mut seen = vec![mode];
        for _ in 0..3 {
            mode = mode.cycled();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![
                TrailMode::Fast,
                TrailMode::Slow,
                TrailMode::Infinite,
                TrailMode::None
            ]
        );
        assert_eq!(mode.cycled(), TrailMode::Fast);
    }

    #[test]
    fn fade_amounts_match_modes() {
        assert_eq!(TrailMode::Fast.fade_amount(), 10);
        assert_eq!(TrailMode::Slow.fade_amount(), 2);
        assert_eq!(TrailMode::Infinite.fade_amount(), 0);
        assert_eq!(TrailMode::None.fade_amount(), 255);
    }

    #[test]
    fn dot_size_cycle_returns_to_start() {
        assert_eq!(DotSize::Small.cycled().cycled().cycled(), DotSize::Small);
    }
}
