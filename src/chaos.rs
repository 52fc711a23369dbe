use rand::Rng;

use crate::params::ParamSet;
use crate::types::SimConfig;
use crate::viewport::Viewport;

/// t advance used while the whole trajectory is off-canvas, so divergent
/// excursions are skipped quickly instead of crawled through at the
/// rolling step.
const OFFSCREEN_FALLBACK: f64 = 0.01;

/// Converts world-space drift into the units the step controller was
/// tuned for (roughly canvas pixels at the default zoom).
const DRIFT_SCALE: f64 = 500.0;

/// One plotted sample: the iteration index that produced it and where it
/// landed on the canvas.
#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub iter: usize,
    pub px: f32,
    pub py: f32,
}

/// One application of the quadratic map. x' and y' are dot products of
/// the 9 basis terms (x², y², t², xy, xt, yt, x, y, t) with the two
/// halves of the parameter vector.
pub fn chaos_step(x: f64, y: f64, t: f64, params: &ParamSet) -> (f64, f64) {
    let p = &params.0;
    let xx = x * x;
    let yy = y * y;
    let tt = t * t;
    let xy = x * y;
    let xt = x * t;
    let yt = y * t;
    let nx = xx * p[0]
        + yy * p[1]
        + tt * p[2]
        + xy * p[3]
        + xt * p[4]
        + yt * p[5]
        + x * p[6]
        + y * p[7]
        + t * p[8];
    let ny = xx * p[9]
        + yy * p[10]
        + tt * p[11]
        + xy * p[12]
        + xt * p[13]
        + yt * p[14]
        + x * p[15]
        + y * p[16]
        + t * p[17];
    (nx, ny)
}

/// Chooses how far t advances each sub-step. Large observed on-canvas
/// motion shrinks the step so the animation never visually jumps; the
/// step can shrink far below the nominal size but never below the
/// configured floor.
pub struct StepController {
    rolling_delta: f64,
    nominal: f64,
    minimum: f64,
}

impl StepController {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            rolling_delta: config.delta_per_step,
            nominal: config.delta_per_step,
            minimum: config.delta_minimum,
        }
    }

    pub fn reset(&mut self) {
        self.rolling_delta = self.nominal;
    }

    pub fn rolling_delta(&self) -> f64 {
        self.rolling_delta
    }

    /// Once-per-frame smoothing back toward the nominal step, scaled by
    /// the current speed. Returns the frame's nominal delta for use in
    /// drift observations.
    pub fn begin_frame(&mut self, speed_abs: f64) -> f64 {
        let delta = self.nominal * speed_abs;
        self.rolling_delta = self.rolling_delta * 0.99 + delta * 0.01;
        delta
    }

    /// Feeds one on-canvas drift observation into the controller. The
    /// candidate step is inversely proportional to the drift, with an
    /// epsilon guarding the division and the floor scaled by speed.
    pub fn observe(&mut self, delta: f64, drift: f64, speed_abs: f64) {
        let candidate = (delta / (drift + 1e-5)).max(self.minimum * speed_abs);
        self.rolling_delta = self.rolling_delta.min(candidate);
    }
}

/// Owns one run of an equation: its parameters, the time variable, the
/// step controller, and the per-iteration history used to measure drift
/// between consecutive sub-steps.
pub struct SimulationSession {
    config: SimConfig,
    params: ParamSet,
    t: f64,
    controller: StepController,
    history: Vec<(f64, f64)>,
    // The history buffer holds no usable drift data until one sub-step
    // after a parameter reset has filled it.
    history_primed: bool,
}

impl SimulationSession {
    pub fn new(config: SimConfig, rng: &mut impl Rng) -> Self {
        let controller = StepController::new(&config);
        Self {
            params: ParamSet::random(rng),
            t: config.t_start,
            controller,
            history: vec![(0.0, 0.0); config.iters],
            history_primed: false,
            config,
        }
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn code(&self) -> String {
        self.params.encode()
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn rolling_delta(&self) -> f64 {
        self.controller.rolling_delta()
    }

    /// World-space samples from the most recent sub-step, one per
    /// iteration index. Used for viewport auto-centering.
    pub fn history(&self) -> &[(f64, f64)] {
        &self.history
    }

    pub fn past_end(&self) -> bool {
        self.t > self.config.t_end
    }

    /// Restarts the current equation from the beginning of the t range.
    pub fn restart(&mut self) {
        self.t = self.config.t_start;
        self.controller.reset();
        self.history_primed = false;
    }

    /// Swaps in a freshly sampled random equation and restarts.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        self.params = ParamSet::random(rng);
        self.restart();
    }

    /// Decodes a shared code (permissively) and restarts with it.
    pub fn load(&mut self, code: &str) {
        self.params = ParamSet::decode(code);
        self.restart();
    }

    /// Advances one rendered frame: `steps_per_frame` sub-steps, each
    /// iterating the map `iters` times from the seed point (t, t).
    /// Emits a canvas sample per plotted iterate into `out` and adapts
    /// the time step from the observed drift. `iteration_floor` hides
    /// early iterates; hidden iterates count as off-canvas.
    pub fn step_frame(
        &mut self,
        speed: f64,
        iteration_floor: Option<usize>,
        viewport: &Viewport,
        canvas_w: usize,
        canvas_h: usize,
        out: &mut Vec<Sample>,
    ) {
        out.clear();
        let speed_abs = speed.abs();
        let dir = if speed < 0.0 { -1.0 } else { 1.0 };
        let delta = self.controller.begin_frame(speed_abs);

        for _ in 0..self.config.steps_per_frame {
            let mut on_canvas = false;
            let mut x = self.t;
            let mut y = self.t;
            for iter in 0..self.config.iters {
                let (nx, ny) = chaos_step(x, y, self.t, &self.params);
                x = nx;
                y = ny;
                let visible = iteration_floor.map_or(true, |floor| iter >= floor);
                if visible {
                    let (px, py) = viewport.project(x, y, canvas_w, canvas_h);
                    if Viewport::contains(px, py, canvas_w, canvas_h) {
                        if self.history_primed {
                            let (hx, hy) = self.history[iter];
                            let dx = hx - x;
                            let dy = hy - y;
                            let drift = DRIFT_SCALE * (dx * dx + dy * dy).sqrt();
                            self.controller.observe(delta, drift, speed_abs);
                        }
                        on_canvas = true;
                    }
                    out.push(Sample { iter, px, py });
                }
                self.history[iter] = (x, y);
            }
            self.history_primed = true;

            if on_canvas {
                self.t += self.controller.rolling_delta() * dir;
            } else {
                self.t += OFFSCREEN_FALLBACK * dir;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SimConfig {
        SimConfig {
            iters: 8,
            steps_per_frame: 4,
            ..SimConfig::default()
        }
    }

    fn session_with(params: ParamSet, config: SimConfig) -> SimulationSession {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = SimulationSession::new(config, &mut rng);
        session.params = params;
        session.restart();
        session
    }

    #[test]
    fn zero_params_map_everything_to_origin() {
        assert_eq!(chaos_step(1.0, 1.0, 1.0, &ParamSet::zeros()), (0.0, 0.0));
    }

    #[test]
    fn identity_x_coefficient_passes_x_through() {
        let mut params = ParamSet::zeros();
        params.0[6] = 1.0; // x term of x'
        let (nx, ny) = chaos_step(1.0, 2.0, 3.0, &params);
        assert_eq!(nx, 1.0);
        assert_eq!(ny, 0.0);
    }

    #[test]
    fn map_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(99);
        let params = ParamSet::random(&mut rng);
        assert_eq!(
            chaos_step(0.3, -0.7, 1.2, &params),
            chaos_step(0.3, -0.7, 1.2, &params)
        );
    }

    #[test]
    fn controller_never_drops_below_the_scaled_floor() {
        let config = SimConfig::default();
        for speed in [0.1, 1.0, 10.0] {
            let mut ctl = StepController::new(&config);
            for _ in 0..50 {
                let delta = ctl.begin_frame(speed);
                // enormous observed drift forces the floor
                ctl.observe(delta, 1.0e12, speed);
            }
            assert!(ctl.rolling_delta() >= config.delta_minimum * speed);
            assert!(
                (ctl.rolling_delta() - config.delta_minimum * speed).abs()
                    < config.delta_per_step * speed
            );
        }
    }

    #[test]
    fn controller_shrinks_under_large_drift_and_recovers_by_ema() {
        let config = SimConfig::default();
        let mut ctl = StepController::new(&config);
        let delta = ctl.begin_frame(1.0);
        ctl.observe(delta, 1.0e9, 1.0);
        let clamped = ctl.rolling_delta();
        assert!(clamped < config.delta_per_step);
        // with no further drift pressure the EMA drifts back up
        for _ in 0..10 {
            ctl.begin_frame(1.0);
        }
        assert!(ctl.rolling_delta() > clamped);
    }

    #[test]
    fn reset_restores_nominal_step() {
        let config = SimConfig::default();
        let mut ctl = StepController::new(&config);
        let delta = ctl.begin_frame(1.0);
        ctl.observe(delta, 1.0e9, 1.0);
        ctl.reset();
        assert_eq!(ctl.rolling_delta(), config.delta_per_step);
    }

    #[test]
    fn offscreen_trajectory_advances_by_the_fallback_step() {
        let config = small_config();
        let mut session = session_with(ParamSet::zeros(), config);
        // every iterate is (0, 0); put the viewport far away so the whole
        // trajectory projects off-canvas
        let viewport = Viewport {
            scale: 0.25,
            center_x: 1000.0,
            center_y: 1000.0,
        };
        let mut out = Vec::new();
        let before = session.t();
        session.step_frame(1.0, None, &viewport, 100, 100, &mut out);
        let expected = before + OFFSCREEN_FALLBACK * config.steps_per_frame as f64;
        assert!((session.t() - expected).abs() < 1e-12);
    }

    #[test]
    fn onscreen_trajectory_advances_by_the_rolling_step() {
        let config = small_config();
        let mut session = session_with(ParamSet::zeros(), config);
        let viewport = Viewport::default();
        let mut out = Vec::new();
        let before = session.t();
        session.step_frame(1.0, None, &viewport, 100, 100, &mut out);
        let advanced = session.t() - before;
        assert!(advanced > 0.0);
        assert!(advanced < OFFSCREEN_FALLBACK);
        assert_eq!(out.len(), config.steps_per_frame * config.iters);
    }

    #[test]
    fn reversed_speed_runs_t_backwards() {
        let config = small_config();
        let mut session = session_with(ParamSet::zeros(), config);
        let viewport = Viewport::default();
        let mut out = Vec::new();
        session.step_frame(-1.0, None, &viewport, 100, 100, &mut out);
        assert!(session.t() < config.t_start);
    }

    #[test]
    fn iteration_floor_hides_early_iterates() {
        let config = small_config();
        let mut session = session_with(ParamSet::zeros(), config);
        let viewport = Viewport::default();
        let mut out = Vec::new();
        session.step_frame(1.0, Some(4), &viewport, 100, 100, &mut out);
        assert_eq!(out.len(), config.steps_per_frame * (config.iters - 4));
        assert!(out.iter().all(|s| s.iter >= 4));
    }

    #[test]
    fn stepping_is_deterministic_for_identical_inputs() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(3);
        let params = ParamSet::random(&mut rng);
        let viewport = Viewport::default();

        let mut a = session_with(params, config);
        let mut b = session_with(params, config);
        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        for speed in [1.0, 10.0, -0.1, 1.0] {
            a.step_frame(speed, None, &viewport, 200, 100, &mut out_a);
            b.step_frame(speed, None, &viewport, 200, 100, &mut out_b);
        }
        assert_eq!(a.t(), b.t());
        assert_eq!(out_a.len(), out_b.len());
        for (sa, sb) in out_a.iter().zip(&out_b) {
            assert_eq!(sa.iter, sb.iter);
            assert_eq!(sa.px, sb.px);
            assert_eq!(sa.py, sb.py);
        }
    }

    #[test]
    fn new_equation_resets_time_and_step() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = SimulationSession::new(config, &mut rng);
        let viewport = Viewport::default();
        let mut out = Vec::new();
        for _ in 0..5 {
            session.step_frame(10.0, None, &viewport, 100, 100, &mut out);
        }
        session.randomize(&mut rng);
        assert_eq!(session.t(), config.t_start);
        assert_eq!(session.rolling_delta(), config.delta_per_step);
    }

    #[test]
    fn load_decodes_the_given_code() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = SimulationSession::new(config, &mut rng);
        session.load("UMOWCP");
        assert_eq!(*session.params(), ParamSet::decode("UMOWCP"));
        assert_eq!(session.code(), "UMOWCP");
        assert_eq!(session.t(), config.t_start);
    }

    #[test]
    fn divergent_equations_do_not_panic() {
        let config = small_config();
        // x' = x² + x blows up immediately from most seeds
        let mut params = ParamSet::zeros();
        params.0[0] = 1.0;
        params.0[6] = 1.0;
        params.0[10] = 1.0;
        let mut session = session_with(params, config);
        let viewport = Viewport::default();
        let mut out = Vec::new();
        for _ in 0..20 {
            session.step_frame(10.0, None, &viewport, 100, 100, &mut out);
        }
        assert!(session.t().is_finite());
    }
}
