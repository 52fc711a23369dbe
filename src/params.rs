use rand::Rng;

/// Number of ternary coefficients in a parameter vector. The first half
/// weights the x' update, the second half the y' update.
pub const NUM_PARAMS: usize = 18;

/// Symbols per code character. The base-27 packing below relies on
/// NUM_PARAMS being a multiple of this.
const GROUP: usize = 3;

const ALPHABET: &[u8; 27] = b"_ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Basis terms of the quadratic map, in coefficient order.
const TERMS: [&str; 9] = ["x\u{b2}", "y\u{b2}", "t\u{b2}", "xy", "xt", "yt", "x", "y", "t"];

/// The 18 coefficients of one chaos equation, each in {-1, 0, +1}.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSet(pub [f64; NUM_PARAMS]);

impl ParamSet {
    pub fn zeros() -> Self {
        Self([0.0; NUM_PARAMS])
    }

    /// Draws a fresh random equation. Zero is twice as likely as either
    /// sign, which keeps most sampled equations sparse enough to stay
    /// visually interesting.
    pub fn random(rng: &mut impl Rng) -> Self {
        let mut params = [0.0; NUM_PARAMS];
        for p in &mut params {
            *p = match rng.gen_range(0..4) {
                0 => 1.0,
                1 => -1.0,
                _ => 0.0,
            };
        }
        Self(params)
    }

    /// Packs the coefficients into a 6-character shareable code. Each
    /// coefficient triple becomes one base-27 digit: blank for 0,
    /// otherwise A..Z.
    pub fn encode(&self) -> String {
        debug_assert_eq!(NUM_PARAMS % GROUP, 0);
        let mut code = String::with_capacity(NUM_PARAMS / GROUP);
        let mut acc = 0usize;
        for (i, &p) in self.0.iter().enumerate() {
            acc = acc * 3 + (p as i32 + 1) as usize;
            if i % GROUP == GROUP - 1 {
                code.push(ALPHABET[acc] as char);
                acc = 0;
            }
        }
        code
    }

    /// Inverse of [`encode`]. Deliberately permissive: missing characters
    /// and anything outside A-Z/a-z decode as the blank symbol, so
    /// arbitrary user-typed strings always yield a valid equation.
    pub fn decode(code: &str) -> Self {
        let chars: Vec<char> = code.chars().collect();
        let mut params = [0.0; NUM_PARAMS];
        for group in 0..NUM_PARAMS / GROUP {
            let mut acc = match chars.get(group) {
                Some(c @ 'A'..='Z') => *c as usize - 'A' as usize + 1,
                Some(c @ 'a'..='z') => *c as usize - 'a' as usize + 1,
                _ => 0,
            };
            for offset in (0..GROUP).rev() {
                params[group * GROUP + offset] = (acc % 3) as f64 - 1.0;
                acc /= 3;
            }
        }
        Self(params)
    }

    /// Human-readable form of both update rules, e.g.
    /// `x' = x² - yt + y`.
    pub fn equation_text(&self) -> String {
        format!(
            "x' = {}\ny' = {}",
            self.half_equation(0),
            self.half_equation(NUM_PARAMS / 2)
        )
    }

    fn half_equation(&self, offset: usize) -> String {
        let mut out = String::new();
        for (i, term) in TERMS.iter().enumerate() {
            let coeff = self.0[offset + i];
            if coeff == 0.0 {
                continue;
            }
            if out.is_empty() {
                if coeff < 0.0 {
                    out.push('-');
                }
            } else {
                out.push_str(if coeff < 0.0 { " - " } else { " + " });
            }
            out.push_str(term);
        }
        out
    }
}
