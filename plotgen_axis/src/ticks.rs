// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use plotgen_view::{Viewport, round_half_up};

use crate::format::{LABEL_PRECISION, format_g};

/// How one axis maps real values onto device positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMapping {
    /// Device pixels per real unit; `0.0` for a collapsed axis.
    pub factor: f64,
    /// Integer offset subtracted after rounding.
    pub offset: i64,
    /// Value shown when the axis is collapsed.
    pub collapsed_value: f64,
    /// Whether the line through zero perpendicular to this axis is drawn.
    pub show_zero: bool,
}

impl AxisMapping {
    /// Mapping of the horizontal axis of `view`.
    #[must_use]
    pub fn horizontal(view: &Viewport) -> Self {
        let v = view.visible_real_rect();
        let s = view.scale();
        Self {
            factor: s.x_factor,
            offset: s.x_offset,
            collapsed_value: (v.x0 + v.x1) * 0.5,
            show_zero: view.show_zero_axis_y(),
        }
    }

    /// Mapping of the vertical axis of `view`.
    #[must_use]
    pub fn vertical(view: &Viewport) -> Self {
        let v = view.visible_real_rect();
        let s = view.scale();
        Self {
            factor: s.y_factor,
            offset: s.y_offset,
            collapsed_value: (v.y0 + v.y1) * 0.5,
            show_zero: view.show_zero_axis_x(),
        }
    }

    fn to_device(&self, v: f64) -> i32 {
        let d = if self.factor == 0.0 {
            -self.offset
        } else {
            device_int(round_half_up(v * self.factor)).saturating_sub(self.offset)
        };
        i32::try_from(d).unwrap_or(if d < 0 { i32::MIN } else { i32::MAX })
    }

    fn to_real(&self, d: i64) -> f64 {
        (d + self.offset) as f64 / self.factor
    }
}

/// Label options of one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Print raw values even when a shared exponent is available.
    pub absolute_labels: bool,
    /// Unit appended to the axis label.
    pub unit: String,
    /// Width of the drawn lines, in pixels.
    pub line_width: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            absolute_labels: false,
            unit: String::new(),
            line_width: 1.0,
        }
    }
}

/// Tick positions and labels for one axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Axis {
    /// Device positions of the major ticks, in ascending value order.
    pub major: Vec<i32>,
    /// Real values of the major ticks.
    pub values: Vec<f64>,
    /// One label per major tick.
    pub labels: Vec<String>,
    /// Device positions of the minor ticks.
    pub minor: Vec<i32>,
    /// Power of ten factored out of the labels; `0` when labels are absolute.
    pub exponent: i32,
    /// Axis caption: the unit, prefixed with `*1eN` when labels are scaled.
    pub label: String,
    /// Device position of the zero line, if shown.
    pub zero_axis: Option<i32>,
    /// Real distance between major ticks; `0.0` for a collapsed axis.
    pub step: f64,
    /// Device range the ticks were generated for.
    pub covered: (i32, i32),
    /// Minimum pixel distance the ticks were generated for.
    pub min_px: f64,
    /// Mapping the ticks were generated for.
    pub mapping: Option<AxisMapping>,
}

impl Axis {
    /// Generates ticks covering the device range `from..=to`.
    ///
    /// Major ticks are at least `min_px` device pixels apart (one pixel of
    /// rounding slack included) and less than ten times that. The step is
    /// one of `1`, `2` or `5` times a power of ten; minor ticks divide it
    /// into 4, 2 or 5 parts respectively.
    #[must_use]
    pub fn generate(
        mapping: AxisMapping,
        from: i32,
        to: i32,
        min_px: f64,
        style: &AxisStyle,
    ) -> Self {
        let (from, to) = (from.min(to), from.max(to));
        let mut axis = Self {
            covered: (from, to),
            min_px,
            mapping: Some(mapping),
            label: style.unit.clone(),
            ..Self::default()
        };
        axis.zero_axis = mapping.show_zero.then(|| mapping.to_device(0.0));

        let f = libm::fabs(mapping.factor);
        if f == 0.0 || !f.is_finite() {
            let v = mapping.collapsed_value;
            axis.major.push(mapping.to_device(v));
            axis.values.push(v);
            axis.labels.push(format_g(v, LABEL_PRECISION));
            return axis;
        }

        let min_px = min_px.max(1.0);
        let mut rung = Rung::for_min_world(min_px / f);
        while rung.step() * f < min_px + 1.0 {
            rung = rung.next();
        }
        let step = rung.step();
        axis.step = step;

        let extend = 1 + if style.line_width > 1.0 {
            device_int(libm::ceil(style.line_width * 0.5))
        } else {
            0
        };
        let a = mapping.to_real(i64::from(from) - extend);
        let b = mapping.to_real(i64::from(to) + extend);
        let (lo, hi) = (a.min(b), a.max(b));

        let scaled = !style.absolute_labels && rung.exp != 0;
        if scaled {
            axis.exponent = rung.exp;
            axis.label = if style.unit.is_empty() {
                format!("*1e{}", rung.exp)
            } else {
                format!("*1e{} {}", rung.exp, style.unit)
            };
        }

        for k in device_int(libm::ceil(lo / step))..=device_int(libm::floor(hi / step)) {
            let value = rung.value(k, 1);
            axis.major.push(mapping.to_device(value));
            axis.values.push(value);
            let label = if scaled {
                format_g(k as f64 * rung.mantissa, LABEL_PRECISION)
            } else {
                format_g(value, LABEL_PRECISION)
            };
            axis.labels.push(label);
        }

        let div = rung.minor_divisions();
        let minor = step / f64::from(div);
        let div = i64::from(div);
        for j in device_int(libm::ceil(lo / minor))..=device_int(libm::floor(hi / minor)) {
            if j % div != 0 {
                axis.minor.push(mapping.to_device(rung.value(j, div)));
            }
        }
        axis
    }

    /// Whether these ticks can be reused for `mapping`, `min_px` and the
    /// device range `from..=to`.
    #[must_use]
    pub fn is_valid_for(&self, mapping: &AxisMapping, min_px: f64, from: i32, to: i32) -> bool {
        self.mapping.as_ref() == Some(mapping)
            && self.min_px == min_px
            && self.covered.0 <= from.min(to)
            && from.max(to) <= self.covered.1
    }
}

/// A `mantissa * 10^exp` major step.
#[derive(Clone, Copy, Debug)]
struct Rung {
    mantissa: f64,
    exp: i32,
}

impl Rung {
    fn for_min_world(min_world: f64) -> Self {
        let lg = libm::log10(min_world);
        let order = libm::floor(lg);
        let frac = lg - order;
        let order = i32::try_from(device_int(order)).unwrap_or(0);
        if frac > libm::log10(5.0) {
            Self {
                mantissa: 1.0,
                exp: order + 1,
            }
        } else if frac > libm::log10(2.0) {
            Self {
                mantissa: 5.0,
                exp: order,
            }
        } else {
            Self {
                mantissa: 2.0,
                exp: order,
            }
        }
    }

    fn next(self) -> Self {
        if self.mantissa == 1.0 {
            Self {
                mantissa: 2.0,
                exp: self.exp,
            }
        } else if self.mantissa == 2.0 {
            Self {
                mantissa: 5.0,
                exp: self.exp,
            }
        } else {
            Self {
                mantissa: 1.0,
                exp: self.exp + 1,
            }
        }
    }

    fn step(&self) -> f64 {
        self.value(1, 1)
    }

    fn minor_divisions(&self) -> u8 {
        if self.mantissa == 1.0 {
            4
        } else if self.mantissa == 5.0 {
            5
        } else {
            2
        }
    }

    /// `k / div` steps. Negative exponents divide so that decimal steps
    /// such as `0.1` come out as the nearest double.
    fn value(&self, k: i64, div: i64) -> f64 {
        let m = k as f64 * self.mantissa / div as f64;
        if self.exp < 0 {
            m / libm::pow(10.0, f64::from(-self.exp))
        } else {
            m * libm::pow(10.0, f64::from(self.exp))
        }
    }
}

fn device_int(v: f64) -> i64 {
    if v.is_nan() {
        0
    } else {
        #[expect(clippy::cast_possible_truncation, reason = "float to int casts saturate")]
        let i = v as i64;
        i
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{Axis, AxisMapping, AxisStyle};

    fn mapping(factor: f64, offset: i64) -> AxisMapping {
        AxisMapping {
            factor,
            offset,
            collapsed_value: 0.0,
            show_zero: false,
        }
    }

    #[test]
    fn major_spacing_stays_within_bounds() {
        let style = AxisStyle::default();
        let factors = [1e-9, 3.7e-4, 0.5, 1.0, 2.0, 7.3, 100.0, 1234.5, 9.9e7, -13.0, -0.02];
        for &factor in &factors {
            for min_px in [2.0, 3.0, 7.5, 20.0, 64.0] {
                let axis = Axis::generate(mapping(factor, -17), 0, 2000, min_px, &style);
                assert!(axis.major.len() >= 2, "factor {factor} min_px {min_px}");
                let mut sorted = axis.major.clone();
                sorted.sort_unstable();
                for pair in sorted.windows(2) {
                    let d = f64::from(pair[1] - pair[0]);
                    assert!(d >= min_px, "factor {factor} min_px {min_px}: {d}");
                    assert!(d < 10.0 * min_px, "factor {factor} min_px {min_px}: {d}");
                }
            }
        }
    }

    #[test]
    fn ticks_cover_range_edges() {
        // 10 px per unit, major step 5 units with min_px 30.
        let axis = Axis::generate(mapping(10.0, 0), 0, 100, 30.0, &AxisStyle::default());
        assert_eq!(axis.step, 5.0);
        assert_eq!(axis.major, [0, 50, 100]);
        assert_eq!(axis.labels, ["0", "5", "10"]);
        assert_eq!(axis.minor, [10, 20, 30, 40, 60, 70, 80, 90]);
    }

    #[test]
    fn scaled_labels_share_an_exponent() {
        let style = AxisStyle {
            unit: String::from("s"),
            ..AxisStyle::default()
        };
        // 100 px per unit, min_px 30 -> step 0.5.
        let axis = Axis::generate(mapping(100.0, 0), 0, 100, 30.0, &style);
        assert_eq!(axis.step, 0.5);
        assert_eq!(axis.exponent, -1);
        assert_eq!(axis.label, "*1e-1 s");
        assert_eq!(axis.labels, ["0", "5", "10"]);

        let style = AxisStyle {
            absolute_labels: true,
            ..style
        };
        let absolute = Axis::generate(mapping(100.0, 0), 0, 100, 30.0, &style);
        assert_eq!(absolute.exponent, 0);
        assert_eq!(absolute.labels, ["0", "0.5", "1"]);
    }

    #[test]
    fn inverted_axis_labels_ascend() {
        // Device y grows downward: value 10 at row 0, value 0 at row 100.
        let axis = Axis::generate(mapping(-10.0, -100), 0, 100, 30.0, &AxisStyle::default());
        assert_eq!(axis.values, [0.0, 5.0, 10.0]);
        assert_eq!(axis.major, [100, 50, 0]);
    }

    #[test]
    fn collapsed_axis_has_one_tick() {
        let m = AxisMapping {
            factor: 0.0,
            offset: -50,
            collapsed_value: 3.25,
            show_zero: false,
        };
        let axis = Axis::generate(m, 0, 100, 20.0, &AxisStyle::default());
        assert_eq!(axis.major, [50]);
        assert_eq!(axis.labels, ["3.25"]);
        assert!(axis.minor.is_empty());
    }

    #[test]
    fn zero_axis_and_cache_validity() {
        let m = AxisMapping {
            show_zero: true,
            ..mapping(4.0, -200)
        };
        let axis = Axis::generate(m, 0, 400, 25.0, &AxisStyle::default());
        assert_eq!(axis.zero_axis, Some(200));
        assert!(axis.is_valid_for(&m, 25.0, 10, 300));
        assert!(!axis.is_valid_for(&m, 26.0, 10, 300));
        assert!(!axis.is_valid_for(&m, 25.0, -10, 300));
        assert!(!axis.is_valid_for(&mapping(4.0, -199), 25.0, 10, 300));
    }
}
