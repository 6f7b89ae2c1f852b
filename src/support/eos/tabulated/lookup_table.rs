use thiserror::Error;

use crate::support::config::ConfigError;

/// Errors raised while building a lookup table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("axis `{axis}` needs at least 2 points, found {found}")]
    TooFewPoints { axis: &'static str, found: usize },

    #[error("axis `{axis}` must be strictly increasing")]
    NotIncreasing { axis: &'static str },

    #[error("`{name}` contains a value that cannot be transformed: {value}")]
    Untransformable { name: &'static str, value: f64 },

    #[error("table `{name}` has {found} values, expected {expected}")]
    Shape {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Coordinate in which a table axis or value is interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transform {
    #[default]
    None,
    Ln,
    Log10,
}

impl Transform {
    pub const TYPES: &'static [&'static str] = &["none", "ln", "log10"];

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownType`] for names other than
    /// `none`, `ln` and `log10`.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "none" => Ok(Self::None),
            "ln" => Ok(Self::Ln),
            "log10" => Ok(Self::Log10),
            other => Err(ConfigError::unknown_type("table transform", other, Self::TYPES)),
        }
    }

    fn forward(self, x: f64) -> f64 {
        match self {
            Self::None => x,
            Self::Ln => x.ln(),
            Self::Log10 => x.log10(),
        }
    }

    fn inverse(self, u: f64) -> f64 {
        match self {
            Self::None => u,
            Self::Ln => u.exp(),
            Self::Log10 => 10_f64.powf(u),
        }
    }

    /// `d(forward)/dx`.
    fn forward_slope(self, x: f64) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Ln => 1.0 / x,
            Self::Log10 => 1.0 / (x * std::f64::consts::LN_10),
        }
    }

    /// `d(inverse)/du`.
    fn inverse_slope(self, u: f64) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Ln => u.exp(),
            Self::Log10 => std::f64::consts::LN_10 * 10_f64.powf(u),
        }
    }

    fn apply(self, name: &'static str, x: f64) -> Result<f64, TableError> {
        let u = self.forward(x);
        if u.is_finite() {
            Ok(u)
        } else {
            Err(TableError::Untransformable { name, value: x })
        }
    }
}

/// A strictly increasing grid coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: &'static str,
    nodes: Vec<f64>,
    transform: Transform,
}

impl Axis {
    /// Builds an axis from physical `values`, stored in transformed space.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if there are fewer than two values, they are
    /// not strictly increasing, or a value has no transform (for example a
    /// non-positive value on a logarithmic axis).
    pub fn new(
        name: &'static str,
        values: &[f64],
        transform: Transform,
    ) -> Result<Self, TableError> {
        if values.len() < 2 {
            return Err(TableError::TooFewPoints {
                axis: name,
                found: values.len(),
            });
        }

        let nodes = values
            .iter()
            .map(|&x| transform.apply(name, x))
            .collect::<Result<Vec<_>, _>>()?;

        if nodes.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(TableError::NotIncreasing { axis: name });
        }

        Ok(Self {
            name,
            nodes,
            transform,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Physical bounds of the axis.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        let first = self.nodes[0];
        let last = self.nodes[self.nodes.len() - 1];
        (self.transform.inverse(first), self.transform.inverse(last))
    }

    /// Locates `x`, returning the lower node index, the fractional position
    /// within the interval and `d(fraction)/dx`.
    ///
    /// Outside the axis the end interval is used and the fraction falls
    /// outside `[0, 1]`, which extrapolates linearly.
    fn locate(&self, x: f64) -> (usize, f64, f64) {
        let u = self.transform.forward(x);
        let n = self.nodes.len();

        let (first, last) = (self.nodes[0], self.nodes[n - 1]);
        if !(first..=last).contains(&u) {
            log::trace!("extrapolating `{}` axis at {x}", self.name);
        }

        let i = self
            .nodes
            .partition_point(|&node| node <= u)
            .saturating_sub(1)
            .min(n - 2);

        let width = self.nodes[i + 1] - self.nodes[i];
        let fraction = (u - self.nodes[i]) / width;
        (i, fraction, self.transform.forward_slope(x) / width)
    }
}

/// Interpolated value and its partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub dx: f64,
    pub dy: f64,
}

/// Bilinear lookup over a rectangular grid.
///
/// Values are stored row-major: the entry for `(x[i], y[j])` sits at
/// `i * ny + j`. Interpolation happens in the transformed coordinates of
/// both axes and of the values.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable2D {
    x: Axis,
    y: Axis,
    values: Vec<f64>,
    transform: Transform,
}

impl LookupTable2D {
    /// # Errors
    ///
    /// Returns [`TableError`] if `values` does not match the grid or a value
    /// cannot be transformed.
    pub fn new(
        name: &'static str,
        x: Axis,
        y: Axis,
        values: &[f64],
        transform: Transform,
    ) -> Result<Self, TableError> {
        let expected = x.len() * y.len();
        if values.len() != expected {
            return Err(TableError::Shape {
                name,
                expected,
                found: values.len(),
            });
        }

        let values = values
            .iter()
            .map(|&v| transform.apply(name, v))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            x,
            y,
            values,
            transform,
        })
    }

    #[must_use]
    pub fn x(&self) -> &Axis {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &Axis {
        &self.y
    }

    fn node(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.y.len() + j]
    }

    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> Sample {
        let (i, s, ds) = self.x.locate(x);
        let (j, t, dt) = self.y.locate(y);

        let f00 = self.node(i, j);
        let f10 = self.node(i + 1, j);
        let f01 = self.node(i, j + 1);
        let f11 = self.node(i + 1, j + 1);

        let interpolated = (1.0 - s) * (1.0 - t) * f00
            + s * (1.0 - t) * f10
            + (1.0 - s) * t * f01
            + s * t * f11;
        let di_ds = (1.0 - t) * (f10 - f00) + t * (f11 - f01);
        let di_dt = (1.0 - s) * (f01 - f00) + s * (f11 - f10);

        let slope = self.transform.inverse_slope(interpolated);
        Sample {
            value: self.transform.inverse(interpolated),
            dx: slope * di_ds * ds,
            dy: slope * di_dt * dt,
        }
    }

    #[must_use]
    pub fn value(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::eos::test_support::central_difference;

    fn plane() -> LookupTable2D {
        // f(x, y) = 2x + 3y + 1 is reproduced exactly by bilinear interpolation.
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 2.0];
        let values: Vec<f64> = xs
            .iter()
            .flat_map(|&x| ys.iter().map(move |&y| 2.0 * x + 3.0 * y + 1.0))
            .collect();

        LookupTable2D::new(
            "f",
            Axis::new("x", &xs, Transform::None).unwrap(),
            Axis::new("y", &ys, Transform::None).unwrap(),
            &values,
            Transform::None,
        )
        .unwrap()
    }

    #[test]
    fn reproduces_plane_inside_and_outside_grid() {
        let table = plane();
        for (x, y) in [(0.5, 1.0), (2.0, 0.3), (-1.0, 1.0), (5.0, -2.0), (3.0, 2.0)] {
            let sample = table.sample(x, y);
            assert_relative_eq!(sample.value, 2.0 * x + 3.0 * y + 1.0, epsilon = 1e-12);
            assert_relative_eq!(sample.dx, 2.0, epsilon = 1e-12);
            assert_relative_eq!(sample.dy, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn log_transforms_reproduce_power_law() {
        // p = 7·ρ^1.5 is linear in (ln ρ, ln p).
        let rhos = [0.1, 1.0, 10.0, 100.0];
        let es = [1.0, 2.0];
        let values: Vec<f64> = rhos
            .iter()
            .flat_map(|&rho| es.iter().map(move |_| 7.0 * f64::powf(rho, 1.5)))
            .collect();

        let table = LookupTable2D::new(
            "p",
            Axis::new("rho", &rhos, Transform::Log10).unwrap(),
            Axis::new("e", &es, Transform::None).unwrap(),
            &values,
            Transform::Ln,
        )
        .unwrap();

        for rho in [0.3, 4.0, 55.0, 400.0] {
            let sample = table.sample(rho, 1.5);
            assert_relative_eq!(sample.value, 7.0 * rho.powf(1.5), max_relative = 1e-10);
            assert_relative_eq!(
                sample.dx,
                central_difference(|r| table.value(r, 1.5), rho),
                max_relative = 1e-6
            );
            assert_relative_eq!(sample.dy, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn rejects_malformed_tables() {
        assert_eq!(
            Axis::new("rho", &[1.0], Transform::None),
            Err(TableError::TooFewPoints { axis: "rho", found: 1 })
        );
        assert_eq!(
            Axis::new("rho", &[1.0, 1.0], Transform::None),
            Err(TableError::NotIncreasing { axis: "rho" })
        );
        assert!(matches!(
            Axis::new("e", &[-1.0, 1.0], Transform::Ln),
            Err(TableError::Untransformable { name: "e", .. })
        ));

        let x = Axis::new("x", &[0.0, 1.0], Transform::None).unwrap();
        let y = Axis::new("y", &[0.0, 1.0], Transform::None).unwrap();
        assert_eq!(
            LookupTable2D::new("f", x, y, &[1.0, 2.0, 3.0], Transform::None),
            Err(TableError::Shape {
                name: "f",
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn unknown_transform_is_a_config_error() {
        assert!(matches!(
            Transform::from_name("sqrt"),
            Err(ConfigError::UnknownType { .. })
        ));
        assert_eq!(Transform::from_name("log10").unwrap(), Transform::Log10);
    }
}
