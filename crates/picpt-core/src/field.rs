//! Field components, their mesh staggering, and sampled field vectors.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::ParameterError;

/// Sub-cell placement of a component on the staggered mesh.
///
/// A staggered component is averaged over the two (or four) cells that
/// straddle the node before bilinear interpolation, which widens its
/// stencil from 2×2 to 2×3, 3×2 or 3×3 cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stagger {
    /// Co-located with the cell corner.
    Node,
    /// Face-centred in x: averaged over columns `c-1` and `c`.
    XFace,
    /// Face-centred in z: averaged over rows `r-1` and `r`.
    ZFace,
    /// Face-centred in both x and z: averaged over the 2×2 block ending at `(r, c)`.
    XZFace,
}

impl Stagger {
    /// Whether the node value averages adjacent columns.
    pub fn averages_x(self) -> bool {
        matches!(self, Self::XFace | Self::XZFace)
    }

    /// Whether the node value averages adjacent rows.
    pub fn averages_z(self) -> bool {
        matches!(self, Self::ZFace | Self::XZFace)
    }
}

/// One of the six electromagnetic field components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldComponent {
    /// Magnetic field, x component.
    Bx,
    /// Magnetic field, y component.
    By,
    /// Magnetic field, z component.
    Bz,
    /// Electric field, x component.
    Ex,
    /// Electric field, y component.
    Ey,
    /// Electric field, z component.
    Ez,
}

impl FieldComponent {
    /// Number of components.
    pub const COUNT: usize = 6;

    /// All components in storage order.
    pub const ALL: [FieldComponent; 6] = [
        Self::Bx,
        Self::By,
        Self::Bz,
        Self::Ex,
        Self::Ey,
        Self::Ez,
    ];

    /// Position in storage order (`Bx = 0` .. `Ez = 5`).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name as used in file names and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bx => "Bx",
            Self::By => "By",
            Self::Bz => "Bz",
            Self::Ex => "Ex",
            Self::Ey => "Ey",
            Self::Ez => "Ez",
        }
    }

    /// Where this component sits on the staggered mesh.
    pub fn stagger(self) -> Stagger {
        match self {
            Self::Bx | Self::Ez => Stagger::ZFace,
            Self::Bz | Self::Ex => Stagger::XFace,
            Self::By => Stagger::XZFace,
            Self::Ey => Stagger::Node,
        }
    }
}

impl fmt::Display for FieldComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field quantity that can be inspected per grid site.
///
/// The single-component selectors read one grid; `B` and `E` combine the
/// three components of a vector into its magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldSelector {
    /// `Bx` component.
    Bx,
    /// `By` component.
    By,
    /// `Bz` component.
    Bz,
    /// Magnitude of the magnetic field.
    B,
    /// `Ex` component.
    Ex,
    /// `Ey` component.
    Ey,
    /// `Ez` component.
    Ez,
    /// Magnitude of the electric field.
    E,
}

impl FieldSelector {
    /// Components read by this selector.
    pub fn components(self) -> &'static [FieldComponent] {
        use FieldComponent as C;
        match self {
            Self::Bx => &[C::Bx],
            Self::By => &[C::By],
            Self::Bz => &[C::Bz],
            Self::B => &[C::Bx, C::By, C::Bz],
            Self::Ex => &[C::Ex],
            Self::Ey => &[C::Ey],
            Self::Ez => &[C::Ez],
            Self::E => &[C::Ex, C::Ey, C::Ez],
        }
    }

    /// Whether the selector reports a vector magnitude.
    pub fn is_magnitude(self) -> bool {
        matches!(self, Self::B | Self::E)
    }

    /// Combine per-component site values into the selected quantity.
    ///
    /// `values` must be in the order returned by [`components`](Self::components).
    pub fn combine(self, values: &[f64]) -> f64 {
        if self.is_magnitude() {
            values.iter().map(|v| v * v).sum::<f64>().sqrt()
        } else {
            values.first().copied().unwrap_or(0.0)
        }
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::B => "B",
            Self::E => "E",
            other => other.components()[0].name(),
        };
        f.write_str(name)
    }
}

impl FromStr for FieldSelector {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bx" => Ok(Self::Bx),
            "By" => Ok(Self::By),
            "Bz" => Ok(Self::Bz),
            "B" => Ok(Self::B),
            "Ex" => Ok(Self::Ex),
            "Ey" => Ok(Self::Ey),
            "Ez" => Ok(Self::Ez),
            "E" => Ok(Self::E),
            other => Err(ParameterError::new(
                "field",
                format!("unknown field selector '{other}' (expected Bx|By|Bz|B|Ex|Ey|Ez|E)"),
            )),
        }
    }
}

/// The six field components sampled at one position, in storage order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldSample(pub [f64; 6]);

impl FieldSample {
    /// All components zero.
    pub const ZERO: Self = Self([0.0; 6]);

    /// Build from separate magnetic and electric vectors.
    pub fn from_vectors(b: [f64; 3], e: [f64; 3]) -> Self {
        Self([b[0], b[1], b[2], e[0], e[1], e[2]])
    }

    /// The magnetic vector `(Bx, By, Bz)`.
    pub fn b(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// The electric vector `(Ex, Ey, Ez)`.
    pub fn e(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Every component multiplied by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self(self.0.map(|v| v * factor))
    }
}

impl Index<FieldComponent> for FieldSample {
    type Output = f64;

    fn index(&self, c: FieldComponent) -> &f64 {
        &self.0[c.index()]
    }
}
