//! The GHCN-Daily elements this crate understands.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Represents the type of measurement. See the [GHCN-Daily readme](https://www.ncei.noaa.gov/pub/data/ghcn/daily/readme.txt)
/// section III for the element definitions.
pub enum Element {
    /// Maximum temperature, tenths of degrees C
    Tmax,
    /// Minimum temperature, tenths of degrees C
    Tmin,
    /// Precipitation, tenths of mm
    Prcp,
    /// Snowfall, mm
    Snow,
    /// Snow depth, mm
    Snwd,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementSpec {
    pub element: Element,
    pub code: &'static str,
    pub index: usize,
    pub divisor: f32,
}

pub const NUM_ELEMENTS: usize = 5;

/// Element code to grid index and scale divisor.
pub const ELEMENTS: [ElementSpec; NUM_ELEMENTS] = [
    ElementSpec { element: Element::Tmax, code: "TMAX", index: 0, divisor: 10.0 },
    ElementSpec { element: Element::Tmin, code: "TMIN", index: 1, divisor: 10.0 },
    ElementSpec { element: Element::Prcp, code: "PRCP", index: 2, divisor: 10.0 },
    ElementSpec { element: Element::Snow, code: "SNOW", index: 3, divisor: 1.0 },
    ElementSpec { element: Element::Snwd, code: "SNWD", index: 4, divisor: 1.0 },
];

impl Element {
    pub const ALL: [Element; NUM_ELEMENTS] = [
        Element::Tmax,
        Element::Tmin,
        Element::Prcp,
        Element::Snow,
        Element::Snwd,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        ELEMENTS
            .iter()
            .find(|spec| spec.code == code)
            .map(|spec| spec.element)
    }

    pub fn spec(&self) -> &'static ElementSpec {
        &ELEMENTS[*self as usize]
    }

    pub fn code(&self) -> &'static str {
        self.spec().code
    }

    pub fn index(&self) -> usize {
        self.spec().index
    }

    pub fn divisor(&self) -> f32 {
        self.spec().divisor
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The element codes a decoder should keep; everything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSet {
    mask: u8,
}

impl ElementSet {
    pub fn all() -> Self {
        Self::only(&Element::ALL)
    }

    pub fn only(elements: &[Element]) -> Self {
        let mask = elements
            .iter()
            .fold(0u8, |mask, element| mask | (1 << element.index()));
        ElementSet { mask }
    }

    pub fn contains(&self, element: Element) -> bool {
        self.mask & (1 << element.index()) != 0
    }

    /// Looks up a raw element code, returning it only if it is in the set.
    pub fn recognise(&self, code: &str) -> Option<Element> {
        Element::from_code(code).filter(|element| self.contains(*element))
    }
}

impl Default for ElementSet {
    fn default() -> Self {
        Self::all()
    }
}
