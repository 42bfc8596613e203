//! Physical quantities used throughout the model.

macro_rules! float_unit {
    ($name: ident, $suffix: literal) => {
        #[allow(missing_docs)]
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            PartialEq,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Sum,
            derive_more::From,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(f64);

        #[allow(missing_docs)]
        impl $name {
            pub const ZERO: $name = Self::new(0.0);

            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            pub const fn into_f64(self) -> f64 {
                self.0
            }

            pub fn scale_by(self, factor: f64) -> Self {
                Self(self.0 * factor)
            }

            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", self.0, $suffix)
            }
        }
    };
}

float_unit!(Kilometers, "km");
float_unit!(Gbps, "Gbps");

/// A bandwidth tier of the modulation table, in Gbps.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Tier(u32);

impl Tier {
    /// Volumes below this are carried on the smallest tier.
    pub const FLOOR: Gbps = Gbps::new(50.0);

    /// The smallest tier.
    pub const MIN: Tier = Tier::new(100);

    /// Creates a tier of `gbps`.
    pub const fn new(gbps: u32) -> Self {
        Self(gbps)
    }

    /// Returns the tier in Gbps.
    pub const fn into_u32(self) -> u32 {
        self.0
    }

    /// Normalizes a raw volume onto the tier grid. Volumes below 50 Gbps use the 100 Gbps tier,
    /// all others round to the nearest multiple of 100 with ties going up.
    ///
    /// Volumes beyond the `u32` range saturate at `u32::MAX`, which no modulation table lists. NaN
    /// uses the smallest tier.
    pub fn normalize(volume: Gbps) -> Self {
        if volume.into_f64().is_nan() || volume < Self::FLOOR {
            return Self::MIN;
        }
        let hundreds = (volume.into_f64() / 100.0 + 0.5).floor();
        // Float-to-int `as` saturates
        Self((hundreds as u32).saturating_mul(100))
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Gbps", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_volumes_use_the_smallest_tier() {
        assert_eq!(Tier::normalize(Gbps::new(0.0)), Tier::new(100));
        assert_eq!(Tier::normalize(Gbps::new(20.0)), Tier::new(100));
        assert_eq!(Tier::normalize(Gbps::new(40.0)), Tier::new(100));
        assert_eq!(Tier::normalize(Gbps::new(49.999)), Tier::new(100));
    }

    #[test]
    fn fifty_rounds_up_to_one_hundred() {
        assert_eq!(Tier::normalize(Gbps::new(50.0)), Tier::new(100));
        assert_eq!(Tier::normalize(Gbps::new(60.0)), Tier::new(100));
    }

    #[test]
    fn ties_round_up() {
        assert_eq!(Tier::normalize(Gbps::new(150.0)), Tier::new(200));
        assert_eq!(Tier::normalize(Gbps::new(250.0)), Tier::new(300));
        assert_eq!(Tier::normalize(Gbps::new(950.0)), Tier::new(1000));
    }

    #[test]
    fn just_below_a_tie_rounds_down() {
        assert_eq!(Tier::normalize(Gbps::new(149.99)), Tier::new(100));
        assert_eq!(Tier::normalize(Gbps::new(249.5)), Tier::new(200));
        assert_eq!(Tier::normalize(Gbps::new(250.01)), Tier::new(300));
    }

    #[test]
    fn scaled_volumes_normalize() {
        // 60% of 300 Gbps is 180 Gbps, 20% of 300 Gbps is 60 Gbps (with float noise).
        assert_eq!(Tier::normalize(Gbps::new(300.0).scale_by(0.6)), Tier::new(200));
        assert_eq!(Tier::normalize(Gbps::new(300.0).scale_by(0.2)), Tier::new(100));
    }

    #[test]
    fn huge_volumes_saturate() {
        assert_eq!(Tier::normalize(Gbps::new(1e12)), Tier::new(u32::MAX));
        assert_eq!(Tier::normalize(Gbps::new(f64::INFINITY)), Tier::new(u32::MAX));
        assert_eq!(Tier::normalize(Gbps::new(4_294_967_300.0)), Tier::new(u32::MAX));
        assert_eq!(Tier::normalize(Gbps::new(f64::NAN)), Tier::MIN);
    }

    #[test]
    fn lengths_sum() {
        let total: Kilometers = [100.0, 250.5].into_iter().map(Kilometers::new).sum();
        assert_eq!(total, Kilometers::new(350.5));
        assert_eq!(total.to_string(), "350.5km");
    }
}
