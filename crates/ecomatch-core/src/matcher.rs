use serde::Serialize;

use crate::geo::{distance_km, Coordinate, GeoError};

/// Catchment radius substituted under [`RadiusPolicy::Fallback`] when no
/// other default is configured.
pub const DEFAULT_RADIUS_KM: f64 = 40.0;

/// What to do with a radius that is missing, non-numeric, or not positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RadiusPolicy {
    /// Fail with [`GeoError::MissingRadius`] or [`GeoError::InvalidRadius`].
    #[default]
    Reject,
    /// Substitute the given radius and log a warning.
    Fallback(f64),
}

impl RadiusPolicy {
    /// Turn a caller-supplied radius into a usable one.
    ///
    /// # Errors
    ///
    /// Under `Reject`, returns the reason the raw radius is unusable. Under
    /// `Fallback`, only fails if the substitute itself is not positive.
    pub fn resolve(self, raw: Option<f64>) -> Result<f64, GeoError> {
        let rejection = match raw {
            Some(r) if is_valid_radius(r) => return Ok(r),
            Some(r) => GeoError::InvalidRadius(r),
            None => GeoError::MissingRadius,
        };

        match self {
            RadiusPolicy::Reject => Err(rejection),
            RadiusPolicy::Fallback(default) if is_valid_radius(default) => {
                tracing::warn!(
                    raw = ?raw,
                    substitute_km = default,
                    "radius unusable; falling back to default"
                );
                Ok(default)
            }
            RadiusPolicy::Fallback(default) => Err(GeoError::InvalidRadius(default)),
        }
    }
}

fn is_valid_radius(r: f64) -> bool {
    r.is_finite() && r > 0.0
}

/// Center point plus catchment radius of a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    center: Coordinate,
    radius_km: f64,
}

impl Anchor {
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidRadius`] unless `radius_km` is positive and
    /// finite.
    pub fn new(center: Coordinate, radius_km: f64) -> Result<Self, GeoError> {
        if !is_valid_radius(radius_km) {
            return Err(GeoError::InvalidRadius(radius_km));
        }
        Ok(Self { center, radius_km })
    }

    /// Build an anchor from a possibly missing radius, applying `policy`.
    ///
    /// # Errors
    ///
    /// See [`RadiusPolicy::resolve`].
    pub fn resolve(
        center: Coordinate,
        raw_radius_km: Option<f64>,
        policy: RadiusPolicy,
    ) -> Result<Self, GeoError> {
        let radius_km = policy.resolve(raw_radius_km)?;
        Self::new(center, radius_km)
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        self.center
    }

    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }
}

/// Something that can be matched against an anchor. `identity` is carried
/// through to the resulting [`Match`] untouched.
#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub identity: T,
    pub coordinate: Coordinate,
}

impl<T> Candidate<T> {
    pub fn new(identity: T, coordinate: Coordinate) -> Self {
        Self {
            identity,
            coordinate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match<T> {
    pub identity: T,
    /// Rounded to 0.1 km.
    pub distance_km: f64,
}

/// Candidates within `anchor`'s radius (inclusive), nearest first.
///
/// Candidates at equal distance keep their input order.
pub fn find_matches<T, I>(anchor: &Anchor, candidates: I) -> Vec<Match<T>>
where
    I: IntoIterator<Item = Candidate<T>>,
{
    let mut matches: Vec<Match<T>> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = distance_km(anchor.center, candidate.coordinate);
            (distance <= anchor.radius_km).then_some(Match {
                identity: candidate.identity,
                distance_km: distance,
            })
        })
        .collect();

    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    matches
}
