//! SGP4/SDP4 propagation of mean element sets.
//!
//! This follows the "Revisiting Spacetrack Report #3" (Vallado et al., 2006)
//! formulation with the WGS-72 gravity model the element sets are fit against.
//! Initialization happens once per element set in [`Propagator::new`], after
//! which propagation to any instant is a pure function of the elapsed time.

use crate::frames::gstime;
use orbit_types::{
    prelude::*,
    time::{julian_date, MINUTES_PER_DAY},
};
use std::{
    f64::consts::{PI, TAU},
    fmt,
};
use tracing::trace;

mod deep_space;

use deep_space::{DeepSpace, MeanState, PerturbedState};

/// WGS-72 constants
pub mod wgs72 {
    /// Gravitational parameter [km^3/s^2]
    pub const MU: f64 = 398_600.8;
    /// Equatorial radius [km]
    pub const RADIUS_EARTH_KM: f64 = 6378.135;
    /// sqrt(mu) in earth radii^1.5 per minute
    pub const XKE: f64 = 0.074_366_916_133_173_42;
    pub const J2: f64 = 0.001_082_616;
    pub const J3: f64 = -0.000_002_538_81;
    pub const J4: f64 = -0.000_001_655_97;
    pub const J3OJ2: f64 = J3 / J2;
}

use wgs72::{J2, J3OJ2, J4, RADIUS_EARTH_KM, XKE};

/// Orbital period at or above which the deep-space (SDP4) branch is used [min]
pub const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;

/// Julian date of 1949-12-31T00:00:00Z, the SGP4 time reference
const JD_1950: f64 = 2_433_281.5;

const X2O3: f64 = 2.0 / 3.0;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
pub enum PropagationFailure {
    #[error("Eccentricity left the valid range")]
    InvalidEccentricity,

    #[error("Mean semi-major axis is below 0.95 earth radii or mean motion is not positive")]
    InvalidSemiMajorAxis,

    #[error("Satellite has decayed")]
    Decayed,

    #[error("Propagation diverged numerically")]
    NumericDivergence,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OrbitModel {
    /// SGP4, period below 225 minutes
    NearEarth,
    /// SDP4, with lunar-solar perturbations and resonance effects
    DeepSpace,
}

impl fmt::Display for OrbitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitModel::NearEarth => f.write_str("near-earth"),
            OrbitModel::DeepSpace => f.write_str("deep-space"),
        }
    }
}

/// Propagate an element set to an instant
pub fn propagate(
    elements: &ElementSet,
    instant: UtcTimestamp,
) -> Result<StateVector, PropagationFailure> {
    Propagator::new(elements)?.state_at(instant)
}

/// The branch an element set propagates with, from its un-Kozai'd mean motion
pub fn orbit_model(elements: &ElementSet) -> OrbitModel {
    let no_kozai = elements.mean_motion() * TAU / MINUTES_PER_DAY;
    let (no_unkozai, _) = recover_mean_motion(
        no_kozai,
        elements.eccentricity(),
        elements.inclination().to_radians().cos(),
    );
    model_for(no_unkozai)
}

fn model_for(no_unkozai: f64) -> OrbitModel {
    if TAU / no_unkozai >= DEEP_SPACE_PERIOD_MINUTES {
        OrbitModel::DeepSpace
    } else {
        OrbitModel::NearEarth
    }
}

/// Un-Kozai'd mean motion [rad/min] and semi-major axis [earth radii]
fn recover_mean_motion(no_kozai: f64, ecco: f64, cosio: f64) -> (f64, f64) {
    let omeosq = 1.0 - ecco * ecco;
    let rteosq = omeosq.sqrt();
    let ak = (XKE / no_kozai).powf(X2O3);
    let d1 = 0.75 * J2 * (3.0 * cosio * cosio - 1.0) / (rteosq * omeosq);
    let de = d1 / (ak * ak);
    let adel = ak * (1.0 - de * de - de * (1.0 / 3.0 + 134.0 * de * de / 81.0));
    let de = d1 / (adel * adel);
    let no = no_kozai / (1.0 + de);
    (no, (XKE / no).powf(X2O3))
}

/// Epoch mean elements in radians and radians per minute
#[derive(Copy, Clone, PartialEq, Debug)]
struct EpochElements {
    bstar: f64,
    ecco: f64,
    inclo: f64,
    nodeo: f64,
    argpo: f64,
    mo: f64,
}

/// Secular drag coefficients, only used for near-earth orbits with perigee above 220 km
#[derive(Copy, Clone, PartialEq, Debug)]
struct DragTerms {
    d2: f64,
    d3: f64,
    d4: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
}

/// An initialized element set, ready to be propagated to any instant
#[derive(Clone, PartialEq, Debug)]
pub struct Propagator {
    epoch: UtcTimestamp,
    el: EpochElements,
    no: f64,
    ao: f64,
    con41: f64,
    cosio: f64,
    sinio: f64,
    x1mth2: f64,
    x7thm1: f64,
    eta: f64,
    cc1: f64,
    cc4: f64,
    cc5: f64,
    mdot: f64,
    argpdot: f64,
    nodedot: f64,
    omgcof: f64,
    xmcof: f64,
    nodecf: f64,
    t2cof: f64,
    xlcof: f64,
    aycof: f64,
    delmo: f64,
    sinmao: f64,
    drag: Option<DragTerms>,
    deep_space: Option<Box<DeepSpace>>,
}

impl Propagator {
    pub fn new(elements: &ElementSet) -> Result<Self, PropagationFailure> {
        let el = EpochElements {
            bstar: elements.bstar(),
            ecco: elements.eccentricity(),
            inclo: elements.inclination().to_radians(),
            nodeo: elements.right_ascension().to_radians(),
            argpo: elements.argument_of_perigee().to_radians(),
            mo: elements.mean_anomaly().to_radians(),
        };
        let no_kozai = elements.mean_motion() * TAU / MINUTES_PER_DAY;
        if !(0.0..1.0).contains(&el.ecco) {
            return Err(PropagationFailure::InvalidEccentricity);
        }
        if no_kozai <= 0.0 || !no_kozai.is_finite() {
            return Err(PropagationFailure::InvalidSemiMajorAxis);
        }

        let epoch = elements.epoch();
        let epoch_days = julian_date(epoch) - JD_1950;
        let gsto = gstime(epoch_days + JD_1950);

        let ss = 78.0 / RADIUS_EARTH_KM + 1.0;
        let qzms2t = ((120.0 - 78.0) / RADIUS_EARTH_KM).powi(4);

        let ecco = el.ecco;
        let eccsq = ecco * ecco;
        let omeosq = 1.0 - eccsq;
        let rteosq = omeosq.sqrt();
        let cosio = el.inclo.cos();
        let cosio2 = cosio * cosio;

        let (no, ao) = recover_mean_motion(no_kozai, ecco, cosio);
        if !ao.is_finite() || ao < 0.95 {
            return Err(PropagationFailure::InvalidSemiMajorAxis);
        }

        let sinio = el.inclo.sin();
        let po = ao * omeosq;
        let con42 = 1.0 - 5.0 * cosio2;
        let con41 = -con42 - cosio2 - cosio2;
        let posq = po * po;
        let rp = ao * (1.0 - ecco);

        // Perigee dependent atmosphere fitting parameters
        let mut sfour = ss;
        let mut qzms24 = qzms2t;
        let perige = (rp - 1.0) * RADIUS_EARTH_KM;
        if perige < 156.0 {
            sfour = if perige < 98.0 { 20.0 } else { perige - 78.0 };
            qzms24 = ((120.0 - sfour) / RADIUS_EARTH_KM).powi(4);
            sfour = sfour / RADIUS_EARTH_KM + 1.0;
        }

        let pinvsq = 1.0 / posq;
        let tsi = 1.0 / (ao - sfour);
        let eta = ao * ecco * tsi;
        let etasq = eta * eta;
        let eeta = ecco * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qzms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);
        let cc2 = coef1
            * no
            * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.375 * J2 * tsi / psisq * con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let cc1 = el.bstar * cc2;
        let cc3 = if ecco > 1.0e-4 {
            -2.0 * coef * tsi * J3OJ2 * no * sinio / ecco
        } else {
            0.0
        };
        let x1mth2 = 1.0 - cosio2;
        let cc4 = 2.0
            * no
            * coef1
            * ao
            * omeosq
            * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
                - J2 * tsi / (ao * psisq)
                    * (-3.0 * con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * el.argpo).cos()));
        let cc5 = 2.0 * coef1 * ao * omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let cosio4 = cosio2 * cosio2;
        let temp1 = 1.5 * J2 * pinvsq * no;
        let temp2 = 0.5 * temp1 * J2 * pinvsq;
        let temp3 = -0.46875 * J4 * pinvsq * pinvsq * no;
        let mdot = no
            + 0.5 * temp1 * rteosq * con41
            + 0.0625 * temp2 * rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
        let argpdot = -0.5 * temp1 * con42
            + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
            + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
        let xhdot1 = -temp1 * cosio;
        let nodedot =
            xhdot1 + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;
        let xpidot = argpdot + nodedot;
        let omgcof = el.bstar * cc3 * el.argpo.cos();
        let xmcof = if ecco > 1.0e-4 {
            -X2O3 * coef * el.bstar / eeta
        } else {
            0.0
        };
        let nodecf = 3.5 * omeosq * xhdot1 * cc1;
        let t2cof = 1.5 * cc1;
        let xlcof = long_period_xlcof(sinio, cosio);
        let aycof = -0.5 * J3OJ2 * sinio;
        let delmo = (1.0 + eta * el.mo.cos()).powi(3);
        let sinmao = el.mo.sin();
        let x7thm1 = 7.0 * cosio2 - 1.0;

        let model = model_for(no);
        let deep_space = match model {
            OrbitModel::DeepSpace => Some(Box::new(DeepSpace::new(
                epoch_days,
                &deep_space::InitialOrbit {
                    ecco,
                    eccsq,
                    inclo: el.inclo,
                    nodeo: el.nodeo,
                    argpo: el.argpo,
                    mo: el.mo,
                    no,
                    mdot,
                    nodedot,
                    argpdot,
                    xpidot,
                    gsto,
                },
            ))),
            OrbitModel::NearEarth => None,
        };

        // Low perigee and deep-space orbits use the truncated drag model
        let simplified = rp < 220.0 / RADIUS_EARTH_KM + 1.0 || deep_space.is_some();
        let drag = if simplified {
            None
        } else {
            let cc1sq = cc1 * cc1;
            let d2 = 4.0 * ao * tsi * cc1sq;
            let temp = d2 * tsi * cc1 / 3.0;
            let d3 = (17.0 * ao + sfour) * temp;
            let d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * cc1;
            Some(DragTerms {
                d2,
                d3,
                d4,
                t3cof: d2 + 2.0 * cc1sq,
                t4cof: 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq)),
                t5cof: 0.2 * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq)),
            })
        };

        trace!(
            catalog_id = %elements.catalog_id(),
            %model,
            period_minutes = TAU / no,
            "Initialized propagator"
        );

        Ok(Self {
            epoch,
            el,
            no,
            ao,
            con41,
            cosio,
            sinio,
            x1mth2,
            x7thm1,
            eta,
            cc1,
            cc4,
            cc5,
            mdot,
            argpdot,
            nodedot,
            omgcof,
            xmcof,
            nodecf,
            t2cof,
            xlcof,
            aycof,
            delmo,
            sinmao,
            drag,
            deep_space,
        })
    }

    pub fn model(&self) -> OrbitModel {
        if self.deep_space.is_some() {
            OrbitModel::DeepSpace
        } else {
            OrbitModel::NearEarth
        }
    }

    pub fn epoch(&self) -> UtcTimestamp {
        self.epoch
    }

    /// Un-Kozai'd mean motion [rad/min]
    pub fn mean_motion(&self) -> f64 {
        self.no
    }

    /// Mean semi-major axis at epoch [earth radii]
    pub fn semi_major_axis(&self) -> f64 {
        self.ao
    }

    /// State at `instant`, in TEME
    pub fn state_at(&self, instant: UtcTimestamp) -> Result<StateVector, PropagationFailure> {
        let tsince = minutes_between(self.epoch, instant);
        let (position, velocity) = self.propagate_minutes(tsince)?;
        Ok(StateVector::new(instant, position, velocity))
    }

    /// Position [km] and velocity [km/s] in TEME, `tsince` minutes after epoch
    pub fn propagate_minutes(
        &self,
        tsince: f64,
    ) -> Result<(na::Vector3<f64>, na::Vector3<f64>), PropagationFailure> {
        let t = tsince;
        let el = &self.el;

        // Secular gravity and atmospheric drag
        let xmdf = el.mo + self.mdot * t;
        let argpdf = el.argpo + self.argpdot * t;
        let nodedf = el.nodeo + self.nodedot * t;
        let t2 = t * t;
        let mut mean = MeanState {
            em: el.ecco,
            argpm: argpdf,
            inclm: el.inclo,
            mm: xmdf,
            nodem: nodedf + self.nodecf * t2,
            nm: self.no,
        };
        let mut tempa = 1.0 - self.cc1 * t;
        let mut tempe = el.bstar * self.cc4 * t;
        let mut templ = self.t2cof * t2;

        if let Some(drag) = &self.drag {
            let delomg = self.omgcof * t;
            let delm = self.xmcof * ((1.0 + self.eta * xmdf.cos()).powi(3) - self.delmo);
            let temp = delomg + delm;
            mean.mm = xmdf + temp;
            mean.argpm = argpdf - temp;
            let t3 = t2 * t;
            let t4 = t3 * t;
            tempa = tempa - drag.d2 * t2 - drag.d3 * t3 - drag.d4 * t4;
            tempe += el.bstar * self.cc5 * (mean.mm.sin() - self.sinmao);
            templ += drag.t3cof * t3 + t4 * (drag.t4cof + t * drag.t5cof);
        }

        if let Some(ds) = &self.deep_space {
            ds.secular(t, self.no, el.argpo, self.argpdot, &mut mean);
        }

        if mean.nm <= 0.0 {
            return Err(PropagationFailure::InvalidSemiMajorAxis);
        }
        let am = (XKE / mean.nm).powf(X2O3) * tempa * tempa;
        let nm = XKE / am.powf(1.5);
        let mut em = mean.em - tempe;

        if !am.is_finite() || am < 0.95 {
            return Err(PropagationFailure::InvalidSemiMajorAxis);
        }
        if !(-0.001..1.0).contains(&em) {
            return Err(PropagationFailure::InvalidEccentricity);
        }
        if em < 1.0e-6 {
            em = 1.0e-6;
        }

        let mm = mean.mm + self.no * templ;
        let xlm = mm + mean.argpm + mean.nodem;
        let nodem = mean.nodem % TAU;
        let argpm = mean.argpm % TAU;
        let xlm = xlm % TAU;
        let mm = (xlm - argpm - nodem) % TAU;

        // Lunar-solar periodics
        let mut p = PerturbedState {
            ep: em,
            xincp: mean.inclm,
            nodep: nodem,
            argpp: argpm,
            mp: mm,
        };
        let mut sinip = p.xincp.sin();
        let mut cosip = p.xincp.cos();
        let (mut aycof, mut xlcof) = (self.aycof, self.xlcof);
        let (mut con41, mut x1mth2, mut x7thm1) = (self.con41, self.x1mth2, self.x7thm1);

        if let Some(ds) = &self.deep_space {
            ds.periodics(t, &mut p);
            if p.xincp < 0.0 {
                p.xincp = -p.xincp;
                p.nodep += PI;
                p.argpp -= PI;
            }
            if !(0.0..=1.0).contains(&p.ep) {
                return Err(PropagationFailure::InvalidEccentricity);
            }
            sinip = p.xincp.sin();
            cosip = p.xincp.cos();
            aycof = -0.5 * J3OJ2 * sinip;
            xlcof = long_period_xlcof(sinip, cosip);
            let cosisq = cosip * cosip;
            con41 = 3.0 * cosisq - 1.0;
            x1mth2 = 1.0 - cosisq;
            x7thm1 = 7.0 * cosisq - 1.0;
        }

        // Long period periodics
        let axnl = p.ep * p.argpp.cos();
        let temp = 1.0 / (am * (1.0 - p.ep * p.ep));
        let aynl = p.ep * p.argpp.sin() + temp * aycof;
        let xl = p.mp + p.argpp + p.nodep + temp * xlcof * axnl;

        // Kepler's equation, last iterate is kept if it doesn't settle within 10 steps
        let u = (xl - p.nodep) % TAU;
        let mut eo1 = u;
        let mut tem5: f64 = 9999.9;
        let mut ktr = 1;
        let (mut sineo1, mut coseo1) = (0.0, 0.0);
        while tem5.abs() >= 1.0e-12 && ktr <= 10 {
            sineo1 = eo1.sin();
            coseo1 = eo1.cos();
            tem5 = 1.0 - coseo1 * axnl - sineo1 * aynl;
            tem5 = (u - aynl * coseo1 + axnl * sineo1 - eo1) / tem5;
            if tem5.abs() >= 0.95 {
                tem5 = 0.95_f64.copysign(tem5);
            }
            eo1 += tem5;
            ktr += 1;
        }

        // Short period periodics
        let ecose = axnl * coseo1 + aynl * sineo1;
        let esine = axnl * sineo1 - aynl * coseo1;
        let el2 = axnl * axnl + aynl * aynl;
        let pl = am * (1.0 - el2);
        if pl < 0.0 {
            return Err(PropagationFailure::NumericDivergence);
        }
        let rl = am * (1.0 - ecose);
        let rdotl = am.sqrt() * esine / rl;
        let rvdotl = pl.sqrt() / rl;
        let betal = (1.0 - el2).sqrt();
        let temp = esine / (1.0 + betal);
        let sinu = am / rl * (sineo1 - aynl - axnl * temp);
        let cosu = am / rl * (coseo1 - axnl + aynl * temp);
        let su = sinu.atan2(cosu);
        let sin2u = (cosu + cosu) * sinu;
        let cos2u = 1.0 - 2.0 * sinu * sinu;
        let temp = 1.0 / pl;
        let temp1 = 0.5 * J2 * temp;
        let temp2 = temp1 * temp;

        let mrt = rl * (1.0 - 1.5 * temp2 * betal * con41) + 0.5 * temp1 * x1mth2 * cos2u;
        let su = su - 0.25 * temp2 * x7thm1 * sin2u;
        let xnode = p.nodep + 1.5 * temp2 * cosip * sin2u;
        let xinc = p.xincp + 1.5 * temp2 * cosip * sinip * cos2u;
        let mvt = rdotl - nm * temp1 * x1mth2 * sin2u / XKE;
        let rvdot = rvdotl + nm * temp1 * (x1mth2 * cos2u + 1.5 * con41) / XKE;

        // Orientation vectors
        let (sinsu, cossu) = su.sin_cos();
        let (snod, cnod) = xnode.sin_cos();
        let (sini, cosi) = xinc.sin_cos();
        let xmx = -snod * cosi;
        let xmy = cnod * cosi;
        let u = na::Vector3::new(xmx * sinsu + cnod * cossu, xmy * sinsu + snod * cossu, sini * sinsu);
        let v = na::Vector3::new(xmx * cossu - cnod * sinsu, xmy * cossu - snod * sinsu, sini * cossu);

        let position = u * (mrt * RADIUS_EARTH_KM);
        let velocity = (u * mvt + v * rvdot) * (RADIUS_EARTH_KM * XKE / 60.0);

        if mrt < 1.0 {
            return Err(PropagationFailure::Decayed);
        }
        if !position.iter().chain(velocity.iter()).all(|c| c.is_finite()) {
            return Err(PropagationFailure::NumericDivergence);
        }
        Ok((position, velocity))
    }
}

fn long_period_xlcof(sinio: f64, cosio: f64) -> f64 {
    // Avoids a division by zero for 180 degree inclinations
    let denom = if (cosio + 1.0).abs() > 1.5e-12 {
        1.0 + cosio
    } else {
        1.5e-12
    };
    -0.25 * J3OJ2 * sinio * (3.0 + 5.0 * cosio) / denom
}
