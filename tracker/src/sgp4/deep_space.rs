//! SDP4 deep-space terms: lunar-solar periodics, their secular rates and the
//! 12 and 24 hour geopotential resonance integration.

use super::{wgs72::XKE, X2O3};
use std::f64::consts::{PI, TAU};

// Solar and lunar constants
const ZNS: f64 = 1.19459e-5;
const ZES: f64 = 0.01675;
const ZNL: f64 = 1.5835218e-4;
const ZEL: f64 = 0.05490;
const C1SS: f64 = 2.9864797e-6;
const C1L: f64 = 4.7968065e-7;
const ZSINIS: f64 = 0.39785416;
const ZCOSIS: f64 = 0.91744867;
const ZCOSGS: f64 = 0.1945905;
const ZSINGS: f64 = -0.98088458;

/// Earth rotation rate [rad/min]
const RPTIM: f64 = 4.375_269_088_011_299_66e-3;

// Resonance integrator step [min] and half its square
const STEPP: f64 = 720.0;
const STEPN: f64 = -720.0;
const STEP2: f64 = 259_200.0;

/// Below this inclination (and above its supplement) the node terms are dropped [rad]
const LOW_INCLINATION: f64 = 5.2359877e-2;

/// Mean elements and rates at epoch the deep-space setup depends on
#[derive(Copy, Clone, PartialEq, Debug)]
pub(super) struct InitialOrbit {
    pub ecco: f64,
    pub eccsq: f64,
    pub inclo: f64,
    pub nodeo: f64,
    pub argpo: f64,
    pub mo: f64,
    pub no: f64,
    pub mdot: f64,
    pub nodedot: f64,
    pub argpdot: f64,
    pub xpidot: f64,
    pub gsto: f64,
}

/// Mean elements after the secular updates
#[derive(Copy, Clone, PartialEq, Debug)]
pub(super) struct MeanState {
    pub em: f64,
    pub argpm: f64,
    pub inclm: f64,
    pub mm: f64,
    pub nodem: f64,
    pub nm: f64,
}

/// Elements the lunar-solar periodics are applied to
#[derive(Copy, Clone, PartialEq, Debug)]
pub(super) struct PerturbedState {
    pub ep: f64,
    pub xincp: f64,
    pub nodep: f64,
    pub argpp: f64,
    pub mp: f64,
}

#[derive(Clone, PartialEq, Debug)]
pub(super) struct DeepSpace {
    solar: BodyPeriodics,
    lunar: BodyPeriodics,
    rates: SecularRates,
    resonance: Option<Resonance>,
    gsto: f64,
}

#[derive(Copy, Clone, PartialEq, Debug)]
struct SecularRates {
    dedt: f64,
    didt: f64,
    dmdt: f64,
    domdt: f64,
    dnodt: f64,
}

/// Periodic coefficients of one perturbing body
#[derive(Copy, Clone, PartialEq, Debug)]
struct BodyPeriodics {
    /// Mean anomaly of the body at epoch [rad]
    zmo: f64,
    /// Mean motion of the body [rad/min]
    zn: f64,
    /// Eccentricity of the body's apparent orbit
    ze: f64,
    e2: f64,
    e3: f64,
    i2: f64,
    i3: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    gh2: f64,
    gh3: f64,
    gh4: f64,
    h2: f64,
    h3: f64,
}

/// Terms of one perturbing body, shared by the periodic and secular setup
#[derive(Copy, Clone, PartialEq, Debug)]
struct BodyTerms {
    s1: f64,
    s2: f64,
    s3: f64,
    s4: f64,
    s5: f64,
    s6: f64,
    s7: f64,
    z1: f64,
    z2: f64,
    z3: f64,
    z11: f64,
    z12: f64,
    z13: f64,
    z21: f64,
    z22: f64,
    z23: f64,
    z31: f64,
    z32: f64,
    z33: f64,
}

/// Orientation of a perturbing body's orbit
#[derive(Copy, Clone, PartialEq, Debug)]
struct BodyGeometry {
    zcosg: f64,
    zsing: f64,
    zcosi: f64,
    zsini: f64,
    zcosh: f64,
    zsinh: f64,
    cc: f64,
}

/// Satellite orbit quantities the body terms are expanded around
#[derive(Copy, Clone, PartialEq, Debug)]
struct OrbitGeometry {
    em: f64,
    emsq: f64,
    betasq: f64,
    rtemsq: f64,
    sinim: f64,
    cosim: f64,
    sinomm: f64,
    cosomm: f64,
    xnoi: f64,
}

#[derive(Clone, PartialEq, Debug)]
enum Resonance {
    /// 24 hour, geosynchronous
    Synchronous {
        del1: f64,
        del2: f64,
        del3: f64,
        xlamo: f64,
        xfact: f64,
    },
    /// 12 hour, Molniya-type
    HalfDay {
        terms: [ResonanceTerm; 10],
        xlamo: f64,
        xfact: f64,
    },
}

/// `coef * sin(omega * argp + lambda * xli - phase)`
#[derive(Copy, Clone, PartialEq, Debug)]
struct ResonanceTerm {
    coef: f64,
    omega: f64,
    lambda: f64,
    phase: f64,
}

impl DeepSpace {
    pub(super) fn new(epoch_days: f64, orbit: &InitialOrbit) -> Self {
        let day = epoch_days + 18_261.5;
        let (snodm, cnodm) = orbit.nodeo.sin_cos();
        let (sinomm, cosomm) = orbit.argpo.sin_cos();
        let (sinim, cosim) = orbit.inclo.sin_cos();
        let em = orbit.ecco;
        let emsq = em * em;
        let betasq = 1.0 - emsq;
        let geometry = OrbitGeometry {
            em,
            emsq,
            betasq,
            rtemsq: betasq.sqrt(),
            sinim,
            cosim,
            sinomm,
            cosomm,
            xnoi: 1.0 / orbit.no,
        };

        // Lunar orbit orientation at epoch
        let xnodce = (4.523_602_0 - 9.242_202_9e-4 * day) % TAU;
        let (stem, ctem) = xnodce.sin_cos();
        let zcosil = 0.913_751_64 - 0.035_680_96 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089_683_511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let gam = 5.835_151_4 + 0.001_944_368_0 * day;
        let zx = 0.397_854_16 * stem / zsinil;
        let zy = zcoshl * ctem + 0.917_448_67 * zsinhl * stem;
        let zx = gam + zx.atan2(zy) - xnodce;

        let sun = BodyTerms::new(
            &BodyGeometry {
                zcosg: ZCOSGS,
                zsing: ZSINGS,
                zcosi: ZCOSIS,
                zsini: ZSINIS,
                zcosh: cnodm,
                zsinh: snodm,
                cc: C1SS,
            },
            &geometry,
        );
        let moon = BodyTerms::new(
            &BodyGeometry {
                zcosg: zx.cos(),
                zsing: zx.sin(),
                zcosi: zcosil,
                zsini: zsinil,
                zcosh: zcoshl * cnodm + zsinhl * snodm,
                zsinh: snodm * zcoshl - cnodm * zsinhl,
                cc: C1L,
            },
            &geometry,
        );

        let zmol = (4.719_967_2 + 0.229_971_50 * day - gam) % TAU;
        let zmos = (6.256_583_7 + 0.017_201_977 * day) % TAU;
        let solar = BodyPeriodics::new(&sun, emsq, zmos, ZNS, ZES);
        let lunar = BodyPeriodics::new(&moon, emsq, zmol, ZNL, ZEL);

        let rates = SecularRates::new(&sun, &moon, &geometry, orbit.inclo);
        let resonance = Resonance::new(orbit, &rates, &geometry);

        DeepSpace {
            solar,
            lunar,
            rates,
            resonance,
            gsto: orbit.gsto,
        }
    }

    /// Apply the secular lunar-solar rates and integrate any resonance
    pub(super) fn secular(&self, t: f64, no: f64, argpo: f64, argpdot: f64, m: &mut MeanState) {
        let r = &self.rates;
        m.em += r.dedt * t;
        m.inclm += r.didt * t;
        m.argpm += r.domdt * t;
        m.nodem += r.dnodt * t;
        m.mm += r.dmdt * t;

        if let Some(res) = &self.resonance {
            let theta = (self.gsto + t * RPTIM) % TAU;
            let delt = if t > 0.0 { STEPP } else { STEPN };

            // Always integrate from epoch so each call only depends on `t`
            let mut atime = 0.0;
            let mut xni = no;
            let mut xli = res.xlamo();
            let (xndt, xldot, xnddt, ft) = loop {
                let (xndt, xldot, xnddt) = res.derivatives(xli, xni, argpo + argpdot * atime);
                if (t - atime).abs() >= STEPP {
                    xli += xldot * delt + xndt * STEP2;
                    xni += xndt * delt + xnddt * STEP2;
                    atime += delt;
                } else {
                    break (xndt, xldot, xnddt, t - atime);
                }
            };

            m.nm = xni + xndt * ft + xnddt * ft * ft * 0.5;
            let xl = xli + xldot * ft + xndt * ft * ft * 0.5;
            m.mm = match res {
                Resonance::Synchronous { .. } => xl - m.nodem - m.argpm + theta,
                Resonance::HalfDay { .. } => xl - 2.0 * m.nodem + 2.0 * theta,
            };
        }
    }

    /// Apply the lunar-solar periodics `t` minutes after epoch
    pub(super) fn periodics(&self, t: f64, p: &mut PerturbedState) {
        let s = self.solar.at(t);
        let l = self.lunar.at(t);
        let pe = s.e + l.e;
        let pinc = s.i + l.i;
        let pl = s.l + l.l;
        let pgh = s.gh + l.gh;
        let ph = s.h + l.h;

        p.xincp += pinc;
        p.ep += pe;
        let (sinip, cosip) = p.xincp.sin_cos();

        if p.xincp >= 0.2 {
            let ph = ph / sinip;
            let pgh = pgh - cosip * ph;
            p.argpp += pgh;
            p.nodep += ph;
            p.mp += pl;
        } else {
            // Lyddane modification for low inclinations
            let (sinop, cosop) = p.nodep.sin_cos();
            let alfdp = sinip * sinop + (ph * cosop + pinc * cosip * sinop);
            let betdp = sinip * cosop + (-ph * sinop + pinc * cosip * cosop);
            let nodep = p.nodep % TAU;
            let xls = p.mp + p.argpp + cosip * nodep + (pl + pgh - pinc * nodep * sinip);
            let xnoh = nodep;
            let mut nodep = alfdp.atan2(betdp);
            if (xnoh - nodep).abs() > PI {
                if nodep < xnoh {
                    nodep += TAU;
                } else {
                    nodep -= TAU;
                }
            }
            p.mp += pl;
            p.argpp = xls - p.mp - cosip * nodep;
            p.nodep = nodep;
        }
    }
}

impl BodyTerms {
    fn new(b: &BodyGeometry, o: &OrbitGeometry) -> Self {
        let a1 = b.zcosg * b.zcosh + b.zsing * b.zcosi * b.zsinh;
        let a3 = -b.zsing * b.zcosh + b.zcosg * b.zcosi * b.zsinh;
        let a7 = -b.zcosg * b.zsinh + b.zsing * b.zcosi * b.zcosh;
        let a8 = b.zsing * b.zsini;
        let a9 = b.zsing * b.zsinh + b.zcosg * b.zcosi * b.zcosh;
        let a10 = b.zcosg * b.zsini;
        let a2 = o.cosim * a7 + o.sinim * a8;
        let a4 = o.cosim * a9 + o.sinim * a10;
        let a5 = -o.sinim * a7 + o.cosim * a8;
        let a6 = -o.sinim * a9 + o.cosim * a10;

        let x1 = a1 * o.cosomm + a2 * o.sinomm;
        let x2 = a3 * o.cosomm + a4 * o.sinomm;
        let x3 = -a1 * o.sinomm + a2 * o.cosomm;
        let x4 = -a3 * o.sinomm + a4 * o.cosomm;
        let x5 = a5 * o.sinomm;
        let x6 = a6 * o.sinomm;
        let x7 = a5 * o.cosomm;
        let x8 = a6 * o.cosomm;

        let emsq = o.emsq;
        let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
        let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
        let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
        let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
        let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
        let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
        let z11 = -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
        let z12 = -6.0 * (a1 * a6 + a3 * a5)
            + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
        let z13 = -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
        let z21 = 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
        let z22 = 6.0 * (a4 * a5 + a2 * a6)
            + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
        let z23 = 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
        let z1 = z1 + z1 + o.betasq * z31;
        let z2 = z2 + z2 + o.betasq * z32;
        let z3 = z3 + z3 + o.betasq * z33;

        let s3 = b.cc * o.xnoi;
        let s2 = -0.5 * s3 / o.rtemsq;
        let s4 = s3 * o.rtemsq;
        let s1 = -15.0 * o.em * s4;
        let s5 = x1 * x3 + x2 * x4;
        let s6 = x2 * x3 + x1 * x4;
        let s7 = x2 * x4 - x1 * x3;

        BodyTerms {
            s1,
            s2,
            s3,
            s4,
            s5,
            s6,
            s7,
            z1,
            z2,
            z3,
            z11,
            z12,
            z13,
            z21,
            z22,
            z23,
            z31,
            z32,
            z33,
        }
    }

    /// Secular rates of (e, i, M, argp + node, node) due to this body
    fn secular_rates(&self, zn: f64, emsq: f64) -> (f64, f64, f64, f64, f64) {
        (
            self.s1 * zn * self.s5,
            self.s2 * zn * (self.z11 + self.z13),
            -zn * self.s3 * (self.z1 + self.z3 - 14.0 - 6.0 * emsq),
            self.s4 * zn * (self.z31 + self.z33 - 6.0),
            -zn * self.s2 * (self.z21 + self.z23),
        )
    }
}

/// One body's periodic contribution to (e, i, M, argp + node, node)
#[derive(Copy, Clone, PartialEq, Debug)]
struct PeriodicOffsets {
    e: f64,
    i: f64,
    l: f64,
    gh: f64,
    h: f64,
}

impl BodyPeriodics {
    fn new(b: &BodyTerms, emsq: f64, zmo: f64, zn: f64, ze: f64) -> Self {
        BodyPeriodics {
            zmo,
            zn,
            ze,
            e2: 2.0 * b.s1 * b.s6,
            e3: 2.0 * b.s1 * b.s7,
            i2: 2.0 * b.s2 * b.z12,
            i3: 2.0 * b.s2 * (b.z13 - b.z11),
            l2: -2.0 * b.s3 * b.z2,
            l3: -2.0 * b.s3 * (b.z3 - b.z1),
            l4: -2.0 * b.s3 * (-21.0 - 9.0 * emsq) * ze,
            gh2: 2.0 * b.s4 * b.z32,
            gh3: 2.0 * b.s4 * (b.z33 - b.z31),
            gh4: -18.0 * b.s4 * ze,
            h2: -2.0 * b.s2 * b.z22,
            h3: -2.0 * b.s2 * (b.z23 - b.z21),
        }
    }

    fn at(&self, t: f64) -> PeriodicOffsets {
        let zm = self.zmo + self.zn * t;
        let zf = zm + 2.0 * self.ze * zm.sin();
        let (sinzf, coszf) = zf.sin_cos();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * coszf;
        PeriodicOffsets {
            e: self.e2 * f2 + self.e3 * f3,
            i: self.i2 * f2 + self.i3 * f3,
            l: self.l2 * f2 + self.l3 * f3 + self.l4 * sinzf,
            gh: self.gh2 * f2 + self.gh3 * f3 + self.gh4 * sinzf,
            h: self.h2 * f2 + self.h3 * f3,
        }
    }
}

impl SecularRates {
    fn new(sun: &BodyTerms, moon: &BodyTerms, o: &OrbitGeometry, inclm: f64) -> Self {
        let (ses, sis, sls, sghs, shs) = sun.secular_rates(ZNS, o.emsq);
        let (sel, sil, sll, sghl, shll) = moon.secular_rates(ZNL, o.emsq);

        let low_inclination = !(LOW_INCLINATION..=PI - LOW_INCLINATION).contains(&inclm);
        let (mut shs, shll) = if low_inclination {
            (0.0, 0.0)
        } else {
            (shs, shll)
        };
        if o.sinim != 0.0 {
            shs /= o.sinim;
        }
        let sgs = sghs - o.cosim * shs;

        let mut domdt = sgs + sghl;
        let mut dnodt = shs;
        if o.sinim != 0.0 {
            domdt -= o.cosim / o.sinim * shll;
            dnodt += shll / o.sinim;
        }

        SecularRates {
            dedt: ses + sel,
            didt: sis + sil,
            dmdt: sls + sll,
            domdt,
            dnodt,
        }
    }
}

impl Resonance {
    fn new(orbit: &InitialOrbit, rates: &SecularRates, o: &OrbitGeometry) -> Option<Self> {
        const Q22: f64 = 1.7891679e-6;
        const Q31: f64 = 2.1460748e-6;
        const Q33: f64 = 2.2123015e-7;
        const ROOT22: f64 = 1.7891679e-6;
        const ROOT44: f64 = 7.3636953e-9;
        const ROOT54: f64 = 2.1765803e-9;
        const ROOT32: f64 = 3.7393792e-7;
        const ROOT52: f64 = 1.1428639e-7;
        const G22: f64 = 5.7686396;
        const G32: f64 = 0.95240898;
        const G44: f64 = 1.8014998;
        const G52: f64 = 1.0508330;
        const G54: f64 = 4.4108898;

        let nm = orbit.no;
        let theta = orbit.gsto % TAU;
        let aonv = (nm / XKE).powf(X2O3);
        let (sinim, cosim) = (o.sinim, o.cosim);

        if nm > 0.003_490_658_5 && nm < 0.005_235_987_7 {
            let emsq = o.emsq;
            let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
            let g310 = 1.0 + 2.0 * emsq;
            let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
            let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
            let f311 = 0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
            let f330 = 1.875 * (1.0 + cosim).powi(3);
            let del1 = 3.0 * nm * nm * aonv * aonv;
            Some(Resonance::Synchronous {
                del2: 2.0 * del1 * f220 * g200 * Q22,
                del3: 3.0 * del1 * f330 * g300 * Q33 * aonv,
                del1: del1 * f311 * g310 * Q31 * aonv,
                xlamo: (orbit.mo + orbit.nodeo + orbit.argpo - theta) % TAU,
                xfact: orbit.mdot + orbit.xpidot - RPTIM + rates.dmdt + rates.domdt + rates.dnodt
                    - nm,
            })
        } else if (8.26e-3..=9.24e-3).contains(&nm) && o.em >= 0.5 {
            let em = orbit.ecco;
            let emsq = orbit.eccsq;
            let eoc = em * emsq;
            let cosisq = cosim * cosim;

            let g201 = -0.306 - (em - 0.64) * 0.440;
            let (g211, g310, g322, g410, g422, g520) = if em <= 0.65 {
                (
                    3.616 - 13.2470 * em + 16.2900 * emsq,
                    -19.302 + 117.3900 * em - 228.4190 * emsq + 156.5910 * eoc,
                    -18.9068 + 109.7927 * em - 214.6334 * emsq + 146.5816 * eoc,
                    -41.122 + 242.6940 * em - 471.0940 * emsq + 313.9530 * eoc,
                    -146.407 + 841.8800 * em - 1629.014 * emsq + 1083.4350 * eoc,
                    -532.114 + 3017.977 * em - 5740.032 * emsq + 3708.2760 * eoc,
                )
            } else {
                (
                    -72.099 + 331.819 * em - 508.738 * emsq + 266.724 * eoc,
                    -346.844 + 1582.851 * em - 2415.925 * emsq + 1246.113 * eoc,
                    -342.585 + 1554.908 * em - 2366.899 * emsq + 1215.972 * eoc,
                    -1052.797 + 4758.686 * em - 7193.992 * emsq + 3651.957 * eoc,
                    -3581.690 + 16178.110 * em - 24462.770 * emsq + 12422.520 * eoc,
                    if em > 0.715 {
                        -5149.66 + 29936.92 * em - 54087.36 * emsq + 31324.56 * eoc
                    } else {
                        1464.74 - 4664.75 * em + 3763.64 * emsq
                    },
                )
            };
            let (g533, g521, g532) = if em < 0.7 {
                (
                    -919.22770 + 4988.6100 * em - 9064.7700 * emsq + 5542.21 * eoc,
                    -822.71072 + 4568.6173 * em - 8491.4146 * emsq + 5337.524 * eoc,
                    -853.66600 + 4690.2500 * em - 8624.7700 * emsq + 5341.4 * eoc,
                )
            } else {
                (
                    -37995.780 + 161616.52 * em - 229838.20 * emsq + 109377.94 * eoc,
                    -51752.104 + 218913.95 * em - 309468.16 * emsq + 146349.42 * eoc,
                    -40023.880 + 170470.89 * em - 242699.48 * emsq + 115605.82 * eoc,
                )
            };

            let sini2 = sinim * sinim;
            let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
            let f221 = 1.5 * sini2;
            let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
            let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
            let f441 = 35.0 * sini2 * f220;
            let f442 = 39.3750 * sini2 * sini2;
            let f522 = 9.84375
                * sinim
                * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                    + 0.33333333 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
            let f523 = sinim
                * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                    + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
            let f542 = 29.53125
                * sinim
                * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
            let f543 = 29.53125
                * sinim
                * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

            let xno2 = nm * nm;
            let ainv2 = aonv * aonv;
            let temp1 = 3.0 * xno2 * ainv2;
            let t22 = temp1 * ROOT22;
            let temp1 = temp1 * aonv;
            let t32 = temp1 * ROOT32;
            let temp1 = temp1 * aonv;
            let t44 = 2.0 * temp1 * ROOT44;
            let temp1 = temp1 * aonv;
            let t52 = temp1 * ROOT52;
            let t54 = 2.0 * temp1 * ROOT54;

            let term = |coef: f64, omega: f64, lambda: f64, phase: f64| ResonanceTerm {
                coef,
                omega,
                lambda,
                phase,
            };
            Some(Resonance::HalfDay {
                terms: [
                    term(t22 * f220 * g201, 2.0, 1.0, G22),
                    term(t22 * f221 * g211, 0.0, 1.0, G22),
                    term(t32 * f321 * g310, 1.0, 1.0, G32),
                    term(t32 * f322 * g322, -1.0, 1.0, G32),
                    term(t44 * f441 * g410, 2.0, 2.0, G44),
                    term(t44 * f442 * g422, 0.0, 2.0, G44),
                    term(t52 * f522 * g520, 1.0, 1.0, G52),
                    term(t52 * f523 * g532, -1.0, 1.0, G52),
                    term(t54 * f542 * g521, 1.0, 2.0, G54),
                    term(t54 * f543 * g533, -1.0, 2.0, G54),
                ],
                xlamo: (orbit.mo + orbit.nodeo + orbit.nodeo - theta - theta) % TAU,
                xfact: orbit.mdot + rates.dmdt + 2.0 * (orbit.nodedot + rates.dnodt - RPTIM) - nm,
            })
        } else {
            None
        }
    }

    fn xlamo(&self) -> f64 {
        match self {
            Resonance::Synchronous { xlamo, .. } | Resonance::HalfDay { xlamo, .. } => *xlamo,
        }
    }

    /// Mean motion rate, mean longitude rate and mean motion acceleration at
    /// the integrator state
    fn derivatives(&self, xli: f64, xni: f64, xomi: f64) -> (f64, f64, f64) {
        const FASX2: f64 = 0.13130908;
        const FASX4: f64 = 2.8843198;
        const FASX6: f64 = 0.37448087;

        match self {
            Resonance::Synchronous {
                del1,
                del2,
                del3,
                xfact,
                ..
            } => {
                let xndt = del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin();
                let xldot = xni + xfact;
                let xnddt = (del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos())
                    * xldot;
                (xndt, xldot, xnddt)
            }
            Resonance::HalfDay { terms, xfact, .. } => {
                let (xndt, slope) = terms.iter().fold((0.0, 0.0), |(xndt, slope), t| {
                    let arg = t.omega * xomi + t.lambda * xli - t.phase;
                    (
                        xndt + t.coef * arg.sin(),
                        slope + t.lambda * t.coef * arg.cos(),
                    )
                });
                let xldot = xni + xfact;
                (xndt, xldot, slope * xldot)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Propagator;
    use super::*;
    use indoc::indoc;

    fn deep_space(text: &str) -> DeepSpace {
        let out = tle_parser::parse(text);
        let p = Propagator::new(&out.objects[0].elements).unwrap();
        *p.deep_space.unwrap()
    }

    #[test]
    fn resonance_kinds() {
        let geo = deep_space(indoc! {"
            1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991
            2 37481   2.3847  40.6385 0001640  70.7486  43.7146  1.00272292 44578
        "});
        assert!(matches!(geo.resonance, Some(Resonance::Synchronous { .. })));
        // Below the inclination where the lunar-solar node rates are kept
        assert_eq!(geo.rates.dnodt, 0.0);

        let molniya = deep_space(indoc! {"
            1 09880U 77021A   06176.56157475  .00000421  00000-0  10000-3 0  9814
            2 09880  64.5968 349.3786 7069051 270.0229  16.3320  2.00813614112380
        "});
        assert!(matches!(molniya.resonance, Some(Resonance::HalfDay { .. })));

        let unnamed = deep_space(indoc! {"
            1 11801U          80230.29629788  .01431103  00000-0  14311-1 0    13
            2 11801  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13
        "});
        assert_eq!(unnamed.resonance, None);
    }
}
